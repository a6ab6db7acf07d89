//! Loan Book
//!
//! Per-borrower loan state machine and the book-wide totals the curve
//! needs. Amount math (collateral sizing, fees, pricing) is done by the
//! caller; the book only enforces state transitions and keeps the totals
//! consistent.
//!
//! ```text
//! NoLoan --open--> Open --close--> Closed --open--> Open ...
//! ```

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::loans::SECONDS_PER_DAY;
use crate::errors::{AmountErrorReason, LedgerError, LedgerResult};
use crate::math::{mul_div, safe_add, safe_sub};
use crate::types::{
    generate_loan_id, Address, CloseReason, ClosedLoan, Loan, LoanId, LoanSnapshot, LoanState,
};

const NO_LOAN: LoanState = LoanState::NoLoan;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LoanBook {
    accounts: BTreeMap<Address, LoanState>,
    /// Outstanding principal across all open loans
    total_borrowed: u128,
    /// CHICKS locked across all open loans
    total_collateral: u128,
    nonce: u64,
}

/// Result of a partial or full repayment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repayment {
    pub loan_id: LoanId,
    pub collateral_released: u128,
    pub remaining: u128,
    pub closed: bool,
}

fn end_date_after(start: u64, days: u32) -> LedgerResult<u64> {
    (days as u64)
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|secs| start.checked_add(secs))
        .ok_or(LedgerError::Overflow)
}

impl LoanBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, borrower: &Address) -> &LoanState {
        self.accounts.get(borrower).unwrap_or(&NO_LOAN)
    }

    pub fn loan(&self, borrower: &Address) -> Option<&Loan> {
        self.state(borrower).open()
    }

    pub fn snapshot(&self, borrower: &Address) -> LoanSnapshot {
        self.loan(borrower).map(Loan::snapshot).unwrap_or_default()
    }

    /// Tokens of `holder` that cannot be moved
    pub fn locked(&self, holder: &Address) -> u128 {
        self.loan(holder).map_or(0, |loan| loan.collateral)
    }

    pub fn total_borrowed(&self) -> u128 {
        self.total_borrowed
    }

    pub fn total_collateral(&self) -> u128 {
        self.total_collateral
    }

    /// Open loan that has not passed its end date
    pub fn active(&self, borrower: &Address, now: u64) -> LedgerResult<&Loan> {
        let loan = self
            .loan(borrower)
            .ok_or(LedgerError::NoActiveLoan { borrower: *borrower })?;
        if loan.is_expired(now) {
            return Err(LedgerError::LoanExpired { end_date: loan.end_date, now });
        }
        Ok(loan)
    }

    fn active_mut(&mut self, borrower: &Address, now: u64) -> LedgerResult<&mut Loan> {
        match self.accounts.get_mut(borrower) {
            Some(LoanState::Open(loan)) => {
                if loan.is_expired(now) {
                    return Err(LedgerError::LoanExpired { end_date: loan.end_date, now });
                }
                Ok(loan)
            }
            _ => Err(LedgerError::NoActiveLoan { borrower: *borrower }),
        }
    }

    /// `NoLoan | Closed -> Open`
    pub fn open(
        &mut self,
        borrower: Address,
        collateral: u128,
        borrowed: u128,
        days: u32,
        now: u64,
    ) -> LedgerResult<&Loan> {
        if self.state(&borrower).is_open() {
            return Err(LedgerError::LoanAlreadyOpen { borrower });
        }
        if borrowed == 0 {
            return Err(LedgerError::InvalidAmount { amount: 0, reason: AmountErrorReason::Zero });
        }

        let loan = Loan {
            id: generate_loan_id(&borrower, now, self.nonce),
            collateral,
            borrowed,
            end_date: end_date_after(now, days)?,
            number_of_days: days,
            opened_at: now,
        };
        self.total_borrowed = safe_add(self.total_borrowed, borrowed)?;
        self.total_collateral = safe_add(self.total_collateral, collateral)?;
        self.nonce += 1;

        self.accounts.insert(borrower, LoanState::Open(loan));
        self.loan(&borrower).ok_or(LedgerError::NoActiveLoan { borrower })
    }

    /// Add principal and collateral to an active loan
    pub fn increase(
        &mut self,
        borrower: &Address,
        extra_borrowed: u128,
        extra_collateral: u128,
        now: u64,
    ) -> LedgerResult<LoanId> {
        let total_borrowed = safe_add(self.total_borrowed, extra_borrowed)?;
        let total_collateral = safe_add(self.total_collateral, extra_collateral)?;

        let loan = self.active_mut(borrower, now)?;
        loan.borrowed = safe_add(loan.borrowed, extra_borrowed)?;
        loan.collateral = safe_add(loan.collateral, extra_collateral)?;
        let id = loan.id;

        self.total_borrowed = total_borrowed;
        self.total_collateral = total_collateral;
        Ok(id)
    }

    /// Push the end date of an active loan out by `days`
    pub fn extend(&mut self, borrower: &Address, days: u32, now: u64) -> LedgerResult<u64> {
        let loan = self.active_mut(borrower, now)?;
        loan.end_date = end_date_after(loan.end_date, days)?;
        loan.number_of_days = loan.number_of_days.saturating_add(days);
        Ok(loan.end_date)
    }

    /// Unlock `amount` of collateral without touching the debt
    pub fn release_collateral(&mut self, borrower: &Address, amount: u128, now: u64) -> LedgerResult<LoanId> {
        let loan = self.active_mut(borrower, now)?;
        if amount > loan.collateral {
            return Err(LedgerError::InvalidAmount { amount, reason: AmountErrorReason::TooLarge });
        }
        loan.collateral -= amount;
        let id = loan.id;
        self.total_collateral = safe_sub(self.total_collateral, amount)?;
        Ok(id)
    }

    /// Reduce principal by `amount`, releasing collateral pro rata.
    /// Repaying everything closes the loan.
    pub fn repay(&mut self, borrower: &Address, amount: u128, now: u64) -> LedgerResult<Repayment> {
        let loan = self.active(borrower, now)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount { amount, reason: AmountErrorReason::Zero });
        }
        if amount > loan.borrowed {
            return Err(LedgerError::InvalidAmount { amount, reason: AmountErrorReason::TooLarge });
        }

        if amount == loan.borrowed {
            let closed = self.close(borrower, CloseReason::Repaid, now)?;
            return Ok(Repayment {
                loan_id: closed.id,
                collateral_released: closed.collateral,
                remaining: 0,
                closed: true,
            });
        }

        let released = mul_div(loan.collateral, amount, loan.borrowed)?;
        let loan = self.active_mut(borrower, now)?;
        loan.borrowed -= amount;
        loan.collateral -= released;
        let (loan_id, remaining) = (loan.id, loan.borrowed);

        self.total_borrowed = safe_sub(self.total_borrowed, amount)?;
        self.total_collateral = safe_sub(self.total_collateral, released)?;
        Ok(Repayment { loan_id, collateral_released: released, remaining, closed: false })
    }

    /// `Open -> Closed`, returning the final loan record. Does not check expiry.
    pub fn close(&mut self, borrower: &Address, reason: CloseReason, now: u64) -> LedgerResult<Loan> {
        let loan = self
            .loan(borrower)
            .cloned()
            .ok_or(LedgerError::NoActiveLoan { borrower: *borrower })?;

        self.total_borrowed = safe_sub(self.total_borrowed, loan.borrowed)?;
        self.total_collateral = safe_sub(self.total_collateral, loan.collateral)?;
        self.accounts.insert(
            *borrower,
            LoanState::Closed(ClosedLoan { id: loan.id, reason, closed_at: now }),
        );
        Ok(loan)
    }

    /// Borrowers whose loans are past their end date
    pub fn expired(&self, now: u64) -> Vec<Address> {
        self.accounts
            .iter()
            .filter_map(|(addr, state)| match state {
                LoanState::Open(loan) if loan.is_expired(now) => Some(*addr),
                _ => None,
            })
            .collect()
    }

    pub fn open_loans(&self) -> impl Iterator<Item = (&Address, &Loan)> {
        self.accounts
            .iter()
            .filter_map(|(addr, state)| state.open().map(|loan| (addr, loan)))
    }

    /// True when the book-wide totals equal the sums over open loans
    pub fn totals_match(&self) -> bool {
        let mut borrowed: u128 = 0;
        let mut collateral: u128 = 0;
        for (_, loan) in self.open_loans() {
            match (borrowed.checked_add(loan.borrowed), collateral.checked_add(loan.collateral)) {
                (Some(b), Some(c)) => {
                    borrowed = b;
                    collateral = c;
                }
                _ => return false,
            }
        }
        borrowed == self.total_borrowed && collateral == self.total_collateral
    }
}
