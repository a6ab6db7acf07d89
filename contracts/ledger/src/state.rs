//! Ledger state: supply, balances, allowances, reserve split and the loan
//! book, plus the token bookkeeping primitives every operation builds on.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use chicks_common::{
    access_control::AdminControl,
    config::LedgerConfig,
    curve::{backing_required, ensure_price_floor, PricingCurve},
    errors::{LedgerError, LedgerResult},
    loan_book::LoanBook,
    math::{safe_add, safe_sub},
    reserve::ReserveAccount,
    types::Address,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LedgerState {
    pub admin: AdminControl,
    pub config: LedgerConfig,
    /// Set by the one-time bootstrap
    pub started: bool,
    pub total_supply: u128,
    /// Price after the last committed operation
    pub last_price: u128,
    pub reserve: ReserveAccount,
    pub balances: BTreeMap<Address, u128>,
    pub allowances: BTreeMap<(Address, Address), u128>,
    pub loans: LoanBook,
}

impl LedgerState {
    pub fn new(admin: AdminControl, config: LedgerConfig) -> Self {
        Self {
            admin,
            config,
            started: false,
            total_supply: 0,
            last_price: 0,
            reserve: ReserveAccount::default(),
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            loans: LoanBook::new(),
        }
    }

    // ============ Queries ============

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Balance not locked as loan collateral
    pub fn free_balance(&self, holder: &Address) -> u128 {
        self.balance_of(holder).saturating_sub(self.loans.locked(holder))
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// Reserve on hand + swept + outstanding loan principal
    pub fn backing(&self) -> LedgerResult<u128> {
        safe_add(self.reserve.total()?, self.loans.total_borrowed())
    }

    pub fn curve(&self) -> LedgerResult<PricingCurve> {
        Ok(PricingCurve::new(
            self.backing()?,
            self.total_supply,
            self.config.buy_fee_bps,
            self.config.sell_fee_bps,
        ))
    }

    pub fn backing_required(&self) -> LedgerResult<u128> {
        backing_required(self.total_supply, self.last_price)
    }

    /// Sum over every holder; equals `total_supply` between operations
    pub fn sum_of_balances(&self) -> LedgerResult<u128> {
        self.balances
            .values()
            .try_fold(0u128, |sum, balance| safe_add(sum, *balance))
    }

    /// Cross-check a state that did not come from this engine: balances
    /// sum to supply, loan totals match the open loans and every borrower
    /// still holds its collateral
    pub fn validate(&self) -> LedgerResult<()> {
        if self.sum_of_balances()? != self.total_supply || !self.loans.totals_match() {
            return Err(LedgerError::InvalidCheckpoint);
        }
        for (borrower, loan) in self.loans.open_loans() {
            if self.balance_of(borrower) < loan.collateral {
                return Err(LedgerError::InvalidCheckpoint);
            }
        }
        Ok(())
    }

    // ============ Token Bookkeeping ============

    pub(crate) fn ensure_free(&self, holder: &Address, amount: u128) -> LedgerResult<()> {
        let balance = self.balance_of(holder);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance { available: balance, requested: amount });
        }
        let free = self.free_balance(holder);
        if free < amount {
            return Err(LedgerError::CollateralLocked { free, requested: amount });
        }
        Ok(())
    }

    fn set_balance(&mut self, holder: &Address, amount: u128) {
        if amount == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(*holder, amount);
        }
    }

    pub(crate) fn mint(&mut self, to: &Address, amount: u128) -> LedgerResult<()> {
        self.total_supply = safe_add(self.total_supply, amount)?;
        let balance = safe_add(self.balance_of(to), amount)?;
        self.set_balance(to, balance);
        Ok(())
    }

    /// Burn free tokens of `from`
    pub(crate) fn burn(&mut self, from: &Address, amount: u128) -> LedgerResult<()> {
        self.ensure_free(from, amount)?;
        let balance = self.balance_of(from) - amount;
        self.set_balance(from, balance);
        self.total_supply = safe_sub(self.total_supply, amount)?;
        Ok(())
    }

    /// Move free tokens between holders
    pub(crate) fn move_tokens(&mut self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()> {
        self.ensure_free(from, amount)?;
        if from == to || amount == 0 {
            return Ok(());
        }
        let to_balance = safe_add(self.balance_of(to), amount)?;
        let from_balance = self.balance_of(from) - amount;
        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        Ok(())
    }

    /// Recompute the price and enforce that it never falls
    pub(crate) fn refresh_price(&mut self) -> LedgerResult<u128> {
        let price = self.curve()?.price()?;
        ensure_price_floor(self.last_price, price)?;
        self.last_price = price;
        Ok(price)
    }
}
