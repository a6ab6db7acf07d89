//! Core Types for the CHICKS engine
//!
//! Fundamental data structures shared by the ledger, the loan book and
//! the reserve-side collaborators.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Type alias for account addresses (20 bytes, EVM style)
pub type Address = [u8; 20];

/// Type alias for loan identifiers
pub type LoanId = [u8; 32];

// ============ Call Context ============

/// Per-call environment: who is calling and when.
///
/// `now` is read once per operation; every time-dependent rule inside that
/// operation uses this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Caller address
    pub caller: Address,
    /// Unix timestamp in seconds
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: Address, now: u64) -> Self {
        Self { caller, now }
    }
}

// ============ Loan Types ============

/// An open collateralized position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Loan {
    /// Unique identifier for this loan
    pub id: LoanId,
    /// CHICKS locked in the borrower's balance
    pub collateral: u128,
    /// Reserve owed
    pub borrowed: u128,
    /// Unix timestamp after which the loan can be liquidated
    pub end_date: u64,
    /// Term the fee was paid for
    pub number_of_days: u32,
    /// Unix timestamp the loan was opened at
    pub opened_at: u64,
}

impl Loan {
    /// True once `now` is past the end date
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.end_date
    }

    /// Whole days left in the term, rounded up, at least one while open
    pub fn remaining_days(&self, now: u64) -> u32 {
        if now >= self.end_date {
            return 0;
        }
        let secs = self.end_date - now;
        let days = secs.div_ceil(crate::constants::loans::SECONDS_PER_DAY);
        days.min(u32::MAX as u64) as u32
    }

    pub fn snapshot(&self) -> LoanSnapshot {
        LoanSnapshot {
            collateral: self.collateral,
            borrowed: self.borrowed,
            end_date: self.end_date,
            number_of_days: self.number_of_days,
        }
    }
}

/// How a loan left the `Open` state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum CloseReason {
    /// Borrower repaid in reserve
    Repaid,
    /// Collateral sold through the curve to settle the debt
    FlashClosed,
    /// Seized after the end date
    Liquidated,
}

/// Terminal record of the last loan an account held
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ClosedLoan {
    pub id: LoanId,
    pub reason: CloseReason,
    pub closed_at: u64,
}

/// Per-account loan state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum LoanState {
    /// Account never borrowed
    #[default]
    NoLoan,
    /// Position is live
    Open(Loan),
    /// Last position was settled; a new one may be opened
    Closed(ClosedLoan),
}

impl LoanState {
    pub fn open(&self) -> Option<&Loan> {
        match self {
            LoanState::Open(loan) => Some(loan),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, LoanState::Open(_))
    }
}

/// Read-only view returned by `loans(address)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSnapshot {
    pub collateral: u128,
    pub borrowed: u128,
    pub end_date: u64,
    pub number_of_days: u32,
}

// ============ Helper Functions ============

/// Generate a deterministic loan ID
pub fn generate_loan_id(borrower: &Address, opened_at: u64, nonce: u64) -> LoanId {
    let mut hasher = Sha256::new();
    hasher.update(borrower);
    hasher.update(opened_at.to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    let result = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&result);
    id
}

/// Derive a stable address from a human label (last 20 bytes of sha-256)
pub fn address_from_label(label: &str) -> Address {
    let digest = Sha256::digest(label.as_bytes());
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&digest[12..]);
    addr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::loans::SECONDS_PER_DAY;

    fn test_loan() -> Loan {
        Loan {
            id: [7u8; 32],
            collateral: 1_000,
            borrowed: 500,
            end_date: 10 * SECONDS_PER_DAY,
            number_of_days: 10,
            opened_at: 0,
        }
    }

    #[test]
    fn test_loan_id_deterministic() {
        let a = generate_loan_id(&[1u8; 20], 100, 0);
        let b = generate_loan_id(&[1u8; 20], 100, 0);
        let c = generate_loan_id(&[1u8; 20], 100, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_remaining_days_rounds_up() {
        let loan = test_loan();
        assert_eq!(loan.remaining_days(0), 10);
        assert_eq!(loan.remaining_days(1), 10);
        assert_eq!(loan.remaining_days(SECONDS_PER_DAY), 9);
        assert_eq!(loan.remaining_days(10 * SECONDS_PER_DAY), 0);
    }

    #[test]
    fn test_expiry_is_strict() {
        let loan = test_loan();
        assert!(!loan.is_expired(loan.end_date));
        assert!(loan.is_expired(loan.end_date + 1));
    }

    #[test]
    fn test_loan_state_default() {
        let state = LoanState::default();
        assert!(!state.is_open());
        assert!(state.open().is_none());
        assert!(LoanState::Open(test_loan()).is_open());
    }

    #[test]
    fn test_labels_differ() {
        assert_ne!(address_from_label("alice"), address_from_label("bob"));
    }
}
