//! Loan fee model
//!
//! Loans prepay a time-based fee up front:
//!
//! ```text
//! fee = amount * (apr_bps * days / 365 + origination_bps) / 10_000
//! ```
//!
//! evaluated as a single fraction so short terms do not truncate to zero
//! before the origination charge is added.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::{fees::BPS_DENOMINATOR, loans};
use crate::errors::{LedgerError, LedgerResult};
use crate::math::{apply_bps, mul_div, safe_add, safe_sub};

/// Configurable interest parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RateModel {
    /// Yearly rate charged pro rata per day
    pub apr_bps: u128,
    /// Flat charge per loan action
    pub origination_bps: u128,
}

impl Default for RateModel {
    fn default() -> Self {
        Self {
            apr_bps: loans::APR_BPS,
            origination_bps: loans::ORIGINATION_BPS,
        }
    }
}

impl RateModel {
    pub fn new(apr_bps: u128, origination_bps: u128) -> Self {
        Self { apr_bps, origination_bps }
    }

    /// Prepaid fee for borrowing `amount` over `days`
    pub fn interest_fee(&self, amount: u128, days: u32) -> LedgerResult<u128> {
        let per_year = self
            .apr_bps
            .checked_mul(days as u128)
            .ok_or(LedgerError::Overflow)?;
        let origination = self
            .origination_bps
            .checked_mul(loans::DAYS_PER_YEAR)
            .ok_or(LedgerError::Overflow)?;
        let numerator = safe_add(per_year, origination)?;
        mul_div(amount, numerator, loans::DAYS_PER_YEAR * BPS_DENOMINATOR)
    }
}

/// A fee divided between the fee address and the reserve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    /// Paid out to `fee_address`
    pub to_fee_address: u128,
    /// Left in the reserve
    pub to_reserve: u128,
}

impl FeeSplit {
    pub fn new(fee: u128, fee_share_bps: u128) -> LedgerResult<Self> {
        let to_fee_address = apply_bps(fee, fee_share_bps)?;
        Ok(Self {
            to_fee_address,
            to_reserve: safe_sub(fee, to_fee_address)?,
        })
    }
}
