//! Yield Venue
//!
//! In-memory Aave-style lending pool holding the engine's swept reserve.
//! Supplied balances grow with `accrue` (interest) and shrink with
//! `realize_loss` (bad debt), so callers can exercise both positive and
//! negative yield without a live pool.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use chicks_common::{
    errors::{AmountErrorReason, LedgerError, LedgerResult},
    math::{apply_bps, safe_add},
    venue::YieldVenue,
};

// ============ Pool State ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct InMemoryVenue {
    /// Pool accepts new supply
    enabled: bool,
    /// Engine's aToken balance, yield included
    supplied: u128,
    /// Sum of deposits minus sum of withdrawals
    net_deposits: u128,
    /// Cash the pool can hand back right now
    available_liquidity: Option<u128>,
}

impl Default for InMemoryVenue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryVenue {
    pub fn new() -> Self {
        Self {
            enabled: true,
            supplied: 0,
            net_deposits: 0,
            available_liquidity: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Cap what withdrawals can return, `None` for unlimited
    pub fn set_available_liquidity(&mut self, cap: Option<u128>) {
        self.available_liquidity = cap;
    }

    /// Grow the supplied balance by `bps` of itself, returning the interest
    pub fn accrue(&mut self, bps: u128) -> LedgerResult<u128> {
        let interest = apply_bps(self.supplied, bps)?;
        self.supplied = safe_add(self.supplied, interest)?;
        debug!(interest, supplied = self.supplied, "venue interest accrued");
        Ok(interest)
    }

    /// Credit a fixed amount of interest
    pub fn accrue_amount(&mut self, amount: u128) -> LedgerResult<()> {
        self.supplied = safe_add(self.supplied, amount)?;
        Ok(())
    }

    /// Write down the supplied balance
    pub fn realize_loss(&mut self, amount: u128) {
        self.supplied = self.supplied.saturating_sub(amount);
        warn!(amount, supplied = self.supplied, "venue loss realized");
    }

    pub fn net_deposits(&self) -> u128 {
        self.net_deposits
    }
}

impl YieldVenue for InMemoryVenue {
    fn deposit(&mut self, amount: u128) -> LedgerResult<()> {
        if !self.enabled {
            return Err(LedgerError::VenueFailure { reason: "pool disabled" });
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount { amount, reason: AmountErrorReason::Zero });
        }
        self.supplied = safe_add(self.supplied, amount)?;
        self.net_deposits = safe_add(self.net_deposits, amount)?;
        Ok(())
    }

    fn withdraw(&mut self, amount: u128) -> LedgerResult<u128> {
        if amount > self.supplied {
            return Err(LedgerError::InsufficientLiquidity {
                available: self.supplied,
                required: amount,
            });
        }
        if let Some(cap) = self.available_liquidity {
            if amount > cap {
                return Err(LedgerError::VenueFailure { reason: "pool liquidity exhausted" });
            }
            self.available_liquidity = Some(cap - amount);
        }
        self.supplied -= amount;
        self.net_deposits = self.net_deposits.saturating_sub(amount);
        Ok(amount)
    }

    fn supplied_balance(&self) -> u128 {
        self.supplied
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_USDC: u128 = 1_000_000;

    #[test]
    fn test_deposit_and_withdraw() {
        let mut venue = InMemoryVenue::new();
        venue.deposit(100 * ONE_USDC).unwrap();
        assert_eq!(venue.supplied_balance(), 100 * ONE_USDC);

        assert_eq!(venue.withdraw(40 * ONE_USDC).unwrap(), 40 * ONE_USDC);
        assert_eq!(venue.supplied_balance(), 60 * ONE_USDC);
        assert_eq!(venue.net_deposits(), 60 * ONE_USDC);
    }

    #[test]
    fn test_disabled_rejects_deposit() {
        let mut venue = InMemoryVenue::new();
        venue.set_enabled(false);
        assert!(!venue.is_enabled());
        assert!(matches!(venue.deposit(ONE_USDC), Err(LedgerError::VenueFailure { .. })));
    }

    #[test]
    fn test_accrue_interest() {
        let mut venue = InMemoryVenue::new();
        venue.deposit(1_000 * ONE_USDC).unwrap();
        let interest = venue.accrue(500).unwrap();
        assert_eq!(interest, 50 * ONE_USDC);
        assert_eq!(venue.supplied_balance(), 1_050 * ONE_USDC);
    }

    #[test]
    fn test_loss_and_overdraw() {
        let mut venue = InMemoryVenue::new();
        venue.deposit(100 * ONE_USDC).unwrap();
        venue.realize_loss(10 * ONE_USDC);
        assert_eq!(venue.supplied_balance(), 90 * ONE_USDC);
        assert!(matches!(
            venue.withdraw(100 * ONE_USDC),
            Err(LedgerError::InsufficientLiquidity { .. })
        ));
    }

    #[test]
    fn test_liquidity_cap() {
        let mut venue = InMemoryVenue::new();
        venue.deposit(100 * ONE_USDC).unwrap();
        venue.set_available_liquidity(Some(30 * ONE_USDC));
        venue.withdraw(30 * ONE_USDC).unwrap();
        assert!(matches!(venue.withdraw(1), Err(LedgerError::VenueFailure { .. })));
    }
}
