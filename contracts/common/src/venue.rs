//! Yield venue capability
//!
//! The ledger only ever needs four things from an Aave-style pool, so that
//! is all this trait exposes. Balances are in reserve base units.

use crate::errors::LedgerResult;

pub trait YieldVenue {
    /// Supply `amount` of reserve on the engine's behalf
    fn deposit(&mut self, amount: u128) -> LedgerResult<()>;

    /// Withdraw `amount`, returning what was actually received
    fn withdraw(&mut self, amount: u128) -> LedgerResult<u128>;

    /// Current balance supplied by the engine, yield included
    fn supplied_balance(&self) -> u128;

    /// Whether the pool is accepting deposits
    fn is_enabled(&self) -> bool;
}
