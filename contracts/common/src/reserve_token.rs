//! Reserve asset interface
//!
//! Minimal fungible-token surface the ledger uses to move USDC. `transfer`
//! is executed as `from`; the ledger only calls it with its own address as
//! the sender.

use crate::errors::LedgerResult;
use crate::types::Address;

pub trait ReserveToken {
    fn balance_of(&self, owner: &Address) -> u128;

    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()>;

    /// Move `amount` from `from` to `to` using the allowance granted to `spender`
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> LedgerResult<()>;
}
