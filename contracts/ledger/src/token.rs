//! CHICKS token surface. Locked collateral never moves.

use chicks_common::{
    constants::{addresses, token},
    errors::{LedgerError, LedgerResult},
    events::LedgerEvent,
    reserve_token::ReserveToken,
    types::{Address, CallContext},
    venue::YieldVenue,
};

use crate::Ledger;

impl<R, V> Ledger<R, V>
where
    R: ReserveToken + Clone,
    V: YieldVenue + Clone,
{
    pub fn name(&self) -> &'static str {
        token::NAME
    }

    pub fn symbol(&self) -> &'static str {
        token::SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        token::DECIMALS
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.state.balance_of(holder)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.state.allowance(owner, spender)
    }

    pub fn approve(&mut self, ctx: &CallContext, spender: Address, amount: u128) -> LedgerResult<()> {
        self.atomic("approve", |l| {
            if spender == addresses::ZERO {
                return Err(LedgerError::InvalidAddress { reason: "spender cannot be zero" });
            }
            l.state.allowances.insert((ctx.caller, spender), amount);
            l.emit(LedgerEvent::Approval { owner: ctx.caller, spender, amount });
            Ok(())
        })
    }

    pub fn transfer(&mut self, ctx: &CallContext, to: Address, amount: u128) -> LedgerResult<()> {
        self.atomic("transfer", |l| {
            l.transfer_tokens(&ctx.caller, to, amount)
        })
    }

    /// Move `amount` from `from` to `to`, spending the caller's allowance
    pub fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
    ) -> LedgerResult<()> {
        self.atomic("transfer_from", |l| {
            let approved = l.state.allowance(&from, &ctx.caller);
            if approved < amount {
                return Err(LedgerError::InsufficientAllowance { approved, requested: amount });
            }
            l.transfer_tokens(&from, to, amount)?;
            l.state.allowances.insert((from, ctx.caller), approved - amount);
            Ok(())
        })
    }

    fn transfer_tokens(&mut self, from: &Address, to: Address, amount: u128) -> LedgerResult<()> {
        if to == addresses::ZERO {
            return Err(LedgerError::InvalidAddress { reason: "recipient cannot be zero" });
        }
        self.state.move_tokens(from, &to, amount)?;
        self.emit(LedgerEvent::Transfer { from: *from, to, amount });
        Ok(())
    }
}
