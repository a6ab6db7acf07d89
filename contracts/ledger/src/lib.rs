//! CHICKS Ledger
//!
//! The economic engine: a bonding-curve token minted and burned against a
//! USDC reserve, collateralized loans against the token, and a sweep of
//! idle reserve into an external yield venue.
//!
//! ## Execution Model
//!
//! The ledger is a single serialized state machine. Every mutating call:
//! - reads `now` once from its [`CallContext`]
//! - runs against a staged copy of the state, reserve token and venue
//! - commits everything (and its events) only if every step succeeded
//!
//! A failed call leaves no trace beyond a `warn!` line.
//!
//! ## Operations
//!
//! - **Trading**: `set_start`, `buy`, `sell`, `get_buy_chicks`, `donate`
//! - **Token**: `transfer`, `transfer_from`, `approve`, `allowance`, `balance_of`
//! - **Lending**: `borrow`, `borrow_more`, `leverage`, `repay`, `close_position`,
//!   `flash_close_position`, `remove_collateral`, `extend_loan`, `liquidate`
//! - **Yield**: `maybe_sweep`, `withdraw_aave_yield`, `get_aave_supplied_amount`
//! - **Admin**: fee address, buffer, venue, rate model and admin setters

use tracing::warn;

use chicks_common::{
    access_control::AdminControl,
    config::LedgerConfig,
    constants::addresses,
    errors::{AmountErrorReason, LedgerError, LedgerResult},
    events::{EventLog, LedgerEvent},
    reserve_token::ReserveToken,
    types::{Address, CallContext},
    venue::YieldVenue,
};

pub mod state;
pub mod trade;
pub mod token;
pub mod lending;
pub mod sweep;
pub mod admin;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod property_tests;

pub use state::LedgerState;

/// The CHICKS engine over a reserve token `R` and a yield venue `V`
#[derive(Debug, Clone)]
pub struct Ledger<R, V> {
    /// Engine's own account in the reserve token
    address: Address,
    state: LedgerState,
    token: R,
    venue: V,
    events: EventLog,
}

impl<R, V> Ledger<R, V>
where
    R: ReserveToken + Clone,
    V: YieldVenue + Clone,
{
    pub fn new(address: Address, admin: Address, fee_address: Address, token: R, venue: V) -> LedgerResult<Self> {
        if address == addresses::ZERO || fee_address == addresses::ZERO {
            return Err(LedgerError::InvalidAddress { reason: "engine and fee address must be set" });
        }
        let admin = AdminControl::new(admin)?;
        Ok(Self {
            address,
            state: LedgerState::new(admin, LedgerConfig::new(fee_address)),
            token,
            venue,
            events: EventLog::new(),
        })
    }

    // ============ Execution ============

    /// Run `f` against a staged copy and commit only on success
    pub(crate) fn atomic<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut Self) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut staged = Self {
            address: self.address,
            state: self.state.clone(),
            token: self.token.clone(),
            venue: self.venue.clone(),
            events: EventLog::new(),
        };

        match f(&mut staged) {
            Ok(value) => {
                self.state = staged.state;
                self.token = staged.token;
                self.venue = staged.venue;
                self.events.append(staged.events);
                Ok(value)
            }
            Err(err) => {
                warn!(op, code = err.code(), error = %err, "operation rejected");
                Err(err)
            }
        }
    }

    pub(crate) fn require_started(&self) -> LedgerResult<()> {
        if !self.state.started {
            return Err(LedgerError::NotStarted);
        }
        Ok(())
    }

    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.events.emit(event);
    }

    /// Pull reserve from `from` into the engine via allowance
    pub(crate) fn pull_reserve(&mut self, from: &Address, amount: u128) -> LedgerResult<()> {
        if amount == 0 {
            return Ok(());
        }
        let engine = self.address;
        self.token.transfer_from(&engine, from, &engine, amount)?;
        self.state.reserve.credit(amount)
    }

    /// Pay reserve out of the on-hand balance
    pub(crate) fn pay_reserve(&mut self, to: &Address, amount: u128) -> LedgerResult<()> {
        if amount == 0 {
            return Ok(());
        }
        self.state.reserve.debit(amount)?;
        let engine = self.address;
        self.token
            .transfer(&engine, to, amount)
            .map_err(|_| LedgerError::TransferFailed { from: engine, to: *to, amount })
    }

    // ============ Queries ============

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.state.config
    }

    pub fn admin(&self) -> Address {
        self.state.admin.admin()
    }

    pub fn is_started(&self) -> bool {
        self.state.started
    }

    pub fn total_supply(&self) -> u128 {
        self.state.total_supply
    }

    /// Price committed by the last operation
    pub fn current_price(&self) -> u128 {
        self.state.last_price
    }

    pub fn backing(&self) -> LedgerResult<u128> {
        self.state.backing()
    }

    pub fn backing_required(&self) -> LedgerResult<u128> {
        self.state.backing_required()
    }

    pub fn reserve_balance(&self) -> u128 {
        self.state.reserve.balance
    }

    pub fn swept_balance(&self) -> u128 {
        self.state.reserve.swept
    }

    pub fn total_borrowed(&self) -> u128 {
        self.state.loans.total_borrowed()
    }

    pub fn total_collateral(&self) -> u128 {
        self.state.loans.total_collateral()
    }

    pub fn free_balance(&self, holder: &Address) -> u128 {
        self.state.free_balance(holder)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drain committed events
    pub fn take_events(&mut self) -> EventLog {
        std::mem::take(&mut self.events)
    }

    pub fn token(&self) -> &R {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut R {
        &mut self.token
    }

    pub fn venue(&self) -> &V {
        &self.venue
    }

    pub fn venue_mut(&mut self) -> &mut V {
        &mut self.venue
    }

    // ============ Checkpoints ============

    /// Borsh encoding of the full ledger state
    pub fn checkpoint(&self) -> LedgerResult<Vec<u8>> {
        borsh::to_vec(&self.state).map_err(|_| LedgerError::InvalidCheckpoint)
    }

    /// Replace the ledger state with a decoded checkpoint, admin only
    pub fn restore(&mut self, ctx: &CallContext, bytes: &[u8]) -> LedgerResult<()> {
        self.state.admin.require_admin(&ctx.caller)?;
        let state: LedgerState = borsh::from_slice(bytes).map_err(|_| LedgerError::InvalidCheckpoint)?;
        state.validate().map_err(|_| LedgerError::InvalidCheckpoint)?;
        self.state = state;
        Ok(())
    }
}

/// Reject zero amounts with the standard error
pub(crate) fn require_nonzero(amount: u128) -> LedgerResult<()> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount { amount, reason: AmountErrorReason::Zero });
    }
    Ok(())
}
