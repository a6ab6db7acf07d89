//! Yield sweep: keeps the on-hand reserve at the liquidity buffer, parks
//! the surplus in the venue, and lets the admin harvest accrued yield.

use tracing::{debug, info};

use chicks_common::{
    constants::addresses,
    errors::{AmountErrorReason, LedgerError, LedgerResult},
    events::LedgerEvent,
    reserve::SweepPlan,
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
    fn deposits_enabled(&self) -> bool {
        let config = &self.state.config;
        config.aave_enabled && config.venue_configured() && self.venue.is_enabled()
    }

    /// Move reserve to or from the venue so that, once `outflow` is paid,
    /// the on-hand balance sits at the buffer
    pub(crate) fn rebalance(&mut self, outflow: u128) -> LedgerResult<()> {
        let buffer = self.state.config.min_liquidity_buffer;
        let supplied = self.venue.supplied_balance();
        let plan = self
            .state
            .reserve
            .plan(outflow, buffer, self.deposits_enabled(), supplied)?;
        debug!(
            ?plan,
            outflow,
            supplied,
            balance = self.state.reserve.balance,
            swept = self.state.reserve.swept,
            "sweep planned"
        );

        match plan {
            SweepPlan::Hold => return Ok(()),
            SweepPlan::Deposit(amount) => {
                self.venue.deposit(amount)?;
                self.emit(LedgerEvent::Swept { amount });
            }
            SweepPlan::Withdraw(amount) => {
                let received = self.venue.withdraw(amount)?;
                if received != amount {
                    return Err(LedgerError::VenueFailure { reason: "short withdrawal" });
                }
                self.emit(LedgerEvent::Unswept { amount });
            }
        }
        self.state.reserve.apply(plan)
    }

    /// Run the buffer check on its own
    pub fn maybe_sweep(&mut self) -> LedgerResult<()> {
        self.atomic("maybe_sweep", |l| l.rebalance(0))
    }

    /// Balance the venue reports for the engine, yield included
    pub fn get_aave_supplied_amount(&self) -> u128 {
        self.venue.supplied_balance()
    }

    /// Yield currently withdrawable above `principal`, floored at the
    /// swept principal
    pub fn available_yield(&self, principal: u128) -> u128 {
        let floor = principal.max(self.state.reserve.swept);
        self.venue.supplied_balance().saturating_sub(floor)
    }

    /// Withdraw accrued yield to `to`, admin only.
    ///
    /// The floor is `max(principal, swept_balance)`: a `principal` below
    /// the engine's own swept principal is raised to it, so this never
    /// pays out reserve that backs the supply. `amount == 0` withdraws
    /// everything above the floor.
    pub fn withdraw_aave_yield(
        &mut self,
        ctx: &CallContext,
        to: Address,
        principal: u128,
        amount: u128,
    ) -> LedgerResult<u128> {
        self.atomic("withdraw_aave_yield", |l| {
            l.state.admin.require_admin(&ctx.caller)?;
            if to == addresses::ZERO {
                return Err(LedgerError::InvalidAddress { reason: "recipient cannot be zero" });
            }

            let supplied = l.venue.supplied_balance();
            let floor = principal.max(l.state.reserve.swept);
            if supplied <= floor {
                return Err(LedgerError::NothingToWithdraw { supplied, principal: floor });
            }
            let available = supplied - floor;
            let amount = if amount == 0 { available } else { amount };
            if amount > available {
                return Err(LedgerError::InvalidAmount { amount, reason: AmountErrorReason::TooLarge });
            }

            let received = l.venue.withdraw(amount)?;
            if received != amount {
                return Err(LedgerError::VenueFailure { reason: "short withdrawal" });
            }
            let engine = l.address;
            l.token
                .transfer(&engine, &to, amount)
                .map_err(|_| LedgerError::TransferFailed { from: engine, to, amount })?;

            l.emit(LedgerEvent::YieldWithdrawn { to, amount });
            info!(amount, supplied, floor, "yield withdrawn");
            Ok(amount)
        })
    }
}
