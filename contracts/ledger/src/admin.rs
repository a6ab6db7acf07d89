//! Administrative setters. Every setter is admin only and records a
//! `ConfigUpdated` event.

use tracing::info;

use chicks_common::{
    constants::{addresses, fees::BPS_DENOMINATOR},
    errors::{AmountErrorReason, LedgerError, LedgerResult},
    events::{ConfigParameter, LedgerEvent},
    rates::RateModel,
    reserve_token::ReserveToken,
    types::{Address, CallContext},
    venue::YieldVenue,
};

use crate::Ledger;

fn require_address(address: Address, reason: &'static str) -> LedgerResult<()> {
    if address == addresses::ZERO {
        return Err(LedgerError::InvalidAddress { reason });
    }
    Ok(())
}

impl<R, V> Ledger<R, V>
where
    R: ReserveToken + Clone,
    V: YieldVenue + Clone,
{
    fn configure(
        &mut self,
        ctx: &CallContext,
        parameter: ConfigParameter,
        f: impl FnOnce(&mut Self) -> LedgerResult<()>,
    ) -> LedgerResult<()> {
        self.atomic("configure", |l| {
            l.state.admin.require_admin(&ctx.caller)?;
            f(l)?;
            l.emit(LedgerEvent::ConfigUpdated { parameter });
            info!(?parameter, "config updated");
            Ok(())
        })
    }

    pub fn set_fee_address(&mut self, ctx: &CallContext, fee_address: Address) -> LedgerResult<()> {
        self.configure(ctx, ConfigParameter::FeeAddress, |l| {
            require_address(fee_address, "fee address cannot be zero")?;
            l.state.config.fee_address = fee_address;
            Ok(())
        })
    }

    /// Change the buffer and rebalance against it right away
    pub fn set_min_liquidity_buffer(&mut self, ctx: &CallContext, buffer: u128) -> LedgerResult<()> {
        self.configure(ctx, ConfigParameter::MinLiquidityBuffer, |l| {
            l.state.config.min_liquidity_buffer = buffer;
            if l.state.started {
                l.rebalance(0)?;
            }
            Ok(())
        })
    }

    pub fn set_aave_pool(&mut self, ctx: &CallContext, pool: Address) -> LedgerResult<()> {
        self.configure(ctx, ConfigParameter::AavePool, |l| {
            require_address(pool, "pool cannot be zero")?;
            l.state.config.yield_venue_address = pool;
            Ok(())
        })
    }

    pub fn set_a_usdc_token(&mut self, ctx: &CallContext, token: Address) -> LedgerResult<()> {
        self.configure(ctx, ConfigParameter::AUsdcToken, |l| {
            require_address(token, "aUSDC token cannot be zero")?;
            l.state.config.yield_token_address = token;
            Ok(())
        })
    }

    /// Turn sweeping on or off. Enabling requires a configured pool.
    pub fn set_aave_enabled(&mut self, ctx: &CallContext, enabled: bool) -> LedgerResult<()> {
        self.configure(ctx, ConfigParameter::AaveEnabled, |l| {
            if enabled && !l.state.config.venue_configured() {
                return Err(LedgerError::VenueNotConfigured);
            }
            l.state.config.aave_enabled = enabled;
            Ok(())
        })
    }

    pub fn set_min_fee(&mut self, ctx: &CallContext, min_fee: u128) -> LedgerResult<()> {
        self.configure(ctx, ConfigParameter::MinFee, |l| {
            l.state.config.min_fee = min_fee;
            Ok(())
        })
    }

    pub fn set_rate_model(&mut self, ctx: &CallContext, model: RateModel) -> LedgerResult<()> {
        self.configure(ctx, ConfigParameter::RateModel, |l| {
            if model.apr_bps > 10 * BPS_DENOMINATOR || model.origination_bps > BPS_DENOMINATOR {
                return Err(LedgerError::InvalidAmount {
                    amount: model.apr_bps.max(model.origination_bps),
                    reason: AmountErrorReason::TooLarge,
                });
            }
            l.state.config.rate_model = model;
            Ok(())
        })
    }

    pub fn transfer_admin(&mut self, ctx: &CallContext, new_admin: Address) -> LedgerResult<()> {
        self.atomic("transfer_admin", |l| {
            let old_admin = l.state.admin.admin();
            l.state.admin.transfer_admin(&ctx.caller, new_admin)?;
            l.emit(LedgerEvent::AdminChanged { old_admin, new_admin });
            info!("admin transferred");
            Ok(())
        })
    }
}
