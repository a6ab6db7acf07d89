//! Trading: bootstrap, buy, sell, donations.

use tracing::info;

use chicks_common::{
    constants::{addresses, fees::BPS_DENOMINATOR, reserve, token},
    errors::{AmountErrorReason, LedgerError, LedgerResult},
    events::LedgerEvent,
    math::{apply_bps, safe_add, safe_sub},
    rates::FeeSplit,
    reserve_token::ReserveToken,
    types::{Address, CallContext},
    venue::YieldVenue,
};

use crate::{require_nonzero, Ledger};

impl<R, V> Ledger<R, V>
where
    R: ReserveToken + Clone,
    V: YieldVenue + Clone,
{
    /// One-time bootstrap, admin only.
    ///
    /// Pulls `reserve_amount` from the admin and mints at a price of exactly
    /// one reserve unit per token. One whole token goes to the dead address
    /// so supply can never return to zero.
    pub fn set_start(&mut self, ctx: &CallContext, reserve_amount: u128) -> LedgerResult<u128> {
        self.atomic("set_start", |l| {
            l.state.admin.require_admin(&ctx.caller)?;
            if l.state.started {
                return Err(LedgerError::AlreadyStarted);
            }
            let minted = reserve_amount
                .checked_mul(reserve::TOKEN_PER_RESERVE_UNIT)
                .ok_or(LedgerError::Overflow)?;
            if minted <= token::ONE {
                return Err(LedgerError::InvalidAmount {
                    amount: reserve_amount,
                    reason: AmountErrorReason::TooSmall,
                });
            }

            l.pull_reserve(&ctx.caller, reserve_amount)?;
            l.state.mint(&addresses::DEAD, token::ONE)?;
            l.state.mint(&ctx.caller, minted - token::ONE)?;
            l.state.started = true;
            let price = l.state.refresh_price()?;
            l.rebalance(0)?;

            l.emit(LedgerEvent::Started {
                admin: ctx.caller,
                reserve: reserve_amount,
                minted,
                timestamp: ctx.now,
            });
            info!(reserve_amount, minted, price, "trading started");
            Ok(minted)
        })
    }

    /// Quote for `buy`, identical to what `buy` would mint in this state
    pub fn get_buy_chicks(&self, reserve_amount: u128) -> LedgerResult<u128> {
        if reserve_amount == 0 {
            return Ok(0);
        }
        self.require_started()?;
        self.state.curve()?.quote_buy(reserve_amount)
    }

    /// Exchange `reserve_amount` from the caller for newly minted CHICKS
    /// credited to `receiver`
    pub fn buy(&mut self, ctx: &CallContext, receiver: Address, reserve_amount: u128) -> LedgerResult<u128> {
        self.atomic("buy", |l| {
            l.require_started()?;
            require_nonzero(reserve_amount)?;
            if receiver == addresses::ZERO {
                return Err(LedgerError::InvalidAddress { reason: "receiver cannot be zero" });
            }

            let minted = l.state.curve()?.quote_buy(reserve_amount)?;
            if minted == 0 {
                return Err(LedgerError::InvalidAmount {
                    amount: reserve_amount,
                    reason: AmountErrorReason::RoundsToZero,
                });
            }
            let fee = apply_bps(reserve_amount, l.state.config.buy_fee_bps)?;
            let split = FeeSplit::new(fee, l.state.config.fee_share_bps)?;

            l.pull_reserve(&ctx.caller, reserve_amount)?;
            l.state.mint(&receiver, minted)?;
            l.rebalance(split.to_fee_address)?;
            let fee_address = l.state.config.fee_address;
            l.pay_reserve(&fee_address, split.to_fee_address)?;
            let price = l.state.refresh_price()?;

            l.emit(LedgerEvent::Bought {
                buyer: ctx.caller,
                receiver,
                reserve_in: reserve_amount,
                minted,
                fee,
                price,
                timestamp: ctx.now,
            });
            info!(reserve_amount, minted, fee, price, "bought");
            Ok(minted)
        })
    }

    /// Burn free CHICKS from the caller for reserve
    pub fn sell(&mut self, ctx: &CallContext, tokens: u128) -> LedgerResult<u128> {
        self.atomic("sell", |l| {
            l.require_started()?;
            require_nonzero(tokens)?;
            l.state.ensure_free(&ctx.caller, tokens)?;

            let curve = l.state.curve()?;
            let gross = curve.value_of(tokens)?;
            let payout = apply_bps(gross, safe_sub(BPS_DENOMINATOR, l.state.config.sell_fee_bps)?)?;
            if payout == 0 {
                return Err(LedgerError::InvalidAmount {
                    amount: tokens,
                    reason: AmountErrorReason::RoundsToZero,
                });
            }
            let fee = gross - payout;
            let split = FeeSplit::new(fee, l.state.config.fee_share_bps)?;

            l.state.burn(&ctx.caller, tokens)?;
            l.rebalance(safe_add(payout, split.to_fee_address)?)?;
            l.pay_reserve(&ctx.caller, payout)?;
            let fee_address = l.state.config.fee_address;
            l.pay_reserve(&fee_address, split.to_fee_address)?;
            let price = l.state.refresh_price()?;

            l.emit(LedgerEvent::Sold {
                seller: ctx.caller,
                burned: tokens,
                reserve_out: payout,
                fee,
                price,
                timestamp: ctx.now,
            });
            info!(tokens, payout, fee, price, "sold");
            Ok(payout)
        })
    }

    /// Add reserve without minting; lifts the price for every holder
    pub fn donate(&mut self, ctx: &CallContext, reserve_amount: u128) -> LedgerResult<()> {
        self.atomic("donate", |l| {
            require_nonzero(reserve_amount)?;
            l.pull_reserve(&ctx.caller, reserve_amount)?;
            if l.state.started {
                l.state.refresh_price()?;
            }
            l.rebalance(0)?;

            l.emit(LedgerEvent::Donated { from: ctx.caller, amount: reserve_amount });
            info!(reserve_amount, "donated");
            Ok(())
        })
    }
}
