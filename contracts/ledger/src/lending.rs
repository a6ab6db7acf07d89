//! Lending: loans against CHICKS collateral.
//!
//! `borrow` locks tokens the caller already holds; `leverage` mints the
//! collateral as part of the same call and the caller funds only the
//! margin and fees. Both end up as the same `Open` loan in the book.
//!
//! Outstanding principal counts as backing, so handing reserve to a
//! borrower leaves the price untouched while the retained part of the fee
//! raises it.

use tracing::info;

use chicks_common::{
    constants::{fees::BPS_DENOMINATOR, loans::SECONDS_PER_DAY},
    errors::{AmountErrorReason, LedgerError, LedgerResult},
    events::LedgerEvent,
    math::{apply_bps, apply_bps_ceil, mul_div, safe_add, safe_sub},
    rates::FeeSplit,
    reserve_token::ReserveToken,
    types::{Address, CallContext, CloseReason, LoanSnapshot},
    venue::YieldVenue,
};

use crate::{require_nonzero, Ledger};

/// Cost breakdown of a leveraged position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeverageTerms {
    /// Reserve lent by the engine
    pub borrowed: u128,
    /// Part of the position the caller funds directly
    pub margin: u128,
    pub interest_fee: u128,
    pub buy_fee: u128,
}

impl LeverageTerms {
    pub fn total_fee(&self) -> LedgerResult<u128> {
        safe_add(self.interest_fee, self.buy_fee)
    }

    /// Reserve pulled from the caller
    pub fn caller_pays(&self) -> LedgerResult<u128> {
        safe_add(self.margin, self.total_fee()?)
    }
}

impl<R, V> Ledger<R, V>
where
    R: ReserveToken + Clone,
    V: YieldVenue + Clone,
{
    // ============ Quotes ============

    /// Prepaid fee for borrowing `amount` over `days`
    pub fn get_interest_fee(&self, amount: u128, days: u32) -> LedgerResult<u128> {
        self.state.config.rate_model.interest_fee(amount, days)
    }

    pub fn leverage_terms(&self, amount: u128, days: u32) -> LedgerResult<LeverageTerms> {
        let config = &self.state.config;
        let borrowed = mul_div(amount, BPS_DENOMINATOR, config.over_collateralization_bps)?;
        Ok(LeverageTerms {
            borrowed,
            margin: safe_sub(amount, borrowed)?,
            interest_fee: config.rate_model.interest_fee(borrowed, days)?,
            buy_fee: apply_bps(amount, config.buy_fee_bps)?,
        })
    }

    /// Fees charged on top of the margin for a leveraged position
    pub fn leverage_fee(&self, amount: u128, days: u32) -> LedgerResult<u128> {
        self.leverage_terms(amount, days)?.total_fee()
    }

    /// `{collateral, borrowed, end_date, number_of_days}`, zeros without an open loan
    pub fn loans(&self, borrower: &Address) -> LoanSnapshot {
        self.state.loans.snapshot(borrower)
    }

    /// Borrowers that can be liquidated at `now`
    pub fn liquidatable_loans(&self, now: u64) -> Vec<Address> {
        self.state.loans.expired(now)
    }

    // ============ Helpers ============

    fn validate_days(&self, days: u32) -> LedgerResult<()> {
        if days == 0 {
            return Err(LedgerError::InvalidAmount { amount: 0, reason: AmountErrorReason::Zero });
        }
        if days > self.state.config.max_loan_days {
            return Err(LedgerError::InvalidAmount {
                amount: days as u128,
                reason: AmountErrorReason::TooLarge,
            });
        }
        Ok(())
    }

    /// Tokens that must be locked to borrow `borrowed` at the current price
    fn required_collateral(&self, borrowed: u128) -> LedgerResult<u128> {
        let value = apply_bps_ceil(borrowed, self.state.config.over_collateralization_bps)?;
        self.state.curve()?.tokens_for_value(value)
    }

    /// Split `fee` and enforce the minimum fee-address share
    fn split_loan_fee(&self, fee: u128) -> LedgerResult<FeeSplit> {
        let split = FeeSplit::new(fee, self.state.config.fee_share_bps)?;
        let minimum = self.state.config.min_fee;
        if split.to_fee_address < minimum {
            return Err(LedgerError::FeeBelowMinimum { fee: split.to_fee_address, minimum });
        }
        Ok(split)
    }

    fn require_free_collateral(&self, borrower: &Address, tokens: u128) -> LedgerResult<()> {
        let free = self.state.free_balance(borrower);
        if free < tokens {
            return Err(LedgerError::InsufficientBalance { available: free, requested: tokens });
        }
        Ok(())
    }

    /// Pay `net` to the borrower and the fee share to the fee address
    fn disburse(&mut self, borrower: &Address, net: u128, split: &FeeSplit) -> LedgerResult<()> {
        self.rebalance(safe_add(net, split.to_fee_address)?)?;
        self.pay_reserve(borrower, net)?;
        let fee_address = self.state.config.fee_address;
        self.pay_reserve(&fee_address, split.to_fee_address)
    }

    // ============ Opening ============

    /// Lock free CHICKS and borrow `amount` of reserve for `days`.
    /// The prepaid fee is deducted from what the borrower receives.
    pub fn borrow(&mut self, ctx: &CallContext, amount: u128, days: u32) -> LedgerResult<u128> {
        self.atomic("borrow", |l| {
            l.require_started()?;
            require_nonzero(amount)?;
            l.validate_days(days)?;
            if l.state.loans.state(&ctx.caller).is_open() {
                return Err(LedgerError::LoanAlreadyOpen { borrower: ctx.caller });
            }

            let collateral = l.required_collateral(amount)?;
            l.require_free_collateral(&ctx.caller, collateral)?;

            let fee = l.get_interest_fee(amount, days)?;
            let split = l.split_loan_fee(fee)?;
            if fee >= amount {
                return Err(LedgerError::InvalidAmount { amount, reason: AmountErrorReason::TooSmall });
            }
            let net = amount - fee;

            let loan = l.state.loans.open(ctx.caller, collateral, amount, days, ctx.now)?.clone();
            l.disburse(&ctx.caller, net, &split)?;
            let price = l.state.refresh_price()?;

            l.emit(LedgerEvent::LoanOpened {
                loan_id: loan.id,
                borrower: ctx.caller,
                collateral,
                borrowed: amount,
                fee,
                end_date: loan.end_date,
                leveraged: false,
            });
            info!(amount, collateral, fee, days, price, "loan opened");
            Ok(net)
        })
    }

    /// Borrow `extra` on top of an active loan until its current end date
    pub fn borrow_more(&mut self, ctx: &CallContext, extra: u128) -> LedgerResult<u128> {
        self.atomic("borrow_more", |l| {
            require_nonzero(extra)?;
            let loan = l.state.loans.active(&ctx.caller, ctx.now)?.clone();

            let new_borrowed = safe_add(loan.borrowed, extra)?;
            let required = l.required_collateral(new_borrowed)?;
            let extra_collateral = required.saturating_sub(loan.collateral);
            l.require_free_collateral(&ctx.caller, extra_collateral)?;

            let days = loan.remaining_days(ctx.now);
            let fee = l.get_interest_fee(extra, days)?;
            let split = l.split_loan_fee(fee)?;
            if fee >= extra {
                return Err(LedgerError::InvalidAmount { amount: extra, reason: AmountErrorReason::TooSmall });
            }
            let net = extra - fee;

            l.state.loans.increase(&ctx.caller, extra, extra_collateral, ctx.now)?;
            l.disburse(&ctx.caller, net, &split)?;
            l.state.refresh_price()?;

            l.emit(LedgerEvent::LoanIncreased {
                loan_id: loan.id,
                borrower: ctx.caller,
                extra_borrowed: extra,
                extra_collateral,
                fee,
            });
            info!(extra, extra_collateral, fee, days, "loan increased");
            Ok(net)
        })
    }

    /// Open a position worth `amount` of reserve. The collateral is minted
    /// at the current price without the buy fee; the caller pays the
    /// margin plus `leverage_fee`. Returns the collateral minted.
    pub fn leverage(&mut self, ctx: &CallContext, amount: u128, days: u32) -> LedgerResult<u128> {
        self.atomic("leverage", |l| {
            l.require_started()?;
            require_nonzero(amount)?;
            l.validate_days(days)?;
            if l.state.loans.state(&ctx.caller).is_open() {
                return Err(LedgerError::LoanAlreadyOpen { borrower: ctx.caller });
            }

            let terms = l.leverage_terms(amount, days)?;
            let collateral = l.state.curve()?.quote_buy_no_fee(amount)?;
            if collateral == 0 || terms.borrowed == 0 {
                return Err(LedgerError::InvalidAmount { amount, reason: AmountErrorReason::RoundsToZero });
            }
            let fee = terms.total_fee()?;
            let split = l.split_loan_fee(fee)?;

            l.pull_reserve(&ctx.caller, terms.caller_pays()?)?;
            l.state.mint(&ctx.caller, collateral)?;
            let loan = l.state.loans.open(ctx.caller, collateral, terms.borrowed, days, ctx.now)?.clone();
            l.rebalance(split.to_fee_address)?;
            let fee_address = l.state.config.fee_address;
            l.pay_reserve(&fee_address, split.to_fee_address)?;
            let price = l.state.refresh_price()?;

            l.emit(LedgerEvent::LoanOpened {
                loan_id: loan.id,
                borrower: ctx.caller,
                collateral,
                borrowed: terms.borrowed,
                fee,
                end_date: loan.end_date,
                leveraged: true,
            });
            info!(amount, collateral, borrowed = terms.borrowed, fee, days, price, "leveraged position opened");
            Ok(collateral)
        })
    }

    // ============ Maintenance ============

    /// Pay the fee for `days` more on the current principal and push the
    /// end date out
    pub fn extend_loan(&mut self, ctx: &CallContext, days: u32) -> LedgerResult<u64> {
        self.atomic("extend_loan", |l| {
            let loan = l.state.loans.active(&ctx.caller, ctx.now)?.clone();
            l.validate_days(days)?;
            let total_days = loan.remaining_days(ctx.now).saturating_add(days);
            if total_days > l.state.config.max_loan_days {
                return Err(LedgerError::InvalidAmount {
                    amount: days as u128,
                    reason: AmountErrorReason::TooLarge,
                });
            }

            let fee = l.get_interest_fee(loan.borrowed, days)?;
            let split = l.split_loan_fee(fee)?;

            l.pull_reserve(&ctx.caller, fee)?;
            let new_end_date = l.state.loans.extend(&ctx.caller, days, ctx.now)?;
            l.rebalance(split.to_fee_address)?;
            let fee_address = l.state.config.fee_address;
            l.pay_reserve(&fee_address, split.to_fee_address)?;
            l.state.refresh_price()?;

            l.emit(LedgerEvent::LoanExtended {
                loan_id: loan.id,
                borrower: ctx.caller,
                new_end_date,
                fee,
            });
            info!(days, fee, new_end_date, "loan extended");
            Ok(new_end_date)
        })
    }

    /// Unlock collateral while the rest still covers the debt
    pub fn remove_collateral(&mut self, ctx: &CallContext, tokens: u128) -> LedgerResult<()> {
        self.atomic("remove_collateral", |l| {
            require_nonzero(tokens)?;
            let loan = l.state.loans.active(&ctx.caller, ctx.now)?.clone();
            if tokens > loan.collateral {
                return Err(LedgerError::InvalidAmount { amount: tokens, reason: AmountErrorReason::TooLarge });
            }

            let remaining_value = l.state.curve()?.value_of(loan.collateral - tokens)?;
            let required = apply_bps_ceil(loan.borrowed, l.state.config.over_collateralization_bps)?;
            if remaining_value < required {
                return Err(LedgerError::Undercollateralized {
                    collateral_value: remaining_value,
                    required,
                });
            }

            l.state.loans.release_collateral(&ctx.caller, tokens, ctx.now)?;
            l.emit(LedgerEvent::CollateralRemoved {
                loan_id: loan.id,
                borrower: ctx.caller,
                amount: tokens,
            });
            info!(tokens, "collateral removed");
            Ok(())
        })
    }

    // ============ Closing ============

    /// Repay `amount` of principal; collateral is released pro rata and a
    /// full repayment closes the loan
    pub fn repay(&mut self, ctx: &CallContext, amount: u128) -> LedgerResult<u128> {
        self.atomic("repay", |l| {
            require_nonzero(amount)?;
            l.state.loans.active(&ctx.caller, ctx.now)?;

            l.pull_reserve(&ctx.caller, amount)?;
            let repayment = l.state.loans.repay(&ctx.caller, amount, ctx.now)?;
            l.rebalance(0)?;
            l.state.refresh_price()?;

            l.emit(LedgerEvent::LoanRepaid {
                loan_id: repayment.loan_id,
                borrower: ctx.caller,
                amount,
                collateral_released: repayment.collateral_released,
                remaining: repayment.remaining,
            });
            if repayment.closed {
                l.emit(LedgerEvent::LoanClosed {
                    loan_id: repayment.loan_id,
                    borrower: ctx.caller,
                    reason: CloseReason::Repaid,
                });
            }
            info!(amount, released = repayment.collateral_released, remaining = repayment.remaining, "loan repaid");
            Ok(repayment.collateral_released)
        })
    }

    /// Repay the whole principal in reserve
    pub fn close_position(&mut self, ctx: &CallContext) -> LedgerResult<u128> {
        let borrowed = self.state.loans.snapshot(&ctx.caller).borrowed;
        if borrowed == 0 {
            return Err(LedgerError::NoActiveLoan { borrower: ctx.caller });
        }
        self.repay(ctx, borrowed)
    }

    /// Sell the collateral through the curve, settle the debt from the
    /// proceeds and pay the borrower the rest
    pub fn flash_close_position(&mut self, ctx: &CallContext) -> LedgerResult<u128> {
        self.atomic("flash_close_position", |l| {
            let loan = l.state.loans.active(&ctx.caller, ctx.now)?.clone();

            let curve = l.state.curve()?;
            let gross = curve.value_of(loan.collateral)?;
            let proceeds = curve.quote_sell(loan.collateral)?;
            if proceeds < loan.borrowed {
                return Err(LedgerError::Undercollateralized {
                    collateral_value: proceeds,
                    required: loan.borrowed,
                });
            }
            let split = FeeSplit::new(gross - proceeds, l.state.config.fee_share_bps)?;
            let to_borrower = proceeds - loan.borrowed;

            l.state.loans.close(&ctx.caller, CloseReason::FlashClosed, ctx.now)?;
            l.state.burn(&ctx.caller, loan.collateral)?;
            l.disburse(&ctx.caller, to_borrower, &split)?;
            let price = l.state.refresh_price()?;

            l.emit(LedgerEvent::LoanClosed {
                loan_id: loan.id,
                borrower: ctx.caller,
                reason: CloseReason::FlashClosed,
            });
            info!(collateral = loan.collateral, borrowed = loan.borrowed, to_borrower, price, "position flash closed");
            Ok(to_borrower)
        })
    }

    /// Seize an expired loan. Collateral worth the debt is burned, the
    /// liquidator receives the penalty in CHICKS and the borrower keeps
    /// whatever is left.
    pub fn liquidate(&mut self, ctx: &CallContext, borrower: Address) -> LedgerResult<u128> {
        self.atomic("liquidate", |l| {
            let loan = l
                .state
                .loans
                .loan(&borrower)
                .cloned()
                .ok_or(LedgerError::NoActiveLoan { borrower })?;
            if !loan.is_expired(ctx.now) {
                return Err(LedgerError::LoanNotExpired { end_date: loan.end_date, now: ctx.now });
            }

            let curve = l.state.curve()?;
            let burned = curve.tokens_for_value(loan.borrowed)?.min(loan.collateral);
            let penalty_value = apply_bps(loan.borrowed, l.state.config.liquidation_penalty_bps)?;
            let penalty = curve
                .quote_buy_no_fee(penalty_value)?
                .min(loan.collateral - burned);
            let returned = loan.collateral - burned - penalty;

            l.state.loans.close(&borrower, CloseReason::Liquidated, ctx.now)?;
            l.state.burn(&borrower, burned)?;
            l.state.move_tokens(&borrower, &ctx.caller, penalty)?;
            l.rebalance(0)?;
            let price = l.state.refresh_price()?;

            l.emit(LedgerEvent::Liquidated {
                loan_id: loan.id,
                borrower,
                liquidator: ctx.caller,
                debt_written_off: loan.borrowed,
                burned,
                penalty,
                returned,
            });
            l.emit(LedgerEvent::LoanClosed {
                loan_id: loan.id,
                borrower,
                reason: CloseReason::Liquidated,
            });
            info!(
                debt = loan.borrowed,
                burned,
                penalty,
                returned,
                price,
                overdue_days = (ctx.now - loan.end_date) / SECONDS_PER_DAY,
                "loan liquidated"
            );
            Ok(penalty)
        })
    }
}
