//! Pricing Curve
//!
//! Backing-ratio bonding curve. The price of one whole CHICKS is the
//! reserve backing divided by circulating supply:
//!
//! ```text
//! price = backing * 1e18 / supply        (reserve base units per token)
//! ```
//!
//! Buys mint at the current price less the buy fee, sells burn at the
//! current price less the sell fee. The withheld fee that is not paid out
//! stays in the reserve, so every trade leaves the price at or above
//! where it was. Quotes always round in the engine's favor.

use crate::constants::{fees::BPS_DENOMINATOR, token};
use crate::errors::{LedgerError, LedgerResult};
use crate::math::{apply_bps, mul_div, mul_div_ceil, safe_sub};

/// Immutable snapshot of the curve inputs for one quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingCurve {
    /// Reserve on hand + swept + outstanding loan principal
    pub backing: u128,
    /// Circulating CHICKS
    pub supply: u128,
    pub buy_fee_bps: u128,
    pub sell_fee_bps: u128,
}

impl PricingCurve {
    pub fn new(backing: u128, supply: u128, buy_fee_bps: u128, sell_fee_bps: u128) -> Self {
        Self { backing, supply, buy_fee_bps, sell_fee_bps }
    }

    fn ensure_live(&self) -> LedgerResult<()> {
        if self.supply == 0 || self.backing == 0 {
            return Err(LedgerError::NotStarted);
        }
        Ok(())
    }

    /// Marginal price in reserve base units per whole token. Zero before bootstrap.
    pub fn price(&self) -> LedgerResult<u128> {
        if self.supply == 0 {
            return Ok(0);
        }
        mul_div(self.backing, token::ONE, self.supply)
    }

    /// Tokens minted for `reserve_in`, net of the buy fee
    pub fn quote_buy(&self, reserve_in: u128) -> LedgerResult<u128> {
        if reserve_in == 0 {
            return Ok(0);
        }
        let gross = self.quote_buy_no_fee(reserve_in)?;
        apply_bps(gross, safe_sub(BPS_DENOMINATOR, self.buy_fee_bps)?)
    }

    /// Tokens worth `reserve_in` at the current price, no fee
    pub fn quote_buy_no_fee(&self, reserve_in: u128) -> LedgerResult<u128> {
        if reserve_in == 0 {
            return Ok(0);
        }
        self.ensure_live()?;
        mul_div(reserve_in, self.supply, self.backing)
    }

    /// Reserve paid out for burning `tokens_in`, net of the sell fee
    pub fn quote_sell(&self, tokens_in: u128) -> LedgerResult<u128> {
        if tokens_in == 0 {
            return Ok(0);
        }
        let gross = self.value_of(tokens_in)?;
        apply_bps(gross, safe_sub(BPS_DENOMINATOR, self.sell_fee_bps)?)
    }

    /// Reserve value of `tokens` at the current price, rounded down
    pub fn value_of(&self, tokens: u128) -> LedgerResult<u128> {
        if tokens == 0 {
            return Ok(0);
        }
        self.ensure_live()?;
        mul_div(tokens, self.backing, self.supply)
    }

    /// Tokens needed to be worth at least `value`, rounded up
    pub fn tokens_for_value(&self, value: u128) -> LedgerResult<u128> {
        if value == 0 {
            return Ok(0);
        }
        self.ensure_live()?;
        mul_div_ceil(value, self.supply, self.backing)
    }
}

/// Reserve required to back `supply` at `last_price`
pub fn backing_required(supply: u128, last_price: u128) -> LedgerResult<u128> {
    mul_div(supply, last_price, token::ONE)
}

/// Fails unless `new_price` keeps the floor set by `last_price`
pub fn ensure_price_floor(last_price: u128, new_price: u128) -> LedgerResult<()> {
    if new_price < last_price {
        return Err(LedgerError::InsufficientReserveBacking { last_price, new_price });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::reserve;
    use proptest::prelude::*;

    const ONE_USDC: u128 = reserve::ONE;
    const ONE_CHICKS: u128 = token::ONE;

    /// 1,000 USDC backing 1,000 CHICKS: price 1.0
    fn par_curve() -> PricingCurve {
        PricingCurve::new(1_000 * ONE_USDC, 1_000 * ONE_CHICKS, 250, 250)
    }

    #[test]
    fn test_price_at_par() {
        assert_eq!(par_curve().price().unwrap(), ONE_USDC);
    }

    #[test]
    fn test_price_before_start() {
        let curve = PricingCurve::new(0, 0, 250, 250);
        assert_eq!(curve.price().unwrap(), 0);
        assert_eq!(curve.quote_buy(0).unwrap(), 0);
        assert_eq!(curve.quote_buy(ONE_USDC), Err(LedgerError::NotStarted));
    }

    #[test]
    fn test_quote_buy_applies_fee() {
        // 100 USDC at 1.0 less 2.5%
        let minted = par_curve().quote_buy(100 * ONE_USDC).unwrap();
        assert_eq!(minted, 97_500_000_000_000_000_000);
    }

    #[test]
    fn test_quote_sell_applies_fee() {
        let out = par_curve().quote_sell(100 * ONE_CHICKS).unwrap();
        assert_eq!(out, 97_500_000);
    }

    #[test]
    fn test_zero_quotes() {
        let curve = par_curve();
        assert_eq!(curve.quote_buy(0).unwrap(), 0);
        assert_eq!(curve.quote_sell(0).unwrap(), 0);
    }

    #[test]
    fn test_tokens_for_value_rounds_up() {
        let curve = PricingCurve::new(3, 10, 0, 0);
        // 1 unit of value needs 10/3 tokens
        assert_eq!(curve.tokens_for_value(1).unwrap(), 4);
        assert_eq!(curve.value_of(4).unwrap(), 1);
    }

    #[test]
    fn test_backing_required() {
        assert_eq!(backing_required(1_000 * ONE_CHICKS, ONE_USDC).unwrap(), 1_000 * ONE_USDC);
        assert_eq!(backing_required(0, ONE_USDC).unwrap(), 0);
    }

    #[test]
    fn test_price_floor() {
        assert!(ensure_price_floor(100, 100).is_ok());
        assert!(ensure_price_floor(100, 101).is_ok());
        assert!(matches!(
            ensure_price_floor(100, 99),
            Err(LedgerError::InsufficientReserveBacking { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            .. ProptestConfig::default()
        })]

        #[test]
        fn round_trip_never_creates_value(
            backing in ONE_USDC..1_000_000_000 * ONE_USDC,
            supply in ONE_CHICKS..1_000_000_000 * ONE_CHICKS,
            fee in 0u128..1_000,
            reserve_in in 1u128..10_000_000 * ONE_USDC,
        ) {
            let curve = PricingCurve::new(backing, supply, fee, fee);
            let minted = curve.quote_buy(reserve_in).unwrap();
            let back = curve.quote_sell(minted).unwrap();
            prop_assert!(back <= reserve_in);
        }

        #[test]
        fn quote_buy_is_monotonic(
            backing in ONE_USDC..1_000_000_000 * ONE_USDC,
            supply in ONE_CHICKS..1_000_000_000 * ONE_CHICKS,
            a in 0u128..1_000_000 * ONE_USDC,
            b in 0u128..1_000_000 * ONE_USDC,
        ) {
            let curve = PricingCurve::new(backing, supply, 250, 250);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(curve.quote_buy(lo).unwrap() <= curve.quote_buy(hi).unwrap());
        }
    }
}
