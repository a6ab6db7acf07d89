//! Mathematical Utilities for the CHICKS engine
//!
//! Amounts are stored as `u128`. Products of two amounts can exceed that
//! range (18-decimal supply times a price), so every `a * b / c` goes
//! through a 256-bit intermediate.

use uint::construct_uint;

use crate::constants::fees::BPS_DENOMINATOR;
use crate::errors::{LedgerError, LedgerResult};

construct_uint! {
    /// 256-bit integer for overflow-free intermediates.
    pub struct U256(4);
}

fn narrow(value: U256) -> LedgerResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(LedgerError::Overflow);
    }
    Ok(value.as_u128())
}

/// `a * b / c`, rounded down
pub fn mul_div(a: u128, b: u128, c: u128) -> LedgerResult<u128> {
    if c == 0 {
        return Err(LedgerError::DivisionByZero);
    }
    narrow(U256::from(a) * U256::from(b) / U256::from(c))
}

/// `a * b / c`, rounded up
pub fn mul_div_ceil(a: u128, b: u128, c: u128) -> LedgerResult<u128> {
    if c == 0 {
        return Err(LedgerError::DivisionByZero);
    }
    let (q, r) = (U256::from(a) * U256::from(b)).div_mod(U256::from(c));
    let q = if r.is_zero() { q } else { q + U256::one() };
    narrow(q)
}

/// `amount * bps / 10_000`, rounded down
pub fn apply_bps(amount: u128, bps: u128) -> LedgerResult<u128> {
    mul_div(amount, bps, BPS_DENOMINATOR)
}

/// `amount * bps / 10_000`, rounded up
pub fn apply_bps_ceil(amount: u128, bps: u128) -> LedgerResult<u128> {
    mul_div_ceil(amount, bps, BPS_DENOMINATOR)
}

/// Safe addition with overflow check
pub fn safe_add(a: u128, b: u128) -> LedgerResult<u128> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u128, b: u128) -> LedgerResult<u128> {
    a.checked_sub(b).ok_or(LedgerError::Underflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_wide_intermediate() {
        // 1e30 * 1e30 overflows u128 but the quotient fits
        let big = 1_000_000_000_000_000_000_000_000_000_000u128;
        assert_eq!(mul_div(big, big, big).unwrap(), big);
    }

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div(10, 1, 3).unwrap(), 3);
        assert_eq!(mul_div_ceil(10, 1, 3).unwrap(), 4);
        assert_eq!(mul_div_ceil(9, 1, 3).unwrap(), 3);
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(mul_div(1, 1, 0), Err(LedgerError::DivisionByZero));
        assert_eq!(mul_div(u128::MAX, 2, 1), Err(LedgerError::Overflow));
    }

    #[test]
    fn test_bps() {
        assert_eq!(apply_bps(1_000_000, 250).unwrap(), 25_000);
        assert_eq!(apply_bps(3, 5_000).unwrap(), 1);
        assert_eq!(apply_bps_ceil(3, 5_000).unwrap(), 2);
    }

    #[test]
    fn test_safe_math() {
        assert_eq!(safe_add(u128::MAX, 1), Err(LedgerError::Overflow));
        assert_eq!(safe_sub(0, 1), Err(LedgerError::Underflow));
        assert_eq!(safe_sub(5, 3).unwrap(), 2);
    }
}
