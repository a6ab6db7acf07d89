//! Protocol Constants
//!
//! Every fixed number the CHICKS engine relies on. Values that are
//! network dependent are switched by the `mainnet` feature:
//! - `mainnet` - Production values (real fee floors and buffers)
//! - Default (no feature) - Testnet values (small floors for faucet testing)
//!
//! ```toml
//! # For mainnet deployment:
//! chicks-common = { path = "...", features = ["mainnet"] }
//! ```

/// CHICKS token metadata
pub mod token {
    /// Token name
    pub const NAME: &str = "Chicks";
    /// Token symbol
    pub const SYMBOL: &str = "CHICKS";
    /// Decimal places
    pub const DECIMALS: u8 = 18;
    /// One whole token in base units
    pub const ONE: u128 = 1_000_000_000_000_000_000;
}

/// Reserve asset (USDC) metadata
pub mod reserve {
    /// Token symbol
    pub const SYMBOL: &str = "USDC";
    /// Decimal places
    pub const DECIMALS: u8 = 6;
    /// One whole USDC in base units
    pub const ONE: u128 = 1_000_000;
    /// Token base units minted per reserve base unit at a price of 1.0
    pub const TOKEN_PER_RESERVE_UNIT: u128 = super::token::ONE / ONE;
}

/// Trade fees (in basis points, 100 = 1%)
pub mod fees {
    /// Basis points denominator
    pub const BPS_DENOMINATOR: u128 = 10_000;

    /// Fee withheld on buys (2.5%)
    pub const BUY_FEE_BPS: u128 = 250;

    /// Fee withheld on sells (2.5%)
    pub const SELL_FEE_BPS: u128 = 250;

    /// Share of every withheld fee paid out to the fee address (30%).
    /// The remainder stays in the reserve and lifts the price.
    pub const FEE_SHARE_BPS: u128 = 3_000;
}

/// Loan parameters
pub mod loans {
    /// Yearly interest rate (39%)
    pub const APR_BPS: u128 = 3_900;

    /// One-off origination charge (1%)
    pub const ORIGINATION_BPS: u128 = 100;

    /// Days per interest year
    pub const DAYS_PER_YEAR: u128 = 365;

    /// Seconds per loan day
    pub const SECONDS_PER_DAY: u64 = 86_400;

    /// Longest allowed loan term
    pub const MAX_LOAN_DAYS: u32 = 365;

    /// Collateral value required per unit borrowed (101%)
    pub const OVER_COLLATERALIZATION_BPS: u128 = 10_100;

    /// Collateral value paid to the liquidator on top of the debt (5%)
    pub const LIQUIDATION_PENALTY_BPS: u128 = 500;
}

/// Network dependent limits
///
/// Values differ between mainnet and testnet to allow easier testing.
pub mod limits {
    use super::reserve::ONE;

    /// Minimum fee-address share of a loan fee
    /// - Mainnet: 1 USDC
    /// - Testnet: 0.01 USDC
    #[cfg(feature = "mainnet")]
    pub const MIN_FEE: u128 = ONE;
    #[cfg(not(feature = "mainnet"))]
    pub const MIN_FEE: u128 = ONE / 100;

    /// Reserve kept on hand before sweeping to the yield venue
    /// - Mainnet: 10,000 USDC
    /// - Testnet: 100 USDC
    #[cfg(feature = "mainnet")]
    pub const MIN_LIQUIDITY_BUFFER: u128 = 10_000 * ONE;
    #[cfg(not(feature = "mainnet"))]
    pub const MIN_LIQUIDITY_BUFFER: u128 = 100 * ONE;

    /// Helper to check if running in mainnet mode
    #[cfg(feature = "mainnet")]
    pub const IS_MAINNET: bool = true;
    #[cfg(not(feature = "mainnet"))]
    pub const IS_MAINNET: bool = false;
}

/// Well known addresses
pub mod addresses {
    use crate::types::Address;

    /// Unset address
    pub const ZERO: Address = [0u8; 20];

    /// Burn sink holding the bootstrap token so supply never returns to zero
    pub const DEAD: Address = [
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xde, 0xad,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_scaling() {
        assert_eq!(reserve::TOKEN_PER_RESERVE_UNIT, 1_000_000_000_000);
        assert_eq!(reserve::ONE * reserve::TOKEN_PER_RESERVE_UNIT, token::ONE);
    }

    #[test]
    fn test_fee_bounds() {
        assert!(fees::BUY_FEE_BPS < fees::BPS_DENOMINATOR);
        assert!(fees::SELL_FEE_BPS < fees::BPS_DENOMINATOR);
        assert!(fees::FEE_SHARE_BPS <= fees::BPS_DENOMINATOR);
        assert!(loans::OVER_COLLATERALIZATION_BPS > fees::BPS_DENOMINATOR);
    }

    #[cfg(not(feature = "mainnet"))]
    #[test]
    fn test_testnet_limits() {
        assert!(!limits::IS_MAINNET);
        assert_eq!(limits::MIN_FEE, 10_000);
    }
}
