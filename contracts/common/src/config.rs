//! Ledger configuration record
//!
//! Owned by the ledger and changed only through admin-gated setters.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::{addresses, fees, limits, loans};
use crate::rates::RateModel;
use crate::types::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LedgerConfig {
    /// Receives the fee-address share of trade and loan fees
    pub fee_address: Address,
    /// Reserve kept on hand; anything above is swept
    pub min_liquidity_buffer: u128,
    /// Sweep surplus reserve into the yield venue
    pub aave_enabled: bool,
    /// Yield venue pool
    pub yield_venue_address: Address,
    /// Receipt token the venue mints for deposits
    pub yield_token_address: Address,
    /// Floor for the fee-address share of a loan fee
    pub min_fee: u128,
    pub buy_fee_bps: u128,
    pub sell_fee_bps: u128,
    pub fee_share_bps: u128,
    pub over_collateralization_bps: u128,
    pub liquidation_penalty_bps: u128,
    pub max_loan_days: u32,
    pub rate_model: RateModel,
}

impl LedgerConfig {
    pub fn new(fee_address: Address) -> Self {
        Self {
            fee_address,
            min_liquidity_buffer: limits::MIN_LIQUIDITY_BUFFER,
            aave_enabled: false,
            yield_venue_address: addresses::ZERO,
            yield_token_address: addresses::ZERO,
            min_fee: limits::MIN_FEE,
            buy_fee_bps: fees::BUY_FEE_BPS,
            sell_fee_bps: fees::SELL_FEE_BPS,
            fee_share_bps: fees::FEE_SHARE_BPS,
            over_collateralization_bps: loans::OVER_COLLATERALIZATION_BPS,
            liquidation_penalty_bps: loans::LIQUIDATION_PENALTY_BPS,
            max_loan_days: loans::MAX_LOAN_DAYS,
            rate_model: RateModel::default(),
        }
    }

    /// True once a pool address has been set
    pub fn venue_configured(&self) -> bool {
        self.yield_venue_address != addresses::ZERO
    }
}
