//! Error Types for the CHICKS engine
//!
//! Typed errors with stable codes so callers and log pipelines can match
//! on failures without parsing messages.

use thiserror::Error;

use crate::types::Address;

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Main error enum for all engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ============ Amount Errors ============
    /// Zero, out of range or otherwise malformed quantity
    #[error("invalid amount {amount}: {reason:?}")]
    InvalidAmount { amount: u128, reason: AmountErrorReason },

    /// Caller lacks funds
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: u128, requested: u128 },

    /// Spender allowance too small
    #[error("insufficient allowance: approved {approved}, requested {requested}")]
    InsufficientAllowance { approved: u128, requested: u128 },

    /// Attempted transfer of collateral-locked tokens
    #[error("collateral locked: free {free}, requested {requested}")]
    CollateralLocked { free: u128, requested: u128 },

    // ============ Curve Errors ============
    /// Operation would push the price below its last recorded value
    #[error("insufficient reserve backing: price would fall from {last_price} to {new_price}")]
    InsufficientReserveBacking { last_price: u128, new_price: u128 },

    /// Reserve on hand plus the venue cannot cover the payout
    #[error("insufficient liquidity: available {available}, required {required}")]
    InsufficientLiquidity { available: u128, required: u128 },

    /// Trading before the one-time bootstrap
    #[error("trading has not started")]
    NotStarted,

    /// Bootstrap called twice
    #[error("trading already started")]
    AlreadyStarted,

    // ============ Loan Errors ============
    /// Operation requires an open loan
    #[error("no active loan for {borrower:?}")]
    NoActiveLoan { borrower: Address },

    /// Borrower already has an open loan
    #[error("loan already open for {borrower:?}")]
    LoanAlreadyOpen { borrower: Address },

    /// Loan term is over
    #[error("loan expired at {end_date}, now {now}")]
    LoanExpired { end_date: u64, now: u64 },

    /// Liquidation attempted before the loan term ends
    #[error("loan runs until {end_date}, now {now}")]
    LoanNotExpired { end_date: u64, now: u64 },

    /// Remaining collateral would not cover the debt
    #[error("undercollateralized: collateral value {collateral_value}, required {required}")]
    Undercollateralized { collateral_value: u128, required: u128 },

    /// Fee-address share of a loan fee below the configured floor
    #[error("fee {fee} below minimum {minimum}")]
    FeeBelowMinimum { fee: u128, minimum: u128 },

    // ============ Authorization Errors ============
    /// Caller is not the administrator
    #[error("unauthorized: expected {expected:?}, got {actual:?}")]
    Unauthorized { expected: Address, actual: Address },

    /// Zero or otherwise unusable address
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: &'static str },

    // ============ Yield Errors ============
    /// No accrued yield above principal
    #[error("nothing to withdraw: supplied {supplied}, principal {principal}")]
    NothingToWithdraw { supplied: u128, principal: u128 },

    /// Venue pool address was never configured
    #[error("yield venue not configured")]
    VenueNotConfigured,

    /// Venue refused a deposit or withdrawal
    #[error("yield venue failure: {reason}")]
    VenueFailure { reason: &'static str },

    // ============ Token Errors ============
    /// Reserve token transfer failed
    #[error("transfer of {amount} from {from:?} to {to:?} failed")]
    TransferFailed { from: Address, to: Address, amount: u128 },

    // ============ State Errors ============
    /// Checkpoint bytes could not be decoded
    #[error("invalid checkpoint")]
    InvalidCheckpoint,

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic underflow occurred
    #[error("arithmetic underflow")]
    Underflow,

    /// Division by zero
    #[error("division by zero")]
    DivisionByZero,
}

/// Reasons for amount-related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountErrorReason {
    /// Amount is zero when non-zero required
    Zero,
    /// Amount exceeds maximum
    TooLarge,
    /// Amount below minimum
    TooSmall,
    /// Quote rounds down to nothing
    RoundsToZero,
}

impl LedgerError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "E010_INVALID_AMOUNT",
            Self::InsufficientBalance { .. } => "E011_INSUFFICIENT_BALANCE",
            Self::InsufficientAllowance { .. } => "E012_INSUFFICIENT_ALLOWANCE",
            Self::CollateralLocked { .. } => "E013_COLLATERAL_LOCKED",
            Self::InsufficientReserveBacking { .. } => "E020_RESERVE_BACKING",
            Self::InsufficientLiquidity { .. } => "E021_LIQUIDITY",
            Self::NotStarted => "E022_NOT_STARTED",
            Self::AlreadyStarted => "E023_ALREADY_STARTED",
            Self::NoActiveLoan { .. } => "E030_NO_ACTIVE_LOAN",
            Self::LoanAlreadyOpen { .. } => "E031_LOAN_OPEN",
            Self::LoanExpired { .. } => "E032_LOAN_EXPIRED",
            Self::LoanNotExpired { .. } => "E033_LOAN_NOT_EXPIRED",
            Self::Undercollateralized { .. } => "E034_UNDERCOLLATERALIZED",
            Self::FeeBelowMinimum { .. } => "E035_FEE_BELOW_MIN",
            Self::Unauthorized { .. } => "E040_UNAUTHORIZED",
            Self::InvalidAddress { .. } => "E041_INVALID_ADDRESS",
            Self::NothingToWithdraw { .. } => "E050_NOTHING_TO_WITHDRAW",
            Self::VenueNotConfigured => "E051_VENUE_NOT_CONFIGURED",
            Self::VenueFailure { .. } => "E052_VENUE_FAILURE",
            Self::TransferFailed { .. } => "E060_TRANSFER_FAILED",
            Self::InvalidCheckpoint => "E070_INVALID_CHECKPOINT",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
        }
    }

    /// Returns true if this error is recoverable (user can fix it)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientBalance { .. } => true,   // Get more funds
            Self::InsufficientAllowance { .. } => true, // Approve more
            Self::CollateralLocked { .. } => true,      // Repay first
            Self::FeeBelowMinimum { .. } => true,       // Borrow more
            Self::InvalidAmount { .. } => true,         // Fix input
            Self::InsufficientLiquidity { .. } => true, // Retry later
            Self::LoanAlreadyOpen { .. } => true,       // Use borrow_more
            _ => false,
        }
    }
}
