//! CHICKS Common Library
//!
//! Shared types, constants and building blocks for the CHICKS engine: a
//! bonding-curve token bought and sold against a USDC reserve, with
//! collateralized loans against the token and idle reserve swept into an
//! external yield venue.
//!
//! ## Modules
//!
//! - **Pricing Curve**: backing-ratio price, buy/sell quotes, price floor
//! - **Loan Book**: per-borrower `NoLoan / Open / Closed` state and totals
//! - **Reserve Account**: on-hand buffer vs swept principal, sweep planning
//! - **Rates**: configurable prepaid interest model and fee split
//! - **Interfaces**: `ReserveToken` and `YieldVenue` capability traits
//! - **Events / Errors / Access Control / Config**

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod curve;
pub mod rates;
pub mod config;
pub mod access_control;
pub mod events;
pub mod loan_book;
pub mod reserve;
pub mod reserve_token;
pub mod venue;

pub use errors::{AmountErrorReason, LedgerError, LedgerResult};
pub use types::{Address, CallContext};
