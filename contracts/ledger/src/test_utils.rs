//! Shared harness for the ledger test suites.

use chicks_common::{
    constants::{reserve, token},
    reserve_token::ReserveToken,
    types::{address_from_label, Address, CallContext},
};
use chicks_reserve_token::UsdcToken;
use chicks_yield_venue::InMemoryVenue;

use crate::Ledger;

pub const ONE_USDC: u128 = reserve::ONE;
pub const ONE_TOKEN: u128 = token::ONE;
pub const DAY: u64 = 86_400;
/// Clock at the start of every scenario
pub const T0: u64 = 1_700_000_000;
/// Minimum fee share used by the harness regardless of network
pub const TEST_MIN_FEE: u128 = 10_000;

pub type TestLedger = Ledger<UsdcToken, InMemoryVenue>;

pub fn engine() -> Address {
    address_from_label("chicks-engine")
}

pub fn admin() -> Address {
    address_from_label("admin")
}

pub fn fee_sink() -> Address {
    address_from_label("fee-sink")
}

pub fn faucet() -> Address {
    address_from_label("usdc-faucet")
}

pub fn pool() -> Address {
    address_from_label("aave-pool")
}

pub fn a_usdc() -> Address {
    address_from_label("a-usdc")
}

pub fn alice() -> Address {
    address_from_label("alice")
}

pub fn bob() -> Address {
    address_from_label("bob")
}

pub fn carol() -> Address {
    address_from_label("carol")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ctx(caller: Address) -> CallContext {
    CallContext::new(caller, T0)
}

pub fn ctx_at(caller: Address, now: u64) -> CallContext {
    CallContext::new(caller, now)
}

/// Fresh, not yet started ledger with the harness minimum fee
pub fn new_ledger() -> TestLedger {
    init_tracing();
    let mut ledger = Ledger::new(
        engine(),
        admin(),
        fee_sink(),
        UsdcToken::new(faucet()),
        InMemoryVenue::new(),
    )
    .unwrap();
    ledger.set_min_fee(&ctx(admin()), TEST_MIN_FEE).unwrap();
    ledger.take_events();
    ledger
}

/// Wire up the venue, enable deposits and set the on-hand buffer
pub fn enable_venue(ledger: &mut TestLedger, buffer: u128) {
    let admin_ctx = ctx(admin());
    ledger.set_aave_pool(&admin_ctx, pool()).unwrap();
    ledger.set_a_usdc_token(&admin_ctx, a_usdc()).unwrap();
    ledger.set_aave_enabled(&admin_ctx, true).unwrap();
    ledger.set_min_liquidity_buffer(&admin_ctx, buffer).unwrap();
    ledger.take_events();
}

/// Mint USDC to `user` and let the engine pull it
pub fn fund(ledger: &mut TestLedger, user: &Address, amount: u128) {
    let engine = ledger.address();
    let token = ledger.token_mut();
    token.mint(&faucet(), user, amount).unwrap();
    token.approve(user, &engine, u128::MAX);
}

/// Ledger bootstrapped with 1,000 USDC, so one CHICKS is worth one USDC
pub fn started_ledger() -> TestLedger {
    let mut ledger = new_ledger();
    fund(&mut ledger, &admin(), 1_000 * ONE_USDC);
    ledger.set_start(&ctx(admin()), 1_000 * ONE_USDC).unwrap();
    ledger.take_events();
    ledger
}

/// Started ledger where alice holds 500 CHICKS and 100 USDC
pub fn ledger_with_holder() -> TestLedger {
    let mut ledger = started_ledger();
    ledger.transfer(&ctx(admin()), alice(), 500 * ONE_TOKEN).unwrap();
    fund(&mut ledger, &alice(), 100 * ONE_USDC);
    ledger.take_events();
    ledger
}

/// Credit venue interest and the matching USDC to the engine account
pub fn accrue_yield(ledger: &mut TestLedger, amount: u128) {
    let engine = ledger.address();
    ledger.venue_mut().accrue_amount(amount).unwrap();
    ledger.token_mut().mint(&faucet(), &engine, amount).unwrap();
}

pub fn usdc_balance(ledger: &TestLedger, holder: &Address) -> u128 {
    ledger.token().balance_of(holder)
}

/// USDC the engine holds against its books, excluding unharvested yield
pub fn engine_custody(ledger: &TestLedger) -> u128 {
    usdc_balance(ledger, &ledger.address())
}
