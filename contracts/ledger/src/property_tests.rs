//! Property tests over random operation sequences.

use proptest::prelude::*;

use crate::test_utils::*;

#[derive(Debug, Clone)]
enum Op {
    Buy(u128),
    Sell(u128),
    Donate(u128),
    Borrow { amount: u128, days: u32 },
    BorrowMore(u128),
    Leverage { amount: u128, days: u32 },
    Repay(u128),
    Liquidate,
    Wait(u32),
    VenueLoss(u128),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u128..2_000).prop_map(|usdc| Op::Buy(usdc * ONE_USDC)),
        (1u128..2_000).prop_map(|tokens| Op::Sell(tokens * ONE_TOKEN)),
        (1u128..100).prop_map(|usdc| Op::Donate(usdc * ONE_USDC)),
        (1u128..300, 1u32..365).prop_map(|(usdc, days)| Op::Borrow { amount: usdc * ONE_USDC, days }),
        (1u128..100).prop_map(|usdc| Op::BorrowMore(usdc * ONE_USDC)),
        (1u128..500, 1u32..365).prop_map(|(usdc, days)| Op::Leverage { amount: usdc * ONE_USDC, days }),
        (1u128..300).prop_map(|usdc| Op::Repay(usdc * ONE_USDC)),
        Just(Op::Liquidate),
        (1u32..120).prop_map(Op::Wait),
        (1u128..50).prop_map(|usdc| Op::VenueLoss(usdc * ONE_USDC)),
    ]
}

/// Started with 1,000 USDC behind a 50 USDC buffer, so most of the
/// reserve sits in the venue; alice holds 500 CHICKS
fn sweeping_holder() -> TestLedger {
    let mut ledger = new_ledger();
    enable_venue(&mut ledger, 50 * ONE_USDC);
    fund(&mut ledger, &admin(), 1_000 * ONE_USDC);
    ledger.set_start(&ctx(admin()), 1_000 * ONE_USDC).unwrap();
    ledger.transfer(&ctx(admin()), alice(), 500 * ONE_TOKEN).unwrap();
    ledger.take_events();
    ledger
}

/// Apply one operation at `now`, ignoring its outcome. Returns the clock
/// for the next operation.
fn apply(ledger: &mut TestLedger, op: Op, now: u64) -> u64 {
    let caller = ctx_at(alice(), now);
    let _ = match op {
        Op::Buy(amount) => ledger.buy(&caller, alice(), amount).map(|_| ()),
        Op::Sell(tokens) => {
            let tokens = tokens.min(ledger.free_balance(&alice()));
            ledger.sell(&caller, tokens).map(|_| ())
        }
        Op::Donate(amount) => ledger.donate(&caller, amount),
        Op::Borrow { amount, days } => ledger.borrow(&caller, amount, days).map(|_| ()),
        Op::BorrowMore(extra) => ledger.borrow_more(&caller, extra).map(|_| ()),
        Op::Leverage { amount, days } => ledger.leverage(&caller, amount, days).map(|_| ()),
        Op::Repay(amount) => {
            let amount = amount.min(ledger.loans(&alice()).borrowed);
            ledger.repay(&caller, amount).map(|_| ())
        }
        Op::Liquidate => ledger.liquidate(&ctx_at(carol(), now), alice()).map(|_| ()),
        Op::Wait(days) => return now + u64::from(days) * DAY,
        Op::VenueLoss(amount) => {
            ledger.venue_mut().realize_loss(amount);
            Ok(())
        }
    };
    now
}

/// Supply matches balances, the backing covers supply at the last price,
/// the price never drops and the engine holds the reserve its books claim
fn check_invariants(ledger: &TestLedger, price_before: u128) -> Result<(), TestCaseError> {
    prop_assert!(ledger.current_price() >= price_before);
    prop_assert_eq!(ledger.state().sum_of_balances().unwrap(), ledger.total_supply());
    prop_assert!(ledger.state().validate().is_ok());
    prop_assert!(ledger.backing().unwrap() >= ledger.backing_required().unwrap());
    if ledger.total_borrowed() == 0 {
        let held = ledger.reserve_balance() + ledger.swept_balance();
        prop_assert!(held >= ledger.backing_required().unwrap());
    }
    prop_assert_eq!(
        engine_custody(ledger),
        ledger.reserve_balance() + ledger.swept_balance()
    );
    prop_assert!(ledger.get_aave_supplied_amount() <= ledger.swept_balance());
    prop_assert!(ledger.balance_of(&alice()) >= ledger.loans(&alice()).collateral);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    /// Whatever succeeds or fails, the books stay consistent
    #[test]
    fn random_operations_preserve_invariants(ops in prop::collection::vec(op(), 1..24)) {
        let mut ledger = ledger_with_holder();
        fund(&mut ledger, &alice(), 1_000_000 * ONE_USDC);

        let mut now = T0;
        for op in ops {
            let price_before = ledger.current_price();
            now = apply(&mut ledger, op, now);
            check_invariants(&ledger, price_before)?;
        }
    }

    /// Same sequences with most of the reserve swept into a venue that
    /// may lose principal
    #[test]
    fn random_operations_with_sweeping_preserve_invariants(ops in prop::collection::vec(op(), 1..24)) {
        let mut ledger = sweeping_holder();
        fund(&mut ledger, &alice(), 1_000_000 * ONE_USDC);
        prop_assert!(ledger.swept_balance() > 0);

        let mut now = T0;
        for op in ops {
            let price_before = ledger.current_price();
            now = apply(&mut ledger, op, now);
            check_invariants(&ledger, price_before)?;
        }
    }

    /// Buying and immediately selling never returns more than was paid
    #[test]
    fn buy_then_sell_loses_fees(usdc in 1u128..50_000) {
        let mut ledger = started_ledger();
        let amount = usdc * ONE_USDC;
        fund(&mut ledger, &bob(), amount);

        let minted = ledger.buy(&ctx(bob()), bob(), amount).unwrap();
        let paid = ledger.sell(&ctx(bob()), minted).unwrap();

        prop_assert!(paid < amount);
        prop_assert!(ledger.current_price() >= ONE_USDC);
    }

    /// A fully repaid loan releases exactly the collateral it locked
    #[test]
    fn borrow_and_repay_round_trip(usdc in 5u128..400, days in 1u32..=365) {
        let mut ledger = ledger_with_holder();
        fund(&mut ledger, &alice(), 1_000 * ONE_USDC);
        let amount = usdc * ONE_USDC;

        ledger.borrow(&ctx(alice()), amount, days).unwrap();
        let locked = ledger.loans(&alice()).collateral;
        let released = ledger.close_position(&ctx(alice())).unwrap();

        prop_assert_eq!(released, locked);
        prop_assert_eq!(ledger.total_borrowed(), 0);
        prop_assert_eq!(ledger.free_balance(&alice()), 500 * ONE_TOKEN);
    }
}
