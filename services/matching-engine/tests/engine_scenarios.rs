//! End-to-end engine scenarios
//!
//! Exercises the full place/cancel/amend/market surface of one pair with
//! an in-memory ledger, both assets at 18 decimals (D = 10^18).

use matching_engine::ledger::InMemoryLedger;
use matching_engine::MatchingEngine;
use std::sync::Arc;
use types::asset::Asset;
use types::errors::EngineError;
use types::ids::{AccountId, AssetId, OrderId};
use types::order::Side;
use types::units::{Price, Quantity};

const D: u128 = 1_000_000_000_000_000_000; // 10^18

struct Harness {
    engine: MatchingEngine<Arc<InMemoryLedger>>,
    ledger: Arc<InMemoryLedger>,
    base: AssetId,
    quote: AssetId,
}

impl Harness {
    fn new() -> Self {
        let base = Asset::new(AssetId::new([0xaa; 20]), 18);
        let quote = Asset::new(AssetId::new([0xbb; 20]), 18);
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.register_asset(base.id, base.decimals);
        ledger.register_asset(quote.id, quote.decimals);
        Self {
            engine: MatchingEngine::new(base, quote, Arc::clone(&ledger)),
            ledger,
            base: base.id,
            quote: quote.id,
        }
    }

    fn trader(&self) -> AccountId {
        let account = AccountId::new();
        self.ledger.deposit(account, self.base, 1_000_000 * D).unwrap();
        self.ledger.deposit(account, self.quote, 1_000_000 * D).unwrap();
        account
    }

    fn buy(&mut self, trader: AccountId, price: u128, amount: u128) -> OrderId {
        self.engine
            .place(
                trader,
                Side::BUY,
                &[Price::new(price)],
                &[Quantity::new(amount)],
                1,
            )
            .unwrap()[0]
    }

    fn sell(&mut self, trader: AccountId, price: u128, amount: u128) -> OrderId {
        self.engine
            .place(
                trader,
                Side::SELL,
                &[Price::new(price)],
                &[Quantity::new(amount)],
                1,
            )
            .unwrap()[0]
    }
}

// ───────────────────────── End-to-end scenarios ─────────────────────────

#[test]
fn s1_full_match_at_one_price() {
    let mut h = Harness::new();
    let alice = h.trader();
    let bob = h.trader();
    let alice_quote = h.ledger.balance_of(alice, h.quote);
    let bob_base = h.ledger.balance_of(bob, h.base);

    let alice_order = h.buy(alice, D, 10 * D);
    assert_eq!(h.ledger.balance_of(alice, h.quote), alice_quote - 10 * D);

    let bob_order = h.sell(bob, D, 10 * D);

    let alice_state = h.engine.order(alice_order).unwrap();
    let bob_state = h.engine.order(bob_order).unwrap();
    assert!(!alice_state.active);
    assert!(!bob_state.active);
    assert_eq!(alice_state.filled, Quantity::new(10 * D));
    assert_eq!(bob_state.filled, Quantity::new(10 * D));

    // Alice received 10 base, Bob received 10 quote.
    assert_eq!(
        h.ledger.balance_of(alice, h.base),
        1_000_000 * D + 10 * D
    );
    assert_eq!(h.ledger.balance_of(bob, h.quote), 1_000_000 * D + 10 * D);
    assert_eq!(h.ledger.balance_of(bob, h.base), bob_base - 10 * D);
    assert_eq!(h.engine.last_trade_price(), Price::new(D));
    assert!(h.engine.book().verify_integrity());
}

#[test]
fn s2_partial_match_buyer_remains() {
    let mut h = Harness::new();
    let alice = h.trader();
    let bob = h.trader();

    let alice_order = h.buy(alice, D, 10 * D);
    let bob_order = h.sell(bob, D, 5 * D);

    let bob_state = h.engine.order(bob_order).unwrap();
    assert!(!bob_state.active);
    assert_eq!(bob_state.filled, Quantity::new(5 * D));

    let alice_state = h.engine.order(alice_order).unwrap();
    assert!(alice_state.active);
    assert_eq!(alice_state.filled, Quantity::new(5 * D));
    assert_eq!(alice_state.remaining(), Quantity::new(5 * D));

    assert_eq!(
        h.engine.liquidity(Side::BUY, Price::new(D)),
        Quantity::new(5 * D)
    );
    assert!(h.engine.book().verify_integrity());
}

#[test]
fn s3_no_cross_across_mismatched_prices() {
    let mut h = Harness::new();
    let alice = h.trader();
    let maker = h.trader();

    h.sell(maker, 2 * D, D);
    let alice_order = h.buy(alice, D, D);

    // Alice rests at 1, the ask at 2 is untouched, no trade happened.
    assert!(h.engine.order(alice_order).unwrap().active);
    assert_eq!(h.engine.liquidity(Side::BUY, Price::new(D)), Quantity::new(D));
    assert_eq!(
        h.engine.liquidity(Side::SELL, Price::new(2 * D)),
        Quantity::new(D)
    );
    assert!(h.engine.last_trade_price().is_zero());
}

#[test]
fn s4_market_buy_sweeps_two_levels() {
    let mut h = Harness::new();
    let maker = h.trader();
    let bob = h.trader();

    let first = h.sell(maker, 100 * D, 5 * D);
    let second = h.sell(maker, 105 * D, 3 * D);

    let budget = (5 * 100 + 3 * 105) * D; // 815 whole quote units
    let bob_base_before = h.ledger.balance_of(bob, h.base);
    let bob_quote_before = h.ledger.balance_of(bob, h.quote);

    let received = h
        .engine
        .execute_market(
            bob,
            Side::BUY,
            budget,
            &[Price::new(100 * D), Price::new(105 * D)],
            8 * D,
            0,
            10,
        )
        .unwrap();

    assert_eq!(received, 8 * D);
    assert!(!h.engine.order(first).unwrap().active);
    assert!(!h.engine.order(second).unwrap().active);
    assert_eq!(h.ledger.balance_of(bob, h.base), bob_base_before + 8 * D);
    // Budget fully consumed.
    assert_eq!(h.ledger.balance_of(bob, h.quote), bob_quote_before - budget);
    // Both price levels removed.
    assert_eq!(h.engine.best_ask(), None);
    assert!(h.engine.book().verify_integrity());
}

#[test]
fn s5_market_buy_slippage_guard_trips() {
    let mut h = Harness::new();
    let maker = h.trader();
    let bob = h.trader();

    h.sell(maker, 100 * D, 5 * D);
    h.sell(maker, 105 * D, 3 * D);

    let bob_quote_before = h.ledger.balance_of(bob, h.quote);
    let custody_quote_before = h.ledger.custody_of(h.quote);
    let custody_base_before = h.ledger.custody_of(h.base);

    let budget = (5 * 100 + 3 * 105) * D;
    let err = h
        .engine
        .execute_market(
            bob,
            Side::BUY,
            budget,
            &[Price::new(100 * D), Price::new(105 * D)],
            9 * D,
            0,
            10,
        )
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientBaseReceived {
            received: 8 * D,
            min_received: 9 * D,
        }
    );

    // Book and balances identical to the pre-call state.
    assert_eq!(h.ledger.balance_of(bob, h.quote), bob_quote_before);
    assert_eq!(h.ledger.custody_of(h.quote), custody_quote_before);
    assert_eq!(h.ledger.custody_of(h.base), custody_base_before);
    assert_eq!(
        h.engine.liquidity(Side::SELL, Price::new(100 * D)),
        Quantity::new(5 * D)
    );
    assert_eq!(
        h.engine.liquidity(Side::SELL, Price::new(105 * D)),
        Quantity::new(3 * D)
    );
    assert!(h.engine.book().verify_integrity());
}

#[test]
fn s6_cancel_refunds_exactly() {
    let mut h = Harness::new();
    let alice = h.trader();
    let quote_before = h.ledger.balance_of(alice, h.quote);

    let id = h.buy(alice, 3 * D, 10 * D);
    assert_eq!(h.ledger.balance_of(alice, h.quote), quote_before - 30 * D);

    h.engine.cancel(alice, id).unwrap();

    assert_eq!(h.ledger.balance_of(alice, h.quote), quote_before);
    assert_eq!(h.engine.best_bid(), None);
    assert!(!h.engine.order(id).unwrap().active);
    assert!(h.engine.book().verify_integrity());
}

// ───────────────────────── Boundary behaviors ─────────────────────────

#[test]
fn dust_insert_fails_before_any_escrow_moves() {
    let mut h = Harness::new();
    let alice = h.trader();
    let quote_before = h.ledger.balance_of(alice, h.quote);

    // amount * price < D truncates the quote value to zero
    let err = h
        .engine
        .place(
            alice,
            Side::BUY,
            &[Price::new(1_000)],
            &[Quantity::new(1_000)],
            1,
        )
        .unwrap_err();
    assert_eq!(err, EngineError::QuoteAmountTooSmall);
    assert_eq!(h.ledger.balance_of(alice, h.quote), quote_before);
    assert_eq!(h.engine.order_count(), 0);
}

#[test]
fn batch_of_100_succeeds_and_101_fails() {
    let mut h = Harness::new();
    let alice = h.trader();

    let prices: Vec<Price> = (1..=100).map(|i| Price::new(i * D)).collect();
    let amounts = vec![Quantity::new(D); 100];
    let ids = h
        .engine
        .place(alice, Side::SELL, &prices, &amounts, 1)
        .unwrap();
    assert_eq!(ids.len(), 100);
    assert_eq!(ids[0], OrderId::new(1));
    assert_eq!(ids[99], OrderId::new(100));

    let prices = vec![Price::new(D); 101];
    let amounts = vec![Quantity::new(D); 101];
    let err = h
        .engine
        .place(alice, Side::SELL, &prices, &amounts, 1)
        .unwrap_err();
    assert_eq!(err, EngineError::BatchSizeTooLarge { len: 101, max: 100 });
}

#[test]
fn cancel_by_non_trader_is_unauthorized() {
    let mut h = Harness::new();
    let alice = h.trader();
    let mallory = h.trader();

    let id = h.buy(alice, D, D);
    assert_eq!(
        h.engine.cancel(mallory, id),
        Err(EngineError::Unauthorized { order_id: id })
    );
    assert!(h.engine.order(id).unwrap().active);
}

#[test]
fn amend_rejects_zero_and_filled_amounts() {
    let mut h = Harness::new();
    let alice = h.trader();
    let bob = h.trader();

    let id = h.buy(alice, D, 10 * D);
    h.sell(bob, D, 4 * D);

    assert_eq!(
        h.engine.amend(alice, id, Quantity::ZERO),
        Err(EngineError::InvalidAmount)
    );
    assert_eq!(
        h.engine.amend(alice, id, Quantity::new(4 * D)),
        Err(EngineError::AmountLessThanFilled {
            new_amount: Quantity::new(4 * D),
            filled: Quantity::new(4 * D),
        })
    );
    assert_eq!(
        h.engine.amend(alice, id, Quantity::new(3 * D)),
        Err(EngineError::AmountLessThanFilled {
            new_amount: Quantity::new(3 * D),
            filled: Quantity::new(4 * D),
        })
    );
}

#[test]
fn market_order_with_empty_hints_fails() {
    let mut h = Harness::new();
    let bob = h.trader();
    assert_eq!(
        h.engine.execute_market(bob, Side::BUY, D, &[], 0, 0, 10),
        Err(EngineError::NoPricesProvided)
    );
}

#[test]
fn market_sell_sweeps_bids_and_guards_slippage() {
    let mut h = Harness::new();
    let maker = h.trader();
    let seller = h.trader();

    h.buy(maker, 3 * D, 2 * D);
    h.buy(maker, 2 * D, 4 * D);

    // 2 base at 3 plus 4 base at 2 = 14 quote
    let err = h
        .engine
        .execute_market(
            seller,
            Side::SELL,
            6 * D,
            &[Price::new(3 * D), Price::new(2 * D)],
            15 * D,
            0,
            10,
        )
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientQuoteReceived {
            received: 14 * D,
            min_received: 15 * D,
        }
    );

    let received = h
        .engine
        .execute_market(
            seller,
            Side::SELL,
            6 * D,
            &[Price::new(3 * D), Price::new(2 * D)],
            14 * D,
            0,
            10,
        )
        .unwrap();
    assert_eq!(received, 14 * D);
    assert_eq!(h.engine.best_bid(), None);
    assert_eq!(
        h.ledger.balance_of(seller, h.quote),
        1_000_000 * D + 14 * D
    );
    assert!(h.engine.book().verify_integrity());
}

#[test]
fn market_order_expiration_checked_at_entry() {
    let mut h = Harness::new();
    let maker = h.trader();
    let bob = h.trader();
    h.sell(maker, D, D);

    assert_eq!(
        h.engine
            .execute_market(bob, Side::BUY, D, &[Price::new(D)], 0, 100, 100),
        Err(EngineError::OrderExpired { expiration: 100 })
    );

    // expiration == 0 disables the deadline
    let received = h
        .engine
        .execute_market(bob, Side::BUY, D, &[Price::new(D)], 0, 0, i64::MAX)
        .unwrap();
    assert_eq!(received, D);
}

#[test]
fn interior_cancel_preserves_fifo_of_survivors() {
    let mut h = Harness::new();
    let alice = h.trader();
    let bob = h.trader();
    let carol = h.trader();
    let dave = h.trader();

    let first = h.buy(alice, D, 2 * D);
    let second = h.buy(bob, D, 3 * D);
    let third = h.buy(carol, D, 4 * D);

    // Remove the middle order; head and tail keep their priority.
    h.engine.cancel(bob, second).unwrap();
    assert_eq!(h.engine.liquidity(Side::BUY, Price::new(D)), Quantity::new(6 * D));

    h.sell(dave, D, 5 * D);
    assert!(!h.engine.order(first).unwrap().active);
    assert_eq!(
        h.engine.order(third).unwrap().filled,
        Quantity::new(3 * D)
    );
    assert!(h.engine.book().verify_integrity());
}

#[test]
fn amend_preserves_time_priority() {
    let mut h = Harness::new();
    let alice = h.trader();
    let bob = h.trader();
    let taker = h.trader();

    let first = h.buy(alice, D, 2 * D);
    let second = h.buy(bob, D, 2 * D);

    // Growing the first order must not push it behind the second.
    h.engine.amend(alice, first, Quantity::new(5 * D)).unwrap();

    h.sell(taker, D, 5 * D);
    assert!(!h.engine.order(first).unwrap().active);
    assert!(h.engine.order(second).unwrap().filled.is_zero());
}

#[test]
fn escrow_matches_open_interest() {
    let mut h = Harness::new();
    let alice = h.trader();
    let bob = h.trader();

    h.buy(alice, 2 * D, 10 * D); // 20 quote escrowed
    h.buy(alice, 3 * D, 4 * D); // 12 quote escrowed
    h.sell(bob, 5 * D, 7 * D); // 7 base escrowed

    assert_eq!(h.ledger.custody_of(h.quote), 32 * D);
    assert_eq!(h.ledger.custody_of(h.base), 7 * D);

    // A fill releases escrow to the counterparties.
    h.sell(bob, 3 * D, 4 * D);
    assert_eq!(h.ledger.custody_of(h.quote), 20 * D);
    assert_eq!(h.ledger.custody_of(h.base), 7 * D);
    assert!(h.engine.book().verify_integrity());
}

#[test]
fn orders_of_tracks_every_order_ever_created() {
    let mut h = Harness::new();
    let alice = h.trader();
    let bob = h.trader();

    let first = h.buy(alice, D, D);
    let second = h.sell(bob, D, D); // fills both
    let third = h.buy(alice, 2 * D, D);

    assert_eq!(h.engine.orders_of(alice), &[first, third]);
    assert_eq!(h.engine.orders_of(bob), &[second]);
    assert_eq!(h.engine.orders_of(AccountId::new()), &[] as &[OrderId]);
}
