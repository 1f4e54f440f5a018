mod common;

use crate::common::*;
use apex_core::prelude::*;

/// Scenario 1: a single full match at the resting price, with maker/taker
/// fees floored to the nearest unit (maker 10 bps, taker 15 bps).
#[test]
fn single_full_match_applies_floored_maker_and_taker_fees() {
    let exchange = new_exchange();
    exchange.set_fee_rates(ADMIN, 10, 15).unwrap();
    register_pair(&exchange);

    exchange.deposit(1, asset(BASE), 100).unwrap();
    exchange.deposit(2, asset(QUOTE), 20_000).unwrap();

    let sell = exchange
        .execute_trade(limit_request(1, Side::Sell, 100, 200, 1), true)
        .unwrap();
    let buy = exchange
        .execute_trade(limit_request(2, Side::Buy, 100, 200, 2), true)
        .unwrap();

    assert_eq!(sell.remaining_amount, 0);
    assert_eq!(buy.remaining_amount, 0);

    // Seller (maker): 100 * 200 = 20000 quote gross, minus floor(20000*10/10000)=20 fee.
    assert_eq!(exchange.get_balance(1, asset(QUOTE)), 19_980);
    // Buyer (taker): 100 base gross, minus floor(100*15/10000)=0 fee.
    assert_eq!(exchange.get_balance(2, asset(BASE)), 100);

    let pair_id = exchange.get_pair_id(asset(BASE), asset(QUOTE)).unwrap();
    assert_eq!(exchange.get_best_sell_price(pair_id), 0);
    assert_eq!(exchange.get_best_buy_price(pair_id), 0);
}

/// Scenario 2: a resting order survives a partial fill and is fully removed,
/// index included, only once its FIFO drains to empty.
#[test]
fn partial_fill_keeps_resting_order_active_until_fully_consumed() {
    let exchange = new_exchange();
    register_pair(&exchange);
    let pair_id = exchange.get_pair_id(asset(BASE), asset(QUOTE)).unwrap();

    exchange.deposit(1, asset(BASE), 200).unwrap();
    exchange.deposit(2, asset(QUOTE), 40_000).unwrap();

    let sell = exchange
        .execute_trade(limit_request(1, Side::Sell, 200, 200, 1), true)
        .unwrap();
    assert_eq!(sell.remaining_amount, 200);

    exchange
        .execute_trade(limit_request(2, Side::Buy, 100, 200, 2), true)
        .unwrap();

    let resting = exchange.get_order(sell.order_id).unwrap();
    assert!(resting.active);
    assert_eq!(resting.remaining_amount, 100);
    assert_eq!(exchange.get_best_sell_price(pair_id), 200);

    exchange
        .execute_trade(limit_request(2, Side::Buy, 100, 200, 3), true)
        .unwrap();

    let resting = exchange.get_order(sell.order_id).unwrap();
    assert!(!resting.active);
    assert_eq!(resting.remaining_amount, 0);
    assert_eq!(exchange.get_best_sell_price(pair_id), 0);
}

/// Scenario 6: execution always happens at the resting (maker) order's
/// price, never the incoming (taker) order's limit price.
#[test]
fn crossing_limit_orders_execute_at_the_maker_price() {
    let exchange = new_exchange();
    register_pair(&exchange);
    let pair_id = exchange.get_pair_id(asset(BASE), asset(QUOTE)).unwrap();

    // Buyer rests first: no counterparty yet, so it sits in the book at 250.
    exchange.deposit(2, asset(QUOTE), 25_000).unwrap();
    let buy = exchange
        .execute_trade(limit_request(2, Side::Buy, 100, 250, 1), true)
        .unwrap();
    assert_eq!(buy.remaining_amount, 100);
    assert_eq!(exchange.get_best_buy_price(pair_id), 250);

    // Seller crosses at 200: the spread crosses (250 >= 200), so it matches
    // at the maker's resting price of 250, not the taker's limit of 200.
    exchange.deposit(1, asset(BASE), 100).unwrap();
    let sell = exchange
        .execute_trade(limit_request(1, Side::Sell, 100, 200, 2), true)
        .unwrap();

    assert_eq!(sell.remaining_amount, 0);
    assert_eq!(exchange.get_balance(1, asset(QUOTE)), 25_000);
    assert_eq!(exchange.get_balance(2, asset(BASE)), 100);
    assert_eq!(exchange.get_best_buy_price(pair_id), 0);
    assert_eq!(exchange.get_best_sell_price(pair_id), 0);
}

#[test]
fn non_crossing_limit_orders_both_rest() {
    let exchange = new_exchange();
    register_pair(&exchange);
    let pair_id = exchange.get_pair_id(asset(BASE), asset(QUOTE)).unwrap();

    exchange.deposit(1, asset(BASE), 100).unwrap();
    exchange.deposit(2, asset(QUOTE), 10_000).unwrap();

    exchange
        .execute_trade(limit_request(1, Side::Sell, 100, 300, 1), true)
        .unwrap();
    exchange
        .execute_trade(limit_request(2, Side::Buy, 100, 100, 2), true)
        .unwrap();

    assert_eq!(exchange.get_best_sell_price(pair_id), 300);
    assert_eq!(exchange.get_best_buy_price(pair_id), 100);
}

#[test]
fn price_time_priority_fills_the_earlier_order_first() {
    let exchange = new_exchange();
    register_pair(&exchange);

    exchange.deposit(1, asset(BASE), 50).unwrap();
    exchange.deposit(3, asset(BASE), 50).unwrap();
    exchange.deposit(2, asset(QUOTE), 10_000).unwrap();

    let first = exchange
        .execute_trade(limit_request(1, Side::Sell, 50, 200, 1), true)
        .unwrap();
    let second = exchange
        .execute_trade(limit_request(3, Side::Sell, 50, 200, 2), true)
        .unwrap();

    exchange
        .execute_trade(limit_request(2, Side::Buy, 50, 200, 3), true)
        .unwrap();

    assert_eq!(exchange.get_order(first.order_id).unwrap().remaining_amount, 0);
    assert_eq!(exchange.get_order(second.order_id).unwrap().remaining_amount, 50);
}

#[test]
fn insufficient_balance_is_rejected_and_leaves_no_lock() {
    let exchange = new_exchange();
    register_pair(&exchange);
    exchange.deposit(1, asset(BASE), 10).unwrap();

    let result = exchange.execute_trade(limit_request(1, Side::Sell, 100, 200, 1), true);
    assert_eq!(
        result,
        Err(EngineError::InsufficientBalance {
            available: 10,
            requested: 100
        })
    );
    assert_eq!(exchange.get_balance(1, asset(BASE)), 10);
}

#[test]
fn trading_an_unregistered_pair_is_rejected() {
    let exchange = new_exchange();
    let result = exchange.execute_trade(limit_request(1, Side::Buy, 100, 200, 1), true);
    assert_eq!(result, Err(EngineError::InvalidPair));
}

#[test]
fn buy_limit_notional_below_minimum_is_rejected() {
    let exchange = new_exchange();
    register_pair(&exchange);
    exchange.deposit(1, asset(QUOTE), 1).unwrap();

    // amount=1, price=1 => notional 1, far below min_amount(1) * 100.
    let result = exchange.execute_trade(limit_request(1, Side::Buy, 1, 1, 1), true);
    assert_eq!(result, Err(EngineError::AmountBelowMinimum));
}
