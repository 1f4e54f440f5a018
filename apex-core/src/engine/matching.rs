use crate::prelude::{
    AssetId, Amount, BookLevel, EngineError, Event, Order, OrderId, OrderPage, OrderStore, PairBook,
    Price, Side, TradeExecuted, UserId, Vault,
};

/// Outcome of a single `match_order` call: the trade events produced, in
/// emission order, and the taker's unmatched remainder (spec §4.6.2).
pub struct MatchOutcome {
    pub events: Vec<Event>,
    pub remaining: Amount,
}

/// Records a new order in the store and, for limit orders, enqueues it into
/// the book (C6 §4.6.1). Market orders (`price == 0`) are never enqueued —
/// they proceed directly into `match_order`.
#[allow(clippy::too_many_arguments)]
pub fn place_order(
    store: &mut OrderStore,
    book: &mut PairBook,
    user: UserId,
    base: AssetId,
    quote: AssetId,
    side: Side,
    amount: Amount,
    price: Price,
    timestamp: u64,
    created_at: u64,
) -> Result<OrderId, EngineError> {
    if amount == 0 {
        return Err(EngineError::AmountBelowMinimum);
    }
    let order_id = store.create(user, base, quote, side, price, amount, timestamp, created_at);
    if price > 0 {
        book.enqueue(side, price, order_id);
    }
    Ok(order_id)
}

/// Runs the match loop for `order_id` against the opposite side of `book`,
/// crediting fills to `vault` and accumulating fee pools as it goes (spec
/// §4.6.2). Self-bounded by `max_iterations` individual-order-level
/// comparisons; hitting the bound is normal control flow, not an error —
/// the loop simply stops and the remainder is handled like any other
/// unfilled residual (spec §7, `IterationLimit`).
pub fn match_order(
    store: &mut OrderStore,
    book: &mut PairBook,
    vault: &mut Vault,
    maker_fee_bps: u32,
    taker_fee_bps: u32,
    max_iterations: u64,
    order_id: OrderId,
) -> Result<MatchOutcome, EngineError> {
    let (taker_user, base, quote, side, price, mut remaining) = {
        let taker = store.get(order_id).ok_or(EngineError::UnknownOrder)?;
        (
            taker.user,
            taker.base,
            taker.quote,
            taker.side,
            taker.price,
            taker.remaining_amount,
        )
    };

    let maker_side = side.opposite();
    let mut iterations: u64 = 0;
    let mut events = Vec::new();

    while remaining > 0 && iterations < max_iterations {
        let best = book.best(maker_side);
        if best == 0 {
            break;
        }
        let crosses = match side {
            Side::Buy => price == 0 || best <= price,
            Side::Sell => price == 0 || best >= price,
        };
        if !crosses {
            break;
        }

        let Some(resting_id) = book.front(maker_side, best) else {
            // The index says this price is live but the queue disagrees —
            // the book's own invariant rules this out, but guard rather
            // than spin.
            break;
        };
        iterations += 1;

        let resting_active = store.get(resting_id).is_some_and(|o| o.active);
        if !resting_active {
            book.pop_front(maker_side, best);
            continue;
        }

        let resting_remaining = store.get(resting_id).unwrap().remaining_amount;

        let fill = if side == Side::Buy && price == 0 {
            // Market buy: `remaining` is quote-denominated.
            let max_base = remaining / best;
            max_base.min(resting_remaining)
        } else {
            remaining.min(resting_remaining)
        };

        if fill == 0 {
            // A market order's remaining quote budget can't afford even one
            // unit of the base asset at this (the best available) price;
            // no better price exists further down the book, so there is
            // nothing left to do.
            break;
        }

        let maker_user = store.get(resting_id).unwrap().user;
        {
            let resting = store.get_mut(resting_id).unwrap();
            resting.remaining_amount = resting
                .remaining_amount
                .checked_sub(fill)
                .ok_or(EngineError::Overflow)?;
            if resting.remaining_amount == 0 {
                resting.active = false;
                book.pop_front(maker_side, best);
            }
        }

        match side {
            Side::Buy => {
                remaining = if price == 0 {
                    let cost = fill.checked_mul(best).ok_or(EngineError::Overflow)?;
                    remaining.checked_sub(cost).ok_or(EngineError::Overflow)?
                } else {
                    remaining.checked_sub(fill).ok_or(EngineError::Overflow)?
                };

                // Taker (incoming Buy) receives base; maker (resting Sell) receives quote.
                // `set_fee_rates` rejects bps > 10_000 (spec.md §9, closed against
                // SPEC_FULL.md §4.10's fee-rate bounds), so `fee <= fill` always
                // holds here; `checked_sub` still guards it rather than trust that
                // invariant silently.
                let taker_fee_base = fill
                    .checked_mul(taker_fee_bps as u128)
                    .ok_or(EngineError::Overflow)?
                    / 10_000;
                let taker_net_base = fill.checked_sub(taker_fee_base).ok_or(EngineError::Overflow)?;
                let maker_gross_quote = fill.checked_mul(best).ok_or(EngineError::Overflow)?;
                let maker_fee_quote = maker_gross_quote
                    .checked_mul(maker_fee_bps as u128)
                    .ok_or(EngineError::Overflow)?
                    / 10_000;
                let maker_net_quote = maker_gross_quote
                    .checked_sub(maker_fee_quote)
                    .ok_or(EngineError::Overflow)?;

                vault.credit(taker_user, base, taker_net_base)?;
                vault.credit(maker_user, quote, maker_net_quote)?;
                vault.accumulate_taker_fee(base, taker_fee_base)?;
                vault.accumulate_maker_fee(quote, maker_fee_quote)?;

                events.push(Event::TradeExecuted(TradeExecuted {
                    maker_id: resting_id,
                    taker_id: order_id,
                    base,
                    quote,
                    price: best,
                    amount: fill,
                    maker_fee: maker_fee_quote,
                    taker_fee: taker_fee_base,
                }));
            }
            Side::Sell => {
                remaining = remaining.checked_sub(fill).ok_or(EngineError::Overflow)?;

                // Taker (incoming Sell) receives quote; maker (resting Buy) receives base.
                let taker_gross_quote = fill.checked_mul(best).ok_or(EngineError::Overflow)?;
                let taker_fee_quote = taker_gross_quote
                    .checked_mul(taker_fee_bps as u128)
                    .ok_or(EngineError::Overflow)?
                    / 10_000;
                let taker_net_quote = taker_gross_quote
                    .checked_sub(taker_fee_quote)
                    .ok_or(EngineError::Overflow)?;
                let maker_fee_base = fill
                    .checked_mul(maker_fee_bps as u128)
                    .ok_or(EngineError::Overflow)?
                    / 10_000;
                let maker_net_base = fill.checked_sub(maker_fee_base).ok_or(EngineError::Overflow)?;

                vault.credit(taker_user, quote, taker_net_quote)?;
                vault.credit(maker_user, base, maker_net_base)?;
                vault.accumulate_taker_fee(quote, taker_fee_quote)?;
                vault.accumulate_maker_fee(base, maker_fee_base)?;

                events.push(Event::TradeExecuted(TradeExecuted {
                    maker_id: resting_id,
                    taker_id: order_id,
                    base,
                    quote,
                    price: best,
                    amount: fill,
                    maker_fee: maker_fee_base,
                    taker_fee: taker_fee_quote,
                }));
            }
        }
    }

    if remaining > 0 && iterations >= max_iterations {
        // Not an error (spec §7, `IterationLimit`): the loop simply stops and
        // the remainder is handled like any other unfilled residual.
        tracing::debug!(order_id, iterations, remaining, "match loop hit MAX_MATCH_ITERATIONS");
    }

    let taker = store.get_mut(order_id).unwrap();
    taker.remaining_amount = remaining;
    taker.active = remaining > 0 && price > 0;

    Ok(MatchOutcome { events, remaining })
}

/// Deactivates an order and drops it from its price level, if any (spec
/// §4.6.3). The price is removed from the ordered index only when the
/// level's FIFO is empty after dropping this order — fixing the source's
/// unconditional-removal defect (spec §4.2, §8 scenario 3).
pub fn cancel_order(store: &mut OrderStore, book: &mut PairBook, order_id: OrderId) -> Result<(), EngineError> {
    let (side, price, active) = {
        let order = store.get(order_id).ok_or(EngineError::UnknownOrder)?;
        (order.side, order.price, order.active)
    };
    if !active {
        return Err(EngineError::NotActive);
    }
    if price > 0 {
        book.remove_order(side, price, order_id);
    }
    store.get_mut(order_id).unwrap().active = false;
    Ok(())
}

/// The head order's summary at the best price on `side`; `None` if the side
/// is empty (spec §4.6.4).
pub fn best_level(store: &OrderStore, book: &PairBook, side: Side) -> Option<BookLevel> {
    let price = book.best(side);
    if price == 0 {
        return None;
    }
    let order_id = book.front(side, price)?;
    let order = store.get(order_id)?;
    Some(BookLevel {
        price,
        order_id,
        remaining_amount: order.remaining_amount,
    })
}

/// Descends the ordered index from `start_price` (or the best price if `0`),
/// yielding active orders in price-then-FIFO order, paginated by whole
/// price levels (spec §4.6.4).
pub fn get_orders_paginated(
    store: &OrderStore,
    book: &PairBook,
    side: Side,
    start_price: Price,
    limit: usize,
) -> OrderPage {
    let prices = book.walk_prices(side, start_price);
    // Independent of `start_price`: spec §4.6.4 defines `total_count` as the
    // total number of active orders on the whole side, not the remainder of
    // this page's walk, so it must stay stable across pages of one query.
    let total_count: u64 = book
        .walk_prices(side, 0)
        .iter()
        .map(|&p| book.level_len(side, p) as u64)
        .sum();

    let mut orders = Vec::new();
    let mut next_start_price = 0;
    for (i, &price) in prices.iter().enumerate() {
        let ids = book.level_orders(side, price);
        if !orders.is_empty() && orders.len() + ids.len() > limit {
            next_start_price = price;
            break;
        }
        for id in ids {
            if let Some(order) = store.get(id) {
                orders.push(order.clone());
            }
        }
        if orders.len() >= limit {
            next_start_price = prices.get(i + 1).copied().unwrap_or(0);
            break;
        }
    }

    OrderPage {
        orders,
        next_start_price,
        total_count,
    }
}

/// Fetches a single historical or active order by id (spec §4.6.4).
pub fn get_order(store: &OrderStore, order_id: OrderId) -> Option<Order> {
    store.get(order_id).cloned()
}
