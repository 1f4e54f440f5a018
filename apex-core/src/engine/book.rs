use crate::prelude::{Amount, OrderId, Price, Side};
use crossbeam_skiplist::SkipMap;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::ops::Bound;

/// Self-balancing ordered set of price keys for one `(pair, side)` (C1).
///
/// Backed by `crossbeam-skiplist`'s lock-free skip list rather than a
/// hand-rolled red-black tree: it gives `insert`/`remove`/`contains` and,
/// via `lower_bound`/`upper_bound`, `predecessor`/`successor` in expected
/// logarithmic time, and stays internally consistent across every public
/// call without the engine having to reason about rebalancing (spec §9's
/// own design note endorses this substitution). Key `0` is never a valid
/// price, so it doubles as the "absent" sentinel for `min`/`max`/
/// `predecessor`/`successor`.
#[derive(Debug, Default)]
pub struct OrderedPriceIndex {
    prices: SkipMap<Price, ()>,
}

impl OrderedPriceIndex {
    pub fn new() -> Self {
        Self {
            prices: SkipMap::new(),
        }
    }

    /// Idempotent: a no-op if `price` is already present.
    pub fn insert(&self, price: Price) {
        if price == 0 {
            return;
        }
        let _ = self.prices.insert(price, ());
    }

    /// No-op if `price` is absent.
    pub fn remove(&self, price: Price) {
        self.prices.remove(&price);
    }

    pub fn contains(&self, price: Price) -> bool {
        self.prices.contains_key(&price)
    }

    pub fn min(&self) -> Price {
        self.prices.front().map(|e| *e.key()).unwrap_or(0)
    }

    pub fn max(&self) -> Price {
        self.prices.back().map(|e| *e.key()).unwrap_or(0)
    }

    /// Largest key strictly less than `price`; `0` if none. `price` need not
    /// itself be present.
    pub fn predecessor(&self, price: Price) -> Price {
        self.prices
            .upper_bound(Bound::Excluded(&price))
            .map(|e| *e.key())
            .unwrap_or(0)
    }

    /// Smallest key strictly greater than `price`; `0` if none.
    pub fn successor(&self, price: Price) -> Price {
        self.prices
            .lower_bound(Bound::Excluded(&price))
            .map(|e| *e.key())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Iterates prices from best to worst for `side` (descending for buys,
    /// ascending for sells), starting at `start` (or the best price if
    /// `start == 0`).
    pub fn walk_from(&self, side: Side, start: Price) -> Vec<Price> {
        let mut out = Vec::new();
        let mut cursor = if start == 0 {
            match side {
                Side::Buy => self.max(),
                Side::Sell => self.min(),
            }
        } else if self.contains(start) {
            start
        } else {
            match side {
                Side::Buy => self.predecessor(start),
                Side::Sell => self.successor(start),
            }
        };
        while cursor != 0 {
            out.push(cursor);
            cursor = match side {
                Side::Buy => self.predecessor(cursor),
                Side::Sell => self.successor(cursor),
            };
        }
        out
    }
}

/// Per-pair paired price indices plus FIFO queues of order-ids at each price
/// level (C2).
///
/// **Invariant**, fixed relative to the source (spec §4.2): whenever a price
/// level's FIFO queue becomes empty — full fill, cancellation of the last
/// active order at that level, or lazy cleanup during traversal — the price
/// is removed from the ordered index in the same call that empties it. No
/// method below returns with an empty queue still present in its map.
#[derive(Debug, Default)]
pub struct PairBook {
    pub buy_index: OrderedPriceIndex,
    pub sell_index: OrderedPriceIndex,
    buy_queues: HashMap<Price, VecDeque<OrderId>>,
    sell_queues: HashMap<Price, VecDeque<OrderId>>,
}

impl PairBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self, side: Side) -> &OrderedPriceIndex {
        match side {
            Side::Buy => &self.buy_index,
            Side::Sell => &self.sell_index,
        }
    }

    fn queues(&mut self, side: Side) -> &mut HashMap<Price, VecDeque<OrderId>> {
        match side {
            Side::Buy => &mut self.buy_queues,
            Side::Sell => &mut self.sell_queues,
        }
    }

    pub fn best(&self, side: Side) -> Price {
        match side {
            Side::Buy => self.buy_index.max(),
            Side::Sell => self.sell_index.min(),
        }
    }

    /// Prices from best to worst on `side`, starting at `start` (spec
    /// §4.6.4's `get_orders_paginated`).
    pub fn walk_prices(&self, side: Side, start: Price) -> Vec<Price> {
        self.index(side).walk_from(side, start)
    }

    /// Appends to the tail of the level's FIFO; inserts the price into the
    /// side's index if the level was previously empty.
    pub fn enqueue(&mut self, side: Side, price: Price, order_id: OrderId) {
        self.index(side).insert(price);
        self.queues(side).entry(price).or_default().push_back(order_id);
    }

    /// Peeks the front order-id of a level without removing it.
    pub fn front(&self, side: Side, price: Price) -> Option<OrderId> {
        let queue = match side {
            Side::Buy => self.buy_queues.get(&price),
            Side::Sell => self.sell_queues.get(&price),
        };
        queue.and_then(|q| q.front().copied())
    }

    /// Removes the head order-id. If the queue becomes empty, the price is
    /// dropped from both the map and the ordered index in this same call.
    pub fn pop_front(&mut self, side: Side, price: Price) -> Option<OrderId> {
        let popped = {
            let queues = self.queues(side);
            let removed = match queues.get_mut(&price) {
                Some(queue) => queue.pop_front(),
                None => None,
            };
            if queues.get(&price).is_some_and(VecDeque::is_empty) {
                queues.remove(&price);
            }
            removed
        };
        if !self.queues(side).contains_key(&price) {
            self.index(side).remove(price);
        }
        popped
    }

    /// Removes one specific order-id from a level via swap-with-last
    /// (spec §4.2's compaction strategy), used by cancellation. If the level
    /// is empty afterwards, the price is removed from the index in this
    /// same call — the fix for the source's unconditional-removal bug
    /// (spec §4.6.3, §8 scenario 3).
    pub fn remove_order(&mut self, side: Side, price: Price, order_id: OrderId) -> bool {
        let removed = {
            let queues = self.queues(side);
            match queues.get_mut(&price) {
                Some(queue) => {
                    if let Some(pos) = queue.iter().position(|&id| id == order_id) {
                        queue.swap_remove_back(pos);
                        true
                    } else {
                        false
                    }
                }
                None => false,
            }
        };
        let now_empty = self.queues(side).get(&price).is_none_or(VecDeque::is_empty);
        if now_empty {
            self.queues(side).remove(&price);
            self.index(side).remove(price);
        }
        removed
    }

    pub fn level_len(&self, side: Side, price: Price) -> usize {
        match side {
            Side::Buy => self.buy_queues.get(&price).map_or(0, VecDeque::len),
            Side::Sell => self.sell_queues.get(&price).map_or(0, VecDeque::len),
        }
    }

    pub fn level_orders(&self, side: Side, price: Price) -> Vec<OrderId> {
        match side {
            Side::Buy => self
                .buy_queues
                .get(&price)
                .map(|q| q.iter().copied().collect())
                .unwrap_or_default(),
            Side::Sell => self
                .sell_queues
                .get(&price)
                .map(|q| q.iter().copied().collect())
                .unwrap_or_default(),
        }
    }
}

/// A fill amount computed for a single maker/taker pairing during the match
/// loop, carried alongside the price it executed at.
#[derive(Debug, Clone, Copy)]
pub struct Fill {
    pub price: Price,
    pub amount: Amount,
}
