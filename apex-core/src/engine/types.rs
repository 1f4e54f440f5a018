use serde::{Deserialize, Serialize};

/// Opaque user identifier.
pub type UserId = u64;

/// Opaque asset identifier (address-like, 32 bytes).
pub type AssetId = [u8; 32];

/// Canonical trading-pair identifier: SHA-256 of the sorted `(base, quote)` bytes.
pub type PairId = [u8; 32];

/// Monotonically increasing order identifier. `0` is reserved as "none".
pub type OrderId = u64;

/// Unsigned 128-bit price, denominated in quote-per-base. `0` is the market-order sentinel.
pub type Price = u128;

/// Unsigned 128-bit quantity (base units for sell-side amounts, quote units for
/// a market buy's budget).
pub type Amount = u128;

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Acquire the base asset, matching against resting sell orders.
    Buy,
    /// Dispose of the base asset, matching against resting buy orders.
    Sell,
}

impl Side {
    /// The side an incoming order of `self` matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Tag distinguishing a bounded-price order from an immediate-execution one.
///
/// The wire/storage layout keeps `price == 0` as the market sentinel (spec §3);
/// this enum is derived from that field and is what the match loop branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Limit(Price),
    Market,
}

/// A resting or historical order. Orders are never deleted — once placed they
/// remain queryable (active or not) for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub base: AssetId,
    pub quote: AssetId,
    pub side: Side,
    /// `0` denotes a market order.
    pub price: Price,
    /// Quantity as submitted at placement; never mutated afterwards.
    pub amount: Amount,
    /// Decreases only via matching; reaches zero exactly when the order is done.
    pub remaining_amount: Amount,
    /// Monotonic placement sequence number; drives FIFO tie-breaking.
    pub timestamp: u64,
    /// Wall-clock creation time, in milliseconds, for observability only.
    pub created_at: u64,
    /// `true` iff the order is still eligible to match or sit in a book queue.
    pub active: bool,
}

impl Order {
    /// The order's kind, derived from its stored price.
    pub fn kind(&self) -> OrderKind {
        if self.price == 0 {
            OrderKind::Market
        } else {
            OrderKind::Limit(self.price)
        }
    }

    pub fn is_market(&self) -> bool {
        self.price == 0
    }
}

/// A registered trading pair. Once added, a pair is never physically removed —
/// `remove_pair` only flips `active` to `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pair {
    pub pair_id: PairId,
    pub base: AssetId,
    pub quote: AssetId,
    pub decimals_base: u8,
    pub decimals_quote: u8,
    pub active: bool,
}

/// One leg of a match, as reported in a `TradeExecuted` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExecuted {
    pub maker_id: OrderId,
    pub taker_id: OrderId,
    pub base: AssetId,
    pub quote: AssetId,
    pub price: Price,
    pub amount: Amount,
    pub maker_fee: Amount,
    pub taker_fee: Amount,
}

/// Summary of the head order at a price level, for `best_buy`/`best_sell` snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub order_id: OrderId,
    pub remaining_amount: Amount,
}

/// A page of orders returned by `get_orders_paginated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub next_start_price: Price,
    pub total_count: u64,
}

/// A page of pairs returned by `get_pairs_paginated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairPage {
    pub pairs: Vec<Pair>,
    pub total_count: u64,
}

/// `{ user, base, quote, side, amount, price, pre_approval_id, signature }` (spec §6).
///
/// `price == 0` submits a market order. `pre_approval_id` is opaque replay-protection
/// material; `signature` is opaque material consumed by `verify_request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequest {
    pub user: UserId,
    pub base: AssetId,
    pub quote: AssetId,
    pub side: Side,
    pub amount: Amount,
    pub price: Price,
    pub pre_approval_id: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Result of a single `execute_trade` call within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub order_id: OrderId,
    pub remaining_amount: Amount,
}
