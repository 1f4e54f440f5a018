use apex_core::prelude::*;
use std::sync::Arc;

pub const ADMIN: UserId = 0;

/// A 32-byte asset id with `tag` in the low byte; distinct tags never collide.
pub fn asset(tag: u8) -> AssetId {
    let mut id = [0u8; 32];
    id[31] = tag;
    id
}

pub const BASE: u8 = 1;
pub const QUOTE: u8 = 2;

/// A fresh exchange with `BASE` (18 decimals) and `QUOTE` (6 decimals)
/// registered as metadata but no pair added yet.
pub fn new_exchange() -> Exchange {
    let metadata = StaticAssetMetadata::new()
        .with_asset(asset(BASE), 18)
        .with_asset(asset(QUOTE), 6);
    Exchange::new(ADMIN, Arc::new(metadata), Arc::new(NullEventSink))
}

/// Registers the canonical `BASE`/`QUOTE` pair and returns its id.
pub fn register_pair(exchange: &Exchange) -> PairId {
    exchange.add_pair(ADMIN, asset(BASE), asset(QUOTE)).unwrap()
}

pub fn approval(tag: u8) -> Vec<u8> {
    vec![tag]
}

pub fn limit_request(user: UserId, side: Side, amount: Amount, price: Price, tag: u8) -> TradeRequest {
    TradeRequest {
        user,
        base: asset(BASE),
        quote: asset(QUOTE),
        side,
        amount,
        price,
        pre_approval_id: approval(tag),
        signature: Vec::new(),
    }
}

pub fn market_request(user: UserId, side: Side, amount: Amount, tag: u8) -> TradeRequest {
    limit_request(user, side, amount, 0, tag)
}
