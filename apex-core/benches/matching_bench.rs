use apex_core::prelude::*;
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use std::sync::Arc;

const BASE: AssetId = [1u8; 32];
const QUOTE: AssetId = [2u8; 32];
const ADMIN: UserId = 0;

fn new_exchange() -> Exchange {
    let metadata = StaticAssetMetadata::new().with_asset(BASE, 18).with_asset(QUOTE, 6);
    Exchange::new(ADMIN, Arc::new(metadata), Arc::new(NullEventSink))
}

fn request(user: UserId, side: Side, amount: Amount, price: Price, tag: u64) -> TradeRequest {
    TradeRequest {
        user,
        base: BASE,
        quote: QUOTE,
        side,
        amount,
        price,
        pre_approval_id: tag.to_le_bytes().to_vec(),
        signature: Vec::new(),
    }
}

/// Builds a fresh exchange with `depth` resting sell orders spread across
/// `depth` distinct price levels, each with a deep-pocketed seller behind it.
fn book_with_resting_sells(depth: u64) -> Exchange {
    let exchange = new_exchange();
    exchange.add_pair(ADMIN, BASE, QUOTE).unwrap();
    for i in 0..depth {
        let seller = 1_000 + i;
        exchange.deposit(seller, BASE, 10).unwrap();
        exchange
            .execute_trade(request(seller, Side::Sell, 10, 100 + i as u128, i), true)
            .unwrap();
    }
    exchange
}

/// Places and immediately matches `n` non-crossing limit orders in
/// alternating directions, so the book only ever grows — this isolates
/// placement + FIFO/price-index bookkeeping cost from the match loop.
fn bench_non_crossing_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("non_crossing_placement");
    group.throughput(Throughput::Elements(1));
    group.bench_function("place 10k resting limit orders", |b| {
        b.iter_batched(
            || {
                let exchange = new_exchange();
                exchange.add_pair(ADMIN, BASE, QUOTE).unwrap();
                for i in 0..10_000u64 {
                    exchange.deposit(i, BASE, 10).unwrap();
                }
                exchange
            },
            |exchange| {
                for i in 0..10_000u64 {
                    exchange
                        .execute_trade(request(i, Side::Sell, 10, 1_000 + i as u128, i), true)
                        .unwrap();
                }
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

/// A single marketable buy sweeping every resting sell level in a 500-deep
/// book — the match loop's per-fill bookkeeping (vault credits, fee pools,
/// event emission, price-index removal) is the hot path under measurement.
fn bench_sweep_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_match");
    const DEPTH: u64 = 500;
    group.throughput(Throughput::Elements(DEPTH));
    group.bench_function("market buy sweeps 500 resting levels", |b| {
        b.iter_batched(
            || {
                let exchange = book_with_resting_sells(DEPTH);
                exchange.deposit(2_000_000, QUOTE, 10_000_000_000).unwrap();
                exchange
            },
            |exchange| {
                exchange
                    .execute_trade(request(2_000_000, Side::Buy, 1_000_000_000, 0, 999_999), true)
                    .unwrap();
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_non_crossing_placement, bench_sweep_match);
criterion_main!(benches);
