use crate::prelude::{AssetId, Amount, OrderId, Pair, PairId, Price, Side, TradeExecuted, UserId};
use crossbeam::channel::Sender;
use serde::{Deserialize, Serialize};

/// Tagged union of every event the engine/vault emit (spec §6).
///
/// Events are emitted only after the write lock guarding the mutating
/// transaction that produced them has been released (spec §5): the engine
/// never calls `EventSink::emit` while holding `ExchangeState`'s lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PairAdded(Pair),
    PairRemoved(PairId),
    Deposit {
        user: UserId,
        asset: AssetId,
        amount: Amount,
    },
    Withdrawal {
        user: UserId,
        asset: AssetId,
        amount: Amount,
    },
    OrderPlaced {
        id: OrderId,
        user: UserId,
        side: Side,
        base: AssetId,
        quote: AssetId,
        price: Price,
        amount: Amount,
    },
    TradeExecuted(TradeExecuted),
    OrderCancelled {
        id: OrderId,
        user: UserId,
    },
    FeeRatesUpdated {
        maker_bps: u32,
        taker_bps: u32,
    },
    FeesWithdrawn {
        asset: AssetId,
        amount: Amount,
    },
    VaultAddressUpdated,
}

/// Ordered, non-blocking emission of the event stream to an external
/// subscriber. Implementations must not block the caller — the match loop
/// runs with no suspension points (spec §5) and event emission must never
/// introduce one.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Discards every event. Used by tests and benches that don't care about
/// the event stream.
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: Event) {}
}

/// Forwards every event onto an unbounded `crossbeam` channel. The send is
/// non-blocking and preserves the emission order guaranteed by the
/// surrounding write lock (spec §5).
pub struct ChannelEventSink {
    sender: Sender<Event>,
}

impl ChannelEventSink {
    pub fn new(sender: Sender<Event>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: Event) {
        // An unbounded channel only fails to send when every receiver has
        // been dropped; there is no reasonable recovery for the engine
        // beyond dropping the event, so we log and move on.
        if self.sender.send(event).is_err() {
            tracing::warn!("event sink receiver dropped; discarding event");
        }
    }
}
