use crate::prelude::{
    Amount, AssetId, AssetMetadata, EngineConfig, EngineError, Event, EventSink, Order, OrderId,
    OrderPage, OrderStore, Pair, PairBook, PairId, PairPage, PairRegistry, Price, Side, TradeOutcome,
    TradeRequest, UserId, Vault, canonical_pair_id,
};
use crate::engine::matching;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// The single authoritative copy of every entity the engine owns: the vault
/// ledger, the order store, the pair registry, one `PairBook` per active
/// pair, the mutable fee-rate scalars, and the replay-protection set.
///
/// Every field here is reachable only through `Exchange`'s one
/// `parking_lot::RwLock` — there is no bidirectional reference between the
/// matching engine and the vault to decouple via a capability object (spec
/// §9 raises that as a mitigation for a split-lock design); the match loop
/// simply borrows `&mut Vault` alongside `&mut OrderStore`/`&mut PairBook`
/// for the duration of one write-locked call.
struct ExchangeState {
    vault: Vault,
    store: OrderStore,
    pairs: PairRegistry,
    books: HashMap<PairId, PairBook>,
    maker_fee_bps: u32,
    taker_fee_bps: u32,
    seen_approval_ids: HashSet<Vec<u8>>,
}

/// The vault-side façade (C7) and top-level handle for the whole exchange:
/// sole authorized caller of order placement, matching, and cancellation.
///
/// Concurrency model (spec §5): single-writer, multiple-reader. Every
/// mutating operation takes the write guard for its entire duration, runs
/// to completion with no suspension points, and releases the lock before
/// any event is emitted. Read-only queries take the read guard.
/// `parking_lot::RwLock` is used over `std::sync::RwLock` for its smaller,
/// faster uncontended path and because it never poisons on panic.
pub struct Exchange {
    state: RwLock<ExchangeState>,
    config: EngineConfig,
    admin: UserId,
    metadata: Arc<dyn AssetMetadata>,
    events: Arc<dyn EventSink>,
    sequence: AtomicU64,
}

impl Exchange {
    pub fn new(admin: UserId, metadata: Arc<dyn AssetMetadata>, events: Arc<dyn EventSink>) -> Self {
        Self::with_config(admin, metadata, events, EngineConfig::default())
    }

    pub fn with_config(
        admin: UserId,
        metadata: Arc<dyn AssetMetadata>,
        events: Arc<dyn EventSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            state: RwLock::new(ExchangeState {
                vault: Vault::new(),
                store: OrderStore::new(),
                pairs: PairRegistry::new(),
                books: HashMap::new(),
                maker_fee_bps: 0,
                taker_fee_bps: 0,
                seen_approval_ids: HashSet::new(),
            }),
            config,
            admin,
            metadata,
            events,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn require_admin(&self, caller: UserId) -> Result<(), EngineError> {
        if caller != self.admin {
            return Err(EngineError::NotAuthorized);
        }
        Ok(())
    }

    // ---------------------------------------------------------------- admin

    #[tracing::instrument(skip(self))]
    pub fn add_pair(&self, caller: UserId, base: AssetId, quote: AssetId) -> Result<PairId, EngineError> {
        self.require_admin(caller)?;
        let decimals_base = self
            .metadata
            .decimals(&base)
            .ok_or(EngineError::InsufficientDecimals)?;
        let decimals_quote = self
            .metadata
            .decimals(&quote)
            .ok_or(EngineError::InsufficientDecimals)?;

        let pair = {
            let mut state = self.state.write();
            state.pairs.add_pair(base, quote, decimals_base, decimals_quote)?
        };
        tracing::debug!(pair_id = ?pair.pair_id, "pair added");
        self.events.emit(Event::PairAdded(pair.clone()));
        Ok(pair.pair_id)
    }

    #[tracing::instrument(skip(self))]
    pub fn remove_pair(&self, caller: UserId, pair_id: PairId) -> Result<(), EngineError> {
        self.require_admin(caller)?;
        {
            let mut state = self.state.write();
            state.pairs.remove_pair(pair_id)?;
        }
        self.events.emit(Event::PairRemoved(pair_id));
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn set_fee_rates(&self, caller: UserId, maker_bps: u32, taker_bps: u32) -> Result<(), EngineError> {
        self.require_admin(caller)?;
        if maker_bps > self.config.max_fee_bps || taker_bps > self.config.max_fee_bps {
            return Err(EngineError::InvalidFeeRate);
        }
        {
            let mut state = self.state.write();
            state.maker_fee_bps = maker_bps;
            state.taker_fee_bps = taker_bps;
        }
        self.events.emit(Event::FeeRatesUpdated { maker_bps, taker_bps });
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn withdraw_fees(&self, caller: UserId, asset: AssetId) -> Result<Amount, EngineError> {
        self.require_admin(caller)?;
        let amount = {
            let mut state = self.state.write();
            let amount = state.vault.withdraw_fees(asset);
            if amount > 0 {
                state.vault.credit(self.admin, asset, amount)?;
            }
            amount
        };
        self.events.emit(Event::FeesWithdrawn { asset, amount });
        Ok(amount)
    }

    // ----------------------------------------------------------- user-facing

    #[tracing::instrument(skip(self))]
    pub fn deposit(&self, user: UserId, asset: AssetId, amount: Amount) -> Result<(), EngineError> {
        let decimals = self
            .metadata
            .decimals(&asset)
            .ok_or(EngineError::InsufficientDecimals)?;
        if decimals < 6 {
            return Err(EngineError::InsufficientDecimals);
        }
        {
            let mut state = self.state.write();
            state.vault.deposit(user, asset, amount)?;
        }
        self.events.emit(Event::Deposit { user, asset, amount });
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn withdraw(&self, user: UserId, asset: AssetId, amount: Amount) -> Result<(), EngineError> {
        {
            let mut state = self.state.write();
            state.vault.withdraw(user, asset, amount)?;
        }
        if amount > 0 {
            self.events.emit(Event::Withdrawal { user, asset, amount });
        }
        Ok(())
    }

    /// Validates, locks collateral, places and immediately matches a single
    /// trade request (spec §4.7). `verified` is the result of the host's
    /// opaque `verify_request` predicate (signature + replay check, out of
    /// scope for this crate); `pre_approval_id` uniqueness is enforced here.
    #[tracing::instrument(skip(self, req), fields(user = req.user, side = ?req.side))]
    pub fn execute_trade(&self, req: TradeRequest, verified: bool) -> Result<TradeOutcome, EngineError> {
        if !verified {
            tracing::warn!("trade request failed verification");
            return Err(EngineError::InvalidSignature);
        }
        if req.pre_approval_id.is_empty() {
            return Err(EngineError::InvalidSignature);
        }

        let timestamp = self.next_sequence();
        let created_at = Self::now_ms();

        struct Staged {
            order_id: OrderId,
            remaining_amount: Amount,
            placed: Event,
            trades: Vec<Event>,
        }

        let staged = {
            let mut guard = self.state.write();
            let state = &mut *guard;

            if state.seen_approval_ids.contains(&req.pre_approval_id) {
                return Err(EngineError::ReplayedApprovalId);
            }
            if req.base == req.quote {
                return Err(EngineError::InvalidPair);
            }
            let pair_id = state.pairs.get_pair_id(req.base, req.quote)?;
            let pair = state
                .pairs
                .get(&pair_id)
                .expect("pair_id returned by a successful lookup must be registered")
                .clone();
            if pair.decimals_base < 6 || pair.decimals_quote < 6 {
                return Err(EngineError::InsufficientDecimals);
            }
            if req.amount < self.config.min_amount {
                return Err(EngineError::AmountBelowMinimum);
            }

            let book = state.books.entry(pair_id).or_default();

            let (lock_asset, lock_amount) = match (req.side, req.price) {
                (Side::Buy, price) if price > 0 => {
                    let quote_needed = req.amount.checked_mul(price).ok_or(EngineError::Overflow)?;
                    if quote_needed < self.config.min_amount.saturating_mul(100) {
                        return Err(EngineError::AmountBelowMinimum);
                    }
                    (req.quote, quote_needed)
                }
                (Side::Buy, _) => {
                    if book.best(Side::Sell) == 0 {
                        return Err(EngineError::NoLiquidity);
                    }
                    (req.quote, req.amount)
                }
                (Side::Sell, price) if price > 0 => (req.base, req.amount),
                (Side::Sell, _) => {
                    if book.best(Side::Buy) == 0 {
                        return Err(EngineError::NoLiquidity);
                    }
                    (req.base, req.amount)
                }
            };

            state.vault.debit(req.user, lock_asset, lock_amount)?;

            let order_id = matching::place_order(
                &mut state.store,
                book,
                req.user,
                req.base,
                req.quote,
                req.side,
                req.amount,
                req.price,
                timestamp,
                created_at,
            )?;
            state.vault.lock(order_id, lock_amount);

            let placed = Event::OrderPlaced {
                id: order_id,
                user: req.user,
                side: req.side,
                base: req.base,
                quote: req.quote,
                price: req.price,
                amount: req.amount,
            };

            let outcome = matching::match_order(
                &mut state.store,
                book,
                &mut state.vault,
                state.maker_fee_bps,
                state.taker_fee_bps,
                self.config.max_match_iterations,
                order_id,
            )?;

            if req.price == 0 && outcome.remaining > 0 {
                let refund_asset = match req.side {
                    Side::Buy => req.quote,
                    Side::Sell => req.base,
                };
                // `refund == initial_lock − Σ(fill_i × price_i)`, expressed as the
                // unmatched share of the original lock (spec §4.6.2).
                let refund = match req.side {
                    Side::Buy => lock_amount
                        .checked_mul(outcome.remaining)
                        .and_then(|v| v.checked_div(req.amount))
                        .unwrap_or(0),
                    Side::Sell => outcome.remaining,
                };
                state.vault.credit(req.user, refund_asset, refund)?;
                state.vault.release_lock(order_id);
            } else if !state.store.get(order_id).expect("order just placed").active {
                state.vault.release_lock(order_id);
            }

            state.seen_approval_ids.insert(req.pre_approval_id.clone());

            Staged {
                order_id,
                remaining_amount: outcome.remaining,
                placed,
                trades: outcome.events,
            }
        };

        self.events.emit(staged.placed);
        for trade in staged.trades {
            self.events.emit(trade);
        }

        Ok(TradeOutcome {
            order_id: staged.order_id,
            remaining_amount: staged.remaining_amount,
        })
    }

    /// Runs a batch of trade requests in order; each request succeeds or
    /// fails independently (spec §6's `execute_trade_batch`).
    pub fn execute_trade_batch(
        &self,
        requests: Vec<(TradeRequest, bool)>,
    ) -> Vec<Result<TradeOutcome, EngineError>> {
        requests
            .into_iter()
            .map(|(req, verified)| self.execute_trade(req, verified))
            .collect()
    }

    #[tracing::instrument(skip(self))]
    pub fn cancel_order(&self, caller: UserId, order_id: OrderId) -> Result<(), EngineError> {
        let owner = {
            let mut guard = self.state.write();
            let state = &mut *guard;

            let order = state.store.get(order_id).ok_or(EngineError::UnknownOrder)?;
            if order.user != caller {
                return Err(EngineError::NotAuthorized);
            }
            let (user, base, quote, side, amount) =
                (order.user, order.base, order.quote, order.side, order.amount);
            let pair_id = canonical_pair_id(base, quote);
            let book = state.books.entry(pair_id).or_default();

            matching::cancel_order(&mut state.store, book, order_id)?;

            let remaining = state.store.get(order_id).expect("just cancelled").remaining_amount;
            let locked = state.vault.get_locked_amount(order_id);
            let (refund_asset, refund) = match side {
                Side::Buy => (
                    quote,
                    locked
                        .checked_mul(remaining)
                        .and_then(|v| v.checked_div(amount))
                        .unwrap_or(0),
                ),
                Side::Sell => (base, remaining),
            };
            state.vault.credit(user, refund_asset, refund)?;
            state.vault.release_lock(order_id);
            user
        };

        self.events.emit(Event::OrderCancelled { id: order_id, user: owner });
        Ok(())
    }

    // --------------------------------------------------------------- queries

    pub fn get_balance(&self, user: UserId, asset: AssetId) -> Amount {
        self.state.read().vault.get_balance(user, asset)
    }

    pub fn get_order(&self, order_id: OrderId) -> Option<Order> {
        self.state.read().store.get(order_id).cloned()
    }

    pub fn get_pair(&self, index: usize) -> Option<Pair> {
        self.state.read().pairs.get_by_index(index).cloned()
    }

    pub fn get_pair_id(&self, base: AssetId, quote: AssetId) -> Result<PairId, EngineError> {
        self.state.read().pairs.get_pair_id(base, quote)
    }

    pub fn get_pairs_paginated(&self, offset: usize, limit: usize) -> PairPage {
        let (pairs, total_count) = self.state.read().pairs.get_pairs_paginated(offset, limit);
        PairPage { pairs, total_count }
    }

    pub fn get_best_buy_price(&self, pair_id: PairId) -> Price {
        self.state
            .read()
            .books
            .get(&pair_id)
            .map_or(0, |book| book.best(Side::Buy))
    }

    pub fn get_best_sell_price(&self, pair_id: PairId) -> Price {
        self.state
            .read()
            .books
            .get(&pair_id)
            .map_or(0, |book| book.best(Side::Sell))
    }

    pub fn get_best_order(&self, pair_id: PairId, side: Side) -> Option<crate::prelude::BookLevel> {
        let state = self.state.read();
        let book = state.books.get(&pair_id)?;
        matching::best_level(&state.store, book, side)
    }

    pub fn get_orders_paginated(
        &self,
        pair_id: PairId,
        side: Side,
        start_price: Price,
        limit: usize,
    ) -> OrderPage {
        let state = self.state.read();
        match state.books.get(&pair_id) {
            Some(book) => matching::get_orders_paginated(&state.store, book, side, start_price, limit),
            None => OrderPage {
                orders: Vec::new(),
                next_start_price: 0,
                total_count: 0,
            },
        }
    }

    pub fn get_locked_amount(&self, order_id: OrderId) -> Amount {
        self.state.read().vault.get_locked_amount(order_id)
    }
}
