use crate::prelude::{Amount, AssetId, EngineError, OrderId, UserId};
use std::collections::HashMap;

/// Custody ledger (C4): a per-`(user, asset)` non-negative balance map plus
/// the collateral-lock and fee-pool bookkeeping the engine needs to fund and
/// settle trades.
///
/// `debit`/`credit` are the engine-only internal mutations invoked while
/// matching; `deposit`/`withdraw` are the user-facing operations. Both kinds
/// go through the same underflow-checked arithmetic, so `BalanceNonNeg`
/// holds unconditionally (spec §8).
#[derive(Debug, Default)]
pub struct Vault {
    balances: HashMap<(UserId, AssetId), Amount>,
    /// Collateral currently held against a still-unfilled order. Set at
    /// placement, decremented as `TradeCoordinator` accounts for fills, and
    /// drained to zero by a cancel or market-residual refund.
    locked_amounts: HashMap<OrderId, Amount>,
    maker_fees: HashMap<AssetId, Amount>,
    taker_fees: HashMap<AssetId, Amount>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_balance(&self, user: UserId, asset: AssetId) -> Amount {
        self.balances.get(&(user, asset)).copied().unwrap_or(0)
    }

    /// External transfer-in happens in a collaborator out of scope for this
    /// crate (spec §4.4); this only records the ledger effect.
    pub fn deposit(&mut self, user: UserId, asset: AssetId, amount: Amount) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::AmountBelowMinimum);
        }
        self.credit(user, asset, amount)
    }

    /// A zero amount is a no-op, per spec §4.4.
    pub fn withdraw(&mut self, user: UserId, asset: AssetId, amount: Amount) -> Result<(), EngineError> {
        if amount == 0 {
            return Ok(());
        }
        self.debit(user, asset, amount)
    }

    /// Unchecked except for the underflow guard; callable only from the
    /// matching engine and coordinator paths.
    pub fn debit(&mut self, user: UserId, asset: AssetId, amount: Amount) -> Result<(), EngineError> {
        let key = (user, asset);
        let balance = self.balances.get(&key).copied().unwrap_or(0);
        let new_balance = balance
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientBalance {
                available: balance,
                requested: amount,
            })?;
        self.balances.insert(key, new_balance);
        Ok(())
    }

    pub fn credit(&mut self, user: UserId, asset: AssetId, amount: Amount) -> Result<(), EngineError> {
        let key = (user, asset);
        let balance = self.balances.get(&key).copied().unwrap_or(0);
        let new_balance = balance.checked_add(amount).ok_or(EngineError::Overflow)?;
        self.balances.insert(key, new_balance);
        Ok(())
    }

    pub fn lock(&mut self, order_id: OrderId, amount: Amount) {
        self.locked_amounts.insert(order_id, amount);
    }

    pub fn get_locked_amount(&self, order_id: OrderId) -> Amount {
        self.locked_amounts.get(&order_id).copied().unwrap_or(0)
    }

    /// Drops the lock entry entirely; used once an order's collateral is
    /// fully refunded (cancel, or market-order residual refund).
    pub fn release_lock(&mut self, order_id: OrderId) {
        self.locked_amounts.remove(&order_id);
    }

    pub fn accumulate_maker_fee(&mut self, asset: AssetId, amount: Amount) -> Result<(), EngineError> {
        let pool = self.maker_fees.entry(asset).or_insert(0);
        *pool = pool.checked_add(amount).ok_or(EngineError::Overflow)?;
        Ok(())
    }

    pub fn accumulate_taker_fee(&mut self, asset: AssetId, amount: Amount) -> Result<(), EngineError> {
        let pool = self.taker_fees.entry(asset).or_insert(0);
        *pool = pool.checked_add(amount).ok_or(EngineError::Overflow)?;
        Ok(())
    }

    /// Drains both fee pools for `asset` and returns the combined total,
    /// for the admin-only `withdraw_fees` operation.
    pub fn withdraw_fees(&mut self, asset: AssetId) -> Amount {
        let maker = self.maker_fees.remove(&asset).unwrap_or(0);
        let taker = self.taker_fees.remove(&asset).unwrap_or(0);
        maker + taker
    }
}
