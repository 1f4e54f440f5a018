use crate::prelude::{AssetId, EngineError, Pair, PairId};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Canonical pair id: sort `(base, quote)` lexicographically, then hash the
/// concatenation. Both orderings of a pair therefore yield the same id
/// (spec §3); any deterministic commutative-independent function would do
/// (spec §1 puts the hash choice out of scope), SHA-256 is used for
/// concreteness.
pub fn canonical_pair_id(base: AssetId, quote: AssetId) -> PairId {
    let (lo, hi) = if base <= quote { (base, quote) } else { (quote, base) };
    let mut hasher = Sha256::new();
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

/// Registered trading pairs (C5). A pair, once added, is never physically
/// removed — `remove_pair` only flips `active` to `false`; its id remains
/// bound to the originally registered token ordering.
#[derive(Debug, Default)]
pub struct PairRegistry {
    pairs: HashMap<PairId, Pair>,
    /// Insertion order, for `get_pairs_paginated` and `get_pair(index)`.
    pair_keys: Vec<PairId>,
}

impl PairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pair(
        &mut self,
        base: AssetId,
        quote: AssetId,
        decimals_base: u8,
        decimals_quote: u8,
    ) -> Result<Pair, EngineError> {
        if base == quote {
            return Err(EngineError::InvalidPair);
        }
        if decimals_base < 6 || decimals_quote < 6 {
            return Err(EngineError::InsufficientDecimals);
        }
        let pair_id = canonical_pair_id(base, quote);
        if self.pairs.contains_key(&pair_id) {
            return Err(EngineError::PairAlreadyRegistered);
        }
        let pair = Pair {
            pair_id,
            base,
            quote,
            decimals_base,
            decimals_quote,
            active: true,
        };
        self.pairs.insert(pair_id, pair.clone());
        self.pair_keys.push(pair_id);
        Ok(pair)
    }

    pub fn remove_pair(&mut self, pair_id: PairId) -> Result<(), EngineError> {
        let pair = self.pairs.get_mut(&pair_id).ok_or(EngineError::InvalidPair)?;
        if !pair.active {
            return Err(EngineError::InvalidPair);
        }
        pair.active = false;
        Ok(())
    }

    /// Fails if the pair is not registered or not active (spec §4.5).
    pub fn get_pair_id(&self, base: AssetId, quote: AssetId) -> Result<PairId, EngineError> {
        let pair_id = canonical_pair_id(base, quote);
        match self.pairs.get(&pair_id) {
            Some(pair) if pair.active => Ok(pair_id),
            _ => Err(EngineError::InvalidPair),
        }
    }

    pub fn get(&self, pair_id: &PairId) -> Option<&Pair> {
        self.pairs.get(pair_id)
    }

    pub fn get_by_index(&self, index: usize) -> Option<&Pair> {
        self.pair_keys.get(index).and_then(|id| self.pairs.get(id))
    }

    pub fn get_pairs_paginated(&self, offset: usize, limit: usize) -> (Vec<Pair>, u64) {
        let pairs = self
            .pair_keys
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| self.pairs.get(id).cloned())
            .collect();
        (pairs, self.pair_keys.len() as u64)
    }

    pub fn is_active(&self, pair_id: &PairId) -> bool {
        self.pairs.get(pair_id).is_some_and(|p| p.active)
    }
}
