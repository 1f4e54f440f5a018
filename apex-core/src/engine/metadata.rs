use crate::prelude::AssetId;
use std::collections::HashMap;

/// Supplies asset metadata (decimals) for `add_pair`/`deposit` validation.
/// Opaque collaborator, like `verify_request` — out of scope for this crate
/// to resolve on-chain or otherwise (spec §1).
pub trait AssetMetadata: Send + Sync {
    fn decimals(&self, asset: &AssetId) -> Option<u8>;
}

/// `HashMap`-backed `AssetMetadata` for hosts that register assets ahead of
/// time; used throughout the test suite.
#[derive(Debug, Default)]
pub struct StaticAssetMetadata {
    decimals: HashMap<AssetId, u8>,
}

impl StaticAssetMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, asset: AssetId, decimals: u8) -> Self {
        self.decimals.insert(asset, decimals);
        self
    }

    pub fn register(&mut self, asset: AssetId, decimals: u8) {
        self.decimals.insert(asset, decimals);
    }
}

impl AssetMetadata for StaticAssetMetadata {
    fn decimals(&self, asset: &AssetId) -> Option<u8> {
        self.decimals.get(asset).copied()
    }
}
