//! `apex-core`: a central-limit order book matching engine coupled to a
//! custody vault ledger.
//!
//! The crate is organized the way a matching engine core usually is: an
//! ordered price index and per-pair order book (`engine::book`), an
//! append-only order store (`engine::store`), the vault balance ledger
//! (`engine::vault`), the pair registry (`engine::pair`), the match loop
//! (`engine::matching`), and the vault-side façade that is the sole entry
//! point for placing, matching and canceling orders (`engine::coordinator`).

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod engine;

pub use engine::prelude;
