/// Process-wide tunables for the matching engine (spec §9 Open Questions,
/// resolved here — see DESIGN.md).
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Upper bound on individual-order-level comparisons within one
    /// `match_order` call. The source had a debug value of 2 and a
    /// production value of 100; 100 is chosen here.
    pub max_match_iterations: u64,
    /// Minimum order amount (and minimum derived quote notional divisor,
    /// see `MIN_AMOUNT × 100` in spec §4.7).
    pub min_amount: u128,
    /// Upper bound (inclusive) on `maker_bps`/`taker_bps` accepted by
    /// `set_fee_rates`. A fee above 10,000 bps (100%) would make a fill's fee
    /// exceed the fill itself, underflowing the net-of-fee subtraction in the
    /// match loop — `set_fee_rates` rejects any rate above this bound rather
    /// than let that arithmetic run.
    pub max_fee_bps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_match_iterations: 100,
            min_amount: 1,
            max_fee_bps: 10_000,
        }
    }
}
