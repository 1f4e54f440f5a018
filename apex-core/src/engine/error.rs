use thiserror::Error;

/// Error surface for every mutating and query operation in the engine and
/// vault. Every variant rejects the request before any state is mutated —
/// no operation is ever half-applied (spec §7).
///
/// `IterationLimit` in spec §7 is deliberately absent: hitting
/// `MAX_MATCH_ITERATIONS` is normal control flow, not a failure, and is only
/// observable as a `tracing` event.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EngineError {
    #[error("pair not registered or inactive, or base == quote")]
    InvalidPair,

    #[error("balance {available} below requested {requested}")]
    InsufficientBalance { available: u128, requested: u128 },

    #[error("asset decimals below the minimum of 6")]
    InsufficientDecimals,

    #[error("amount below the configured minimum")]
    AmountBelowMinimum,

    #[error("market order has no opposite-side liquidity to match against")]
    NoLiquidity,

    #[error("order is not active")]
    NotActive,

    #[error("caller is not authorized for this operation")]
    NotAuthorized,

    #[error("request signature failed verification")]
    InvalidSignature,

    #[error("pre_approval_id has already been consumed")]
    ReplayedApprovalId,

    #[error("order id is unknown")]
    UnknownOrder,

    #[error("pair is already registered")]
    PairAlreadyRegistered,

    #[error("fee rate exceeds the configured maximum")]
    InvalidFeeRate,

    #[error("arithmetic overflow")]
    Overflow,
}
