//! Error taxonomy: fatal input errors vs recoverable data-quality warnings.
//!
//! Precondition violations abort `run_backtest` before any state mutation.
//! Everything encountered mid-run is recoverable: the engine falls back to a
//! deterministic behavior and records a [`Warning`] in the result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal input errors. Never retried, never raised mid-run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("bar series is empty")]
    EmptyInput,

    #[error("length mismatch: {bars} bars vs {signals} signals")]
    LengthMismatch { bars: usize, signals: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Recoverable data-quality conditions, reported via
/// `BacktestResult::warnings`.
///
/// A warning means the run continued on a deterministic fallback. Callers
/// should inspect result quality before trusting headline metrics, but a
/// non-empty list is not grounds to discard the result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An entry signal fired but the computed quantity truncated to zero
    /// lots. No position was opened.
    #[error("entry signal at bar {bar_index} skipped: quantity truncated to zero")]
    SkippedEntry { bar_index: usize },

    /// A bar failed the OHLC sanity check. Position actions were skipped for
    /// that bar; equity tracking carried forward on the last valid close.
    #[error("malformed bar at index {bar_index}: position actions skipped")]
    MalformedBar { bar_index: usize },

    /// A leveraged loss exceeded available capital. The trade's net PnL was
    /// clamped so capital bottoms out at zero (simulated liquidation).
    #[error("liquidation at bar {bar_index}: loss clamped to available capital")]
    CapitalFloor { bar_index: usize },
}
