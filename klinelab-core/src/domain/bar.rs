//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV kline for a single fixed interval.
///
/// Series are ordered ascending by timestamp. Irregular spacing is tolerated
/// (exchange outages, delisted intervals) — only the ordering matters to the
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any price field is NaN.
    pub fn has_nan(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLCV sanity check: high >= low, high/low bracket open and
    /// close, prices strictly positive.
    pub fn is_sane(&self) -> bool {
        if self.has_nan() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
    }
}
