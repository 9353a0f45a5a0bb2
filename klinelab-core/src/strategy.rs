//! Strategy seam — anything that can turn a bar series into a signal column.
//!
//! The engine never knows which concrete strategy produced its signals; it
//! consumes the column as an opaque, index-aligned input. Indicator
//! computation itself belongs to the calling layer — this module carries the
//! trait plus the two implementations the tests and benchmarks need.

use crate::domain::{Bar, Signal};

/// Produce one signal per bar, index-aligned with the input series.
pub trait Strategy {
    fn signals(&self, bars: &[Bar]) -> Vec<Signal>;
}

/// A signal column computed elsewhere (API layer, indicator service) and
/// passed through verbatim.
#[derive(Debug, Clone)]
pub struct PrecomputedSignals(pub Vec<Signal>);

impl Strategy for PrecomputedSignals {
    fn signals(&self, _bars: &[Bar]) -> Vec<Signal> {
        self.0.clone()
    }
}

/// Simple moving average crossover: long when the fast average crosses above
/// the slow one, short when it crosses below, flat elsewhere.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    pub fast: usize,
    pub slow: usize,
}

impl MaCrossover {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self { fast, slow }
    }

    fn sma(closes: &[f64], period: usize, index: usize) -> Option<f64> {
        if period == 0 || index + 1 < period {
            return None;
        }
        let window = &closes[index + 1 - period..=index];
        Some(window.iter().sum::<f64>() / period as f64)
    }
}

impl Strategy for MaCrossover {
    fn signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut out = vec![Signal::Flat; bars.len()];
        for i in 1..bars.len() {
            let (Some(fast_now), Some(slow_now), Some(fast_prev), Some(slow_prev)) = (
                Self::sma(&closes, self.fast, i),
                Self::sma(&closes, self.slow, i),
                Self::sma(&closes, self.fast, i - 1),
                Self::sma(&closes, self.slow, i - 1),
            ) else {
                continue;
            };
            if fast_prev <= slow_prev && fast_now > slow_now {
                out[i] = Signal::Long;
            } else if fast_prev >= slow_prev && fast_now < slow_now {
                out[i] = Signal::Short;
            }
        }
        out
    }
}
