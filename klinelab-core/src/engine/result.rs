//! The engine's sole output contract.

use serde::{Deserialize, Serialize};

use crate::domain::{EquityPoint, Trade};
use crate::error::Warning;

/// Everything a single run produces.
///
/// `trades` and `equity_curve` are the interface consumed by the metrics
/// layer. `warnings` carries recoverable data-quality notes; a non-empty
/// list means "inspect before trusting", not "discard".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Closed trades in exit order.
    pub trades: Vec<Trade>,
    /// One mark-to-market point per input bar.
    pub equity_curve: Vec<EquityPoint>,
    /// Realized capital after the final bar.
    pub final_capital: f64,
    pub warnings: Vec<Warning>,
}

impl BacktestResult {
    /// Sum of realized net PnL across the ledger.
    ///
    /// By the conservation law this equals `final_capital -
    /// initial_capital` to floating-point tolerance.
    pub fn total_net_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.net_pnl).sum()
    }

    /// Equity values only, in bar order (the shape the metrics layer
    /// consumes).
    pub fn equity_values(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.equity).collect()
    }
}
