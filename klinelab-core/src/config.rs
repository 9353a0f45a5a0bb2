//! Backtest configuration.
//!
//! All tunables travel in an explicit [`BacktestConfig`] value passed into
//! every run — there is no process-wide state. The calling layer validates
//! before handing it over; the engine re-validates defensively.

use serde::{Deserialize, Serialize};

use crate::domain::Direction;
use crate::error::EngineError;

/// Immutable configuration for a single backtest run.
///
/// Defaults mirror Bybit derivative conventions: 0.07% taker commission per
/// leg, no slippage, 1x leverage, full-capital sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Commission per leg as a fraction of traded value (0.0007 = 0.07%).
    pub commission_rate: f64,
    /// Fractional price slippage, applied adversely to every fill.
    pub slippage: f64,
    pub leverage: u32,
    /// Fraction of available capital allocated per trade, in (0, 1].
    pub position_size: f64,
    /// Fixed stop distance as a fraction of entry price.
    pub stop_loss_pct: Option<f64>,
    /// Fixed profit target as a fraction of entry price.
    pub take_profit_pct: Option<f64>,
    /// Force-exit any position held this many bars or longer.
    pub max_holding_bars: Option<usize>,
    /// Exit on a neutral (0) signal, not only on an opposing one.
    pub flatten_on_neutral: bool,
    /// Lot step for position quantity; raw size truncates toward zero to a
    /// multiple of this step.
    pub qty_step: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            commission_rate: 0.0007,
            slippage: 0.0,
            leverage: 1,
            position_size: 1.0,
            stop_loss_pct: None,
            take_profit_pct: None,
            max_holding_bars: None,
            flatten_on_neutral: false,
            qty_step: 1e-6,
        }
    }
}

impl BacktestConfig {
    /// Check every precondition the engine relies on.
    ///
    /// Comparisons are written so NaN fails them.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.initial_capital > 0.0) {
            return Err(EngineError::InvalidConfig(
                "initial_capital must be positive".into(),
            ));
        }
        if !(self.commission_rate >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "commission_rate must be non-negative".into(),
            ));
        }
        if !(self.slippage >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "slippage must be non-negative".into(),
            ));
        }
        if self.leverage < 1 {
            return Err(EngineError::InvalidConfig("leverage must be >= 1".into()));
        }
        if !(self.position_size > 0.0 && self.position_size <= 1.0) {
            return Err(EngineError::InvalidConfig(
                "position_size must be in (0, 1]".into(),
            ));
        }
        if let Some(pct) = self.stop_loss_pct {
            if !(pct > 0.0 && pct < 1.0) {
                return Err(EngineError::InvalidConfig(
                    "stop_loss_pct must be in (0, 1)".into(),
                ));
            }
        }
        if let Some(pct) = self.take_profit_pct {
            if !(pct > 0.0) {
                return Err(EngineError::InvalidConfig(
                    "take_profit_pct must be positive".into(),
                ));
            }
        }
        if let Some(bars) = self.max_holding_bars {
            if bars == 0 {
                return Err(EngineError::InvalidConfig(
                    "max_holding_bars must be >= 1".into(),
                ));
            }
        }
        if !(self.qty_step > 0.0) {
            return Err(EngineError::InvalidConfig(
                "qty_step must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Stop-loss and take-profit price levels for an entry at `entry_price`.
    pub fn bracket_levels(
        &self,
        direction: Direction,
        entry_price: f64,
    ) -> (Option<f64>, Option<f64>) {
        let stop_loss = self.stop_loss_pct.map(|pct| match direction {
            Direction::Long => entry_price * (1.0 - pct),
            Direction::Short => entry_price * (1.0 + pct),
        });
        let take_profit = self.take_profit_pct.map(|pct| match direction {
            Direction::Long => entry_price * (1.0 + pct),
            Direction::Short => entry_price * (1.0 - pct),
        });
        (stop_loss, take_profit)
    }
}
