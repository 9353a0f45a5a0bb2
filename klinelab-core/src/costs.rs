//! Cost model — slippage, commission, realized PnL, position sizing.
//!
//! All functions are pure. Commission is value-based on both legs and is not
//! scaled by leverage (TradingView convention: commission applies to position
//! notional, not leveraged exposure). Slippage is directional: buyers pay a
//! higher price, sellers receive a lower one.

use crate::config::BacktestConfig;
use crate::domain::Direction;

/// Guards the lot count against the division quotient landing one ulp below
/// an integer when `qty_step` is not exactly representable (1e-6, 1e-3, ...).
const LOT_EPSILON: f64 = 1e-12;

/// Execution friction for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Commission per leg as a fraction of traded value.
    pub commission_rate: f64,
    /// Fractional price slippage per fill.
    pub slippage: f64,
}

/// Realized PnL breakdown for a closed trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitPnl {
    pub gross: f64,
    pub commission: f64,
    pub net: f64,
    /// Net return as a percentage of allocated capital (entry notional).
    pub net_pct: f64,
}

impl CostModel {
    pub fn new(commission_rate: f64, slippage: f64) -> Self {
        Self {
            commission_rate,
            slippage,
        }
    }

    pub fn from_config(config: &BacktestConfig) -> Self {
        Self::new(config.commission_rate, config.slippage)
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Apply directional slippage to a raw fill price.
    pub fn apply_slippage(&self, raw_price: f64, is_buy: bool) -> f64 {
        if self.slippage == 0.0 {
            return raw_price;
        }
        if is_buy {
            raw_price * (1.0 + self.slippage)
        } else {
            raw_price * (1.0 - self.slippage)
        }
    }

    /// Commission across both legs: `(entry + exit) * quantity * rate`.
    pub fn round_trip_commission(&self, entry_price: f64, exit_price: f64, quantity: f64) -> f64 {
        (entry_price * quantity + exit_price * quantity) * self.commission_rate
    }

    /// Full realized PnL for a round trip.
    ///
    /// Gross PnL scales with leverage; commission and the percentage base do
    /// not.
    pub fn exit_pnl(
        &self,
        direction: Direction,
        entry_price: f64,
        exit_price: f64,
        quantity: f64,
        leverage: u32,
    ) -> ExitPnl {
        let gross =
            direction.sign() * (exit_price - entry_price) * quantity * leverage as f64;
        let commission = self.round_trip_commission(entry_price, exit_price, quantity);
        let net = gross - commission;
        let allocated = entry_price * quantity;
        let net_pct = if allocated > 0.0 {
            net / allocated * 100.0
        } else {
            0.0
        };
        ExitPnl {
            gross,
            commission,
            net,
            net_pct,
        }
    }
}

/// Position quantity for an allocation, truncated toward zero to the lot
/// step.
///
/// Returns 0.0 when the allocation cannot cover a single lot; the caller
/// reports the skipped entry instead of opening a dust position.
pub fn position_quantity(
    available_capital: f64,
    position_size: f64,
    entry_price: f64,
    qty_step: f64,
) -> f64 {
    if entry_price <= 0.0 || qty_step <= 0.0 {
        return 0.0;
    }
    let raw = available_capital * position_size / entry_price;
    let lots = (raw / qty_step * (1.0 + LOT_EPSILON)).floor();
    lots * qty_step
}
