//! Performance metrics — pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade ledger in,
//! scalar out. This crate consumes only the engine's output contract
//! (ordered trades plus ordered equity values); it never looks inside the
//! bar loop.
//!
//! Annualization takes an explicit `periods_per_year` because crypto trades
//! around the clock: 365 for daily bars, 8_760 for hourly, 525_600 for
//! one-minute klines.

use serde::{Deserialize, Serialize};

use klinelab_core::domain::{ExitReason, Trade};
use klinelab_core::BacktestResult;

/// Daily bars on a 24/7 market.
pub const PERIODS_PER_YEAR_DAILY: f64 = 365.0;
/// Hourly bars on a 24/7 market.
pub const PERIODS_PER_YEAR_HOURLY: f64 = 8_760.0;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub cagr: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub max_drawdown: f64,

    pub trade_count: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub expectancy: f64,

    pub gross_profit: f64,
    pub gross_loss: f64,
    pub total_commission: f64,

    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,

    pub avg_mfe: f64,
    pub avg_mae: f64,
    pub avg_bars_held: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,

    pub exit_reasons: ExitReasonCounts,
}

impl PerformanceMetrics {
    /// Compute all metrics from an equity curve and trade ledger.
    pub fn compute(equity: &[f64], trades: &[Trade], periods_per_year: f64) -> Self {
        Self {
            total_return: total_return(equity),
            cagr: cagr(equity, periods_per_year),
            sharpe: sharpe_ratio(equity, 0.0, periods_per_year),
            sortino: sortino_ratio(equity, 0.0, periods_per_year),
            calmar: calmar_ratio(equity, periods_per_year),
            max_drawdown: max_drawdown(equity),
            trade_count: trades.len(),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            expectancy: expectancy(trades),
            gross_profit: gross_profit(trades),
            gross_loss: gross_loss(trades),
            total_commission: total_commission(trades),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            largest_win: largest_win(trades),
            largest_loss: largest_loss(trades),
            avg_mfe: avg_mfe(trades),
            avg_mae: avg_mae(trades),
            avg_bars_held: avg_bars_held(trades),
            max_consecutive_wins: max_consecutive_wins(trades),
            max_consecutive_losses: max_consecutive_losses(trades),
            exit_reasons: ExitReasonCounts::from_trades(trades),
        }
    }

    /// Convenience wrapper over an engine result.
    pub fn from_result(result: &BacktestResult, periods_per_year: f64) -> Self {
        Self::compute(&result.equity_values(), &result.trades, periods_per_year)
    }
}

/// How many trades closed for each reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitReasonCounts {
    pub stop_loss: usize,
    pub take_profit: usize,
    pub signal_reversal: usize,
    pub end_of_data: usize,
    pub max_holding_period: usize,
}

impl ExitReasonCounts {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut counts = Self::default();
        for trade in trades {
            match trade.exit_reason {
                ExitReason::StopLoss => counts.stop_loss += 1,
                ExitReason::TakeProfit => counts.take_profit += 1,
                ExitReason::SignalReversal => counts.signal_reversal += 1,
                ExitReason::EndOfData => counts.end_of_data += 1,
                ExitReason::MaxHoldingPeriod => counts.max_holding_period += 1,
            }
        }
        counts
    }
}

// ─── Equity curve metrics ───────────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let initial = equity[0];
    let final_eq = *equity.last().unwrap();
    if initial <= 0.0 {
        return 0.0;
    }
    (final_eq - initial) / initial
}

/// Compound annual growth rate.
///
/// Returns 0.0 for degenerate inputs (single bar, non-positive equity).
pub fn cagr(equity: &[f64], periods_per_year: f64) -> f64 {
    if equity.len() < 2 || periods_per_year <= 0.0 {
        return 0.0;
    }
    let initial = equity[0];
    let final_eq = *equity.last().unwrap();
    if initial <= 0.0 || final_eq <= 0.0 {
        return 0.0;
    }
    let years = equity.len() as f64 / periods_per_year;
    (final_eq / initial).powf(1.0 / years) - 1.0
}

/// Annualized Sharpe ratio from per-bar returns.
///
/// Returns 0.0 if variance is zero or there are fewer than 2 returns.
pub fn sharpe_ratio(equity: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    let returns = bar_returns(equity);
    if returns.len() < 2 || periods_per_year <= 0.0 {
        return 0.0;
    }
    let rf_per_bar = risk_free_rate / periods_per_year;
    let excess: Vec<f64> = returns.iter().map(|r| r - rf_per_bar).collect();
    let mean = mean_f64(&excess);
    let std = std_dev(&excess);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * periods_per_year.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
pub fn sortino_ratio(equity: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    let returns = bar_returns(equity);
    if returns.len() < 2 || periods_per_year <= 0.0 {
        return 0.0;
    }
    let rf_per_bar = risk_free_rate / periods_per_year;
    let excess: Vec<f64> = returns.iter().map(|r| r - rf_per_bar).collect();
    let mean = mean_f64(&excess);

    let downside_sq: Vec<f64> = excess.iter().filter(|&&r| r < 0.0).map(|r| r * r).collect();
    if downside_sq.is_empty() {
        return 0.0; // no downside, ratio undefined
    }
    let downside_std = (downside_sq.iter().sum::<f64>() / returns.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    (mean / downside_std) * periods_per_year.sqrt()
}

/// Calmar ratio: CAGR / |max drawdown|.
pub fn calmar_ratio(equity: &[f64], periods_per_year: f64) -> f64 {
    let growth = cagr(equity, periods_per_year);
    let dd = max_drawdown(equity);
    if dd >= 0.0 || growth <= 0.0 {
        return 0.0;
    }
    growth / dd.abs()
}

/// Maximum drawdown as a negative fraction (-0.15 = 15% drawdown).
pub fn max_drawdown(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let mut peak = equity[0];
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

// ─── Trade ledger metrics ───────────────────────────────────────────

/// Fraction of trades with positive net PnL.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

/// Gross profits / gross losses, capped at 100 when losses are zero-ish.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let profit = gross_profit(trades);
    let loss = gross_loss(trades);
    if loss < 1e-10 {
        return if profit > 0.0 { 100.0 } else { 0.0 };
    }
    (profit / loss).min(100.0)
}

/// Mean net PnL per trade.
pub fn expectancy(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.net_pnl).sum::<f64>() / trades.len() as f64
}

/// Sum of winners' net PnL.
pub fn gross_profit(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| t.net_pnl > 0.0)
        .map(|t| t.net_pnl)
        .sum()
}

/// Sum of losers' |net PnL| (always >= 0).
pub fn gross_loss(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| t.net_pnl.abs())
        .sum()
}

/// Total commission paid across the ledger.
pub fn total_commission(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.commission).sum()
}

/// Mean net PnL across winners only.
pub fn avg_win(trades: &[Trade]) -> f64 {
    let winners: Vec<f64> = trades
        .iter()
        .filter(|t| t.net_pnl > 0.0)
        .map(|t| t.net_pnl)
        .collect();
    if winners.is_empty() {
        return 0.0;
    }
    mean_f64(&winners)
}

/// Mean net PnL across losers only (negative).
pub fn avg_loss(trades: &[Trade]) -> f64 {
    let losers: Vec<f64> = trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| t.net_pnl)
        .collect();
    if losers.is_empty() {
        return 0.0;
    }
    mean_f64(&losers)
}

pub fn largest_win(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.net_pnl).fold(0.0, f64::max)
}

pub fn largest_loss(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.net_pnl).fold(0.0, f64::min)
}

/// Mean maximum favorable excursion per trade.
pub fn avg_mfe(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.mfe).sum::<f64>() / trades.len() as f64
}

/// Mean maximum adverse excursion per trade (<= 0).
pub fn avg_mae(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.mae).sum::<f64>() / trades.len() as f64
}

/// Mean holding time in bars.
pub fn avg_bars_held(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.bars_held).sum::<usize>() as f64 / trades.len() as f64
}

/// Longest run of consecutive winning trades.
pub fn max_consecutive_wins(trades: &[Trade]) -> usize {
    max_consecutive(trades, true)
}

/// Longest run of consecutive losing trades.
pub fn max_consecutive_losses(trades: &[Trade]) -> usize {
    max_consecutive(trades, false)
}

fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut best = 0;
    let mut current = 0;
    for trade in trades {
        if trade.is_winner() == winners {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple per-bar returns; bars where the prior equity is non-positive are
/// skipped.
pub fn bar_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
