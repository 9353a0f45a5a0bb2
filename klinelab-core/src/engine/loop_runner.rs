//! The bar-by-bar backtest loop.
//!
//! A single-position state machine: flat, long, or short. Each bar is
//! processed in four steps — data-quality gate, exit handling, entry
//! handling, end-of-bar mark-to-market. A reversal signal closes the open
//! position and may reopen in the opposite direction on the same bar using
//! the freed capital. The loop is strictly sequential: every decision
//! depends on the position state and capital accumulated so far, so there is
//! no intra-run parallelism; parameter sweeps parallelize across whole runs
//! instead.

use chrono::{DateTime, Utc};

use crate::config::BacktestConfig;
use crate::costs::{position_quantity, CostModel};
use crate::domain::{Bar, Direction, EquityPoint, ExitReason, Position, Signal, Trade};
use crate::engine::result::BacktestResult;
use crate::error::{EngineError, Warning};
use crate::exit::{evaluate_exit, ExitDecision};

/// Mutable state that evolves bar-by-bar.
struct EngineState {
    capital: f64,
    position: Option<Position>,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    warnings: Vec<Warning>,
    /// Mark price fallback for malformed bars.
    last_valid_close: Option<f64>,
}

impl EngineState {
    fn new(initial_capital: f64, bar_count: usize) -> Self {
        Self {
            capital: initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::with_capacity(bar_count),
            warnings: Vec::new(),
            last_valid_close: None,
        }
    }

    /// Append this bar's equity point: realized capital plus unrealized PnL
    /// of any open position, marked at `mark_price`.
    fn mark_equity(&mut self, timestamp: DateTime<Utc>, mark_price: Option<f64>, leverage: u32) {
        let unrealized = match (&self.position, mark_price) {
            (Some(position), Some(price)) => position.unrealized_pnl(price, leverage),
            _ => 0.0,
        };
        self.equity_curve.push(EquityPoint {
            timestamp,
            equity: self.capital + unrealized,
        });
    }
}

/// Replay `bars` against `signals` under `config`.
///
/// Deterministic, synchronous, no I/O: identical inputs produce identical
/// results. Preconditions are checked before any state mutation; everything
/// after that is recoverable and lands in the result's `warnings`.
pub fn run_backtest(
    bars: &[Bar],
    signals: &[Signal],
    config: &BacktestConfig,
) -> Result<BacktestResult, EngineError> {
    if bars.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    if bars.len() != signals.len() {
        return Err(EngineError::LengthMismatch {
            bars: bars.len(),
            signals: signals.len(),
        });
    }
    config.validate()?;

    let cost_model = CostModel::from_config(config);
    let mut state = EngineState::new(config.initial_capital, bars.len());
    let last_index = bars.len() - 1;

    for (i, (bar, &signal)) in bars.iter().zip(signals).enumerate() {
        // Data-quality gate: a malformed bar gets no position actions, only
        // equity carry-forward on the last valid close.
        if !bar.is_sane() {
            state.warnings.push(Warning::MalformedBar { bar_index: i });
            state.mark_equity(bar.timestamp, state.last_valid_close, config.leverage);
            continue;
        }
        state.last_valid_close = Some(bar.close);

        // Exit handling. The position is taken out of the state so a
        // same-bar reversal sees a flat book and the freed capital.
        if let Some(mut position) = state.position.take() {
            position.update_excursion(bar);
            match evaluate_exit(&position, bar, i, signal, i == last_index, config) {
                Some(decision) => close_position(
                    &mut state,
                    &cost_model,
                    config,
                    position,
                    bar.timestamp,
                    i,
                    decision,
                ),
                None => state.position = Some(position),
            }
        }

        // Entry handling: originally flat, or just flattened by a reversal.
        // Nothing opens on the final bar — it would close at the same price
        // one step later and only burn commission.
        if state.position.is_none() && i != last_index {
            if let Some(direction) = signal.direction() {
                open_position(&mut state, &cost_model, config, bar, i, direction);
            }
        }

        state.mark_equity(bar.timestamp, Some(bar.close), config.leverage);
    }

    // Reachable only when the series ends in malformed bars: the in-loop
    // force-close never ran, so settle on the last valid close instead of
    // silently dropping the position.
    if let Some(position) = state.position.take() {
        if let Some(price) = state.last_valid_close {
            close_position(
                &mut state,
                &cost_model,
                config,
                position,
                bars[last_index].timestamp,
                last_index,
                ExitDecision {
                    price,
                    reason: ExitReason::EndOfData,
                },
            );
        }
    }

    Ok(BacktestResult {
        trades: state.trades,
        equity_curve: state.equity_curve,
        final_capital: state.capital,
        warnings: state.warnings,
    })
}

/// Size and open a new position at this bar's close.
fn open_position(
    state: &mut EngineState,
    cost_model: &CostModel,
    config: &BacktestConfig,
    bar: &Bar,
    bar_index: usize,
    direction: Direction,
) {
    let entry_is_buy = direction == Direction::Long;
    let fill_price = cost_model.apply_slippage(bar.close, entry_is_buy);
    let quantity = position_quantity(
        state.capital,
        config.position_size,
        fill_price,
        config.qty_step,
    );
    if quantity <= 0.0 {
        state.warnings.push(Warning::SkippedEntry { bar_index });
        return;
    }
    let (stop_loss, take_profit) = config.bracket_levels(direction, fill_price);
    state.position = Some(Position::open(
        direction,
        bar.timestamp,
        fill_price,
        quantity,
        stop_loss,
        take_profit,
        bar_index,
    ));
}

/// Convert a position into a trade record and realize its PnL.
#[allow(clippy::too_many_arguments)]
fn close_position(
    state: &mut EngineState,
    cost_model: &CostModel,
    config: &BacktestConfig,
    position: Position,
    exit_time: DateTime<Utc>,
    bar_index: usize,
    decision: ExitDecision,
) {
    let exit_is_buy = position.direction == Direction::Short;
    let fill_price = cost_model.apply_slippage(decision.price, exit_is_buy);
    let mut pnl = cost_model.exit_pnl(
        position.direction,
        position.entry_price,
        fill_price,
        position.quantity,
        config.leverage,
    );

    // Simulated liquidation: a leveraged loss cannot take capital below
    // zero. The clamp keeps the conservation law intact because the trade
    // records the clamped net.
    if state.capital + pnl.net < 0.0 {
        state.warnings.push(Warning::CapitalFloor { bar_index });
        pnl.net = -state.capital;
        pnl.net_pct = pnl.net / (position.entry_price * position.quantity) * 100.0;
    }
    state.capital += pnl.net;

    state.trades.push(Trade {
        direction: position.direction,
        entry_time: position.entry_time,
        entry_price: position.entry_price,
        exit_time,
        exit_price: fill_price,
        quantity: position.quantity,
        gross_pnl: pnl.gross,
        commission: pnl.commission,
        net_pnl: pnl.net,
        net_pnl_pct: pnl.net_pct,
        mfe: position.mfe(config.leverage),
        mae: position.mae(config.leverage),
        bars_held: bar_index - position.opened_at_bar,
        exit_reason: decision.reason,
    });
}
