//! Exit evaluator — per-bar decision whether an open position closes, at
//! what price, and why.
//!
//! Conditions are checked in a fixed order and the first match wins:
//! stop-loss, take-profit, max holding period, opposing/neutral signal, end
//! of data. Stops and targets are checked against the bar's high/low to
//! capture intrabar excursions, and they fill at their own level, not at the
//! bar extreme. When a stop and a target are both touchable within one bar,
//! the stop fires.

use crate::config::BacktestConfig;
use crate::domain::{Bar, Direction, ExitReason, Position, Signal};

/// The evaluator's verdict: close at `price` for `reason`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitDecision {
    pub price: f64,
    pub reason: ExitReason,
}

/// Decide whether `position` closes on this bar.
///
/// Pure and idempotent: same inputs, same verdict. The caller applies
/// slippage to the decision price when filling.
pub fn evaluate_exit(
    position: &Position,
    bar: &Bar,
    bar_index: usize,
    signal: Signal,
    is_last_bar: bool,
    config: &BacktestConfig,
) -> Option<ExitDecision> {
    // 1. Stop-loss. Checked before everything else: broker-side risk
    //    management outranks the strategy's own exit logic.
    if let Some(stop) = position.stop_loss {
        let hit = match position.direction {
            Direction::Long => bar.low <= stop,
            Direction::Short => bar.high >= stop,
        };
        if hit {
            return Some(ExitDecision {
                price: stop,
                reason: ExitReason::StopLoss,
            });
        }
    }

    // 2. Take-profit.
    if let Some(target) = position.take_profit {
        let hit = match position.direction {
            Direction::Long => bar.high >= target,
            Direction::Short => bar.low <= target,
        };
        if hit {
            return Some(ExitDecision {
                price: target,
                reason: ExitReason::TakeProfit,
            });
        }
    }

    // 3. Max holding period.
    if let Some(max_bars) = config.max_holding_bars {
        if bar_index - position.opened_at_bar >= max_bars {
            return Some(ExitDecision {
                price: bar.close,
                reason: ExitReason::MaxHoldingPeriod,
            });
        }
    }

    // 4. Opposing signal, or neutral signal under the flatten policy.
    if signal.opposes(position.direction)
        || (config.flatten_on_neutral && signal == Signal::Flat)
    {
        return Some(ExitDecision {
            price: bar.close,
            reason: ExitReason::SignalReversal,
        });
    }

    // 5. End of data: nothing stays open past the final bar.
    if is_last_bar {
        return Some(ExitDecision {
            price: bar.close,
            reason: ExitReason::EndOfData,
        });
    }

    None
}
