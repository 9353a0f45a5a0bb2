//! Trade — a completed round-trip record, and the equity curve point type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::Direction;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    /// Opposing signal, or a neutral signal under the flatten-on-neutral
    /// policy.
    SignalReversal,
    EndOfData,
    MaxHoldingPeriod,
}

/// A complete round-trip trade: entry, exit, costs, excursion.
///
/// Appended to the ledger in exit order; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub direction: Direction,

    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,

    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,

    pub quantity: f64,

    pub gross_pnl: f64,
    pub commission: f64,
    pub net_pnl: f64,
    /// Net return as a percentage of allocated capital (entry notional),
    /// not of leveraged exposure.
    pub net_pnl_pct: f64,

    /// Maximum favorable excursion in account currency (>= 0).
    pub mfe: f64,
    /// Maximum adverse excursion in account currency (<= 0).
    pub mae: f64,

    pub bars_held: usize,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}

/// One mark-to-market equity observation: realized capital plus unrealized
/// PnL of any open position at the bar close. The curve carries exactly one
/// point per bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade() -> Trade {
        Trade {
            direction: Direction::Long,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            entry_price: 100.0,
            exit_time: Utc.with_ymd_and_hms(2024, 1, 2, 4, 0, 0).unwrap(),
            exit_price: 110.0,
            quantity: 1.0,
            gross_pnl: 10.0,
            commission: 0.147,
            net_pnl: 9.853,
            net_pnl_pct: 9.853,
            mfe: 11.0,
            mae: -2.0,
            bars_held: 4,
            exit_reason: ExitReason::TakeProfit,
        }
    }

    #[test]
    fn is_winner() {
        assert!(sample_trade().is_winner());
        let mut loser = sample_trade();
        loser.net_pnl = -1.0;
        assert!(!loser.is_winner());
    }

    #[test]
    fn exit_reason_serializes_snake_case() {
        let json = serde_json::to_string(&ExitReason::StopLoss).unwrap();
        assert_eq!(json, "\"stop_loss\"");
        let json = serde_json::to_string(&ExitReason::MaxHoldingPeriod).unwrap();
        assert_eq!(json, "\"max_holding_period\"");
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
