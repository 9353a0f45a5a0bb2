//! Open position state, owned exclusively by the engine while it lives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// Side of an open position or completed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }

    /// Sign multiplier for PnL arithmetic: +1 long, -1 short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// An open position.
///
/// Created when an entry signal fires while flat, mutated every bar it stays
/// open (excursion tracking), consumed exactly once into a
/// [`Trade`](super::trade::Trade). At most one exists at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub direction: Direction,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub quantity: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub opened_at_bar: usize,
    /// Best price reached while open (highest for long, lowest for short).
    pub best_price: f64,
    /// Worst price reached while open.
    pub worst_price: f64,
}

impl Position {
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        direction: Direction,
        entry_time: DateTime<Utc>,
        entry_price: f64,
        quantity: f64,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
        opened_at_bar: usize,
    ) -> Self {
        Self {
            direction,
            entry_time,
            entry_price,
            quantity,
            stop_loss,
            take_profit,
            opened_at_bar,
            best_price: entry_price,
            worst_price: entry_price,
        }
    }

    /// Fold this bar's high/low into the running excursion extremes.
    pub fn update_excursion(&mut self, bar: &Bar) {
        match self.direction {
            Direction::Long => {
                if bar.high > self.best_price {
                    self.best_price = bar.high;
                }
                if bar.low < self.worst_price {
                    self.worst_price = bar.low;
                }
            }
            Direction::Short => {
                if bar.low < self.best_price {
                    self.best_price = bar.low;
                }
                if bar.high > self.worst_price {
                    self.worst_price = bar.high;
                }
            }
        }
    }

    /// Unrealized PnL marked at `price`, before commission.
    pub fn unrealized_pnl(&self, price: f64, leverage: u32) -> f64 {
        self.direction.sign() * (price - self.entry_price) * self.quantity * leverage as f64
    }

    /// Maximum favorable excursion in account currency (>= 0).
    pub fn mfe(&self, leverage: u32) -> f64 {
        self.unrealized_pnl(self.best_price, leverage)
    }

    /// Maximum adverse excursion in account currency (<= 0).
    pub fn mae(&self, leverage: u32) -> f64 {
        self.unrealized_pnl(self.worst_price, leverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(high: f64, low: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            open: (high + low) / 2.0,
            high,
            low,
            close: (high + low) / 2.0,
            volume: 1_000.0,
        }
    }

    fn long_position() -> Position {
        Position::open(
            Direction::Long,
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            100.0,
            2.0,
            None,
            None,
            0,
        )
    }

    #[test]
    fn excursion_starts_at_entry() {
        let pos = long_position();
        assert_eq!(pos.best_price, 100.0);
        assert_eq!(pos.worst_price, 100.0);
        assert_eq!(pos.mfe(1), 0.0);
        assert_eq!(pos.mae(1), 0.0);
    }

    #[test]
    fn long_excursion_tracks_high_and_low() {
        let mut pos = long_position();
        pos.update_excursion(&bar(110.0, 95.0));
        pos.update_excursion(&bar(105.0, 98.0)); // inside previous range
        assert_eq!(pos.best_price, 110.0);
        assert_eq!(pos.worst_price, 95.0);
        assert_eq!(pos.mfe(1), 20.0); // (110 - 100) * 2
        assert_eq!(pos.mae(1), -10.0); // (95 - 100) * 2
    }

    #[test]
    fn short_excursion_is_mirrored() {
        let mut pos = long_position();
        pos.direction = Direction::Short;
        pos.update_excursion(&bar(110.0, 95.0));
        assert_eq!(pos.best_price, 95.0);
        assert_eq!(pos.worst_price, 110.0);
        assert_eq!(pos.mfe(1), 10.0); // (100 - 95) * 2
        assert_eq!(pos.mae(1), -20.0);
    }

    #[test]
    fn leverage_scales_unrealized_pnl() {
        let pos = long_position();
        assert_eq!(pos.unrealized_pnl(105.0, 1), 10.0);
        assert_eq!(pos.unrealized_pnl(105.0, 10), 100.0);
    }
}
