//! Signal — per-bar directional instruction produced by a strategy.

use serde::{Deserialize, Serialize};

use super::position::Direction;

/// One entry in the signal column, aligned index-for-index with the bar
/// series. The engine treats the column as opaque input; it never computes
/// indicators itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i8)]
pub enum Signal {
    Short = -1,
    Flat = 0,
    Long = 1,
}

impl Signal {
    /// Convert the raw integer column delivered by the calling layer.
    /// Anything outside {-1, 0, 1} is rejected.
    pub fn from_i8(raw: i8) -> Option<Self> {
        match raw {
            -1 => Some(Signal::Short),
            0 => Some(Signal::Flat),
            1 => Some(Signal::Long),
            _ => None,
        }
    }

    /// The direction this signal asks to enter, if any.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Signal::Long => Some(Direction::Long),
            Signal::Short => Some(Direction::Short),
            Signal::Flat => None,
        }
    }

    /// True if this signal points against an open position's direction.
    pub fn opposes(self, direction: Direction) -> bool {
        self.direction() == Some(direction.opposite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_i8_accepts_valid_range() {
        assert_eq!(Signal::from_i8(-1), Some(Signal::Short));
        assert_eq!(Signal::from_i8(0), Some(Signal::Flat));
        assert_eq!(Signal::from_i8(1), Some(Signal::Long));
        assert_eq!(Signal::from_i8(2), None);
        assert_eq!(Signal::from_i8(-2), None);
    }

    #[test]
    fn opposes_checks_direction() {
        assert!(Signal::Short.opposes(Direction::Long));
        assert!(Signal::Long.opposes(Direction::Short));
        assert!(!Signal::Long.opposes(Direction::Long));
        assert!(!Signal::Flat.opposes(Direction::Long));
        assert!(!Signal::Flat.opposes(Direction::Short));
    }
}
