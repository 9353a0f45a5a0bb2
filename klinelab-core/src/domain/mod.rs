//! Domain types for KlineLab.

pub mod bar;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::Bar;
pub use position::{Direction, Position};
pub use signal::Signal;
pub use trade::{EquityPoint, ExitReason, Trade};
