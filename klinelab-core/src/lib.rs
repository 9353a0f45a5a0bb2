//! KlineLab Core — deterministic bar-by-bar backtest engine for Bybit kline
//! data, targeting parity with TradingView's strategy tester.
//!
//! This crate is the heart of the backtester:
//! - Domain types (bars, signals, positions, trades, equity curve)
//! - Cost model (commission, slippage, PnL, lot-step position sizing)
//! - Exit evaluator (stop-loss, take-profit, holding limit, signal exits)
//! - The single-position bar loop ([`engine::run_backtest`])
//! - The strategy seam ([`strategy::Strategy`])
//!
//! The engine is pure computation: no I/O, no clock, no randomness. Fatal
//! input problems fail fast as [`EngineError`]; data-quality problems
//! encountered mid-run become [`Warning`]s in the result and the run
//! continues on a deterministic fallback.

pub mod config;
pub mod costs;
pub mod domain;
pub mod engine;
pub mod error;
pub mod exit;
pub mod strategy;

pub use config::BacktestConfig;
pub use engine::{run_backtest, BacktestResult};
pub use error::{EngineError, Warning};
