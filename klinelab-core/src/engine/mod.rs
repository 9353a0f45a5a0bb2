//! Backtesting engine — the bar loop and its output contract.
//!
//! Each bar runs four steps:
//!
//! 1. Data-quality gate (malformed bars get equity carry-forward only)
//! 2. Exit handling for an open position (excursion update, exit evaluator)
//! 3. Entry handling while flat (sizing, bracket levels, same-bar reversal)
//! 4. End-of-bar mark-to-market equity point

pub mod loop_runner;
pub mod result;

pub use loop_runner::run_backtest;
pub use result::BacktestResult;
