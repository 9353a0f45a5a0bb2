//! The metrics layer consumes the engine's output contract end-to-end.

use chrono::{Duration, TimeZone, Utc};
use klinelab_core::domain::{Bar, Signal};
use klinelab_core::strategy::{MaCrossover, Strategy};
use klinelab_core::{run_backtest, BacktestConfig};
use klinelab_metrics::{PerformanceMetrics, PERIODS_PER_YEAR_HOURLY};

fn make_bars(n: usize) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.2).sin() * 12.0;
            Bar {
                timestamp: base + Duration::hours(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10_000.0,
            }
        })
        .collect()
}

#[test]
fn metrics_from_a_live_run() {
    let bars = make_bars(500);
    let signals = MaCrossover::new(5, 20).signals(&bars);
    let config = BacktestConfig {
        initial_capital: 10_000.0,
        stop_loss_pct: Some(0.05),
        ..Default::default()
    };

    let result = run_backtest(&bars, &signals, &config).unwrap();
    assert!(!result.trades.is_empty());

    let metrics = PerformanceMetrics::from_result(&result, PERIODS_PER_YEAR_HOURLY);

    assert_eq!(metrics.trade_count, result.trades.len());
    let expected_return = (result.final_capital - config.initial_capital) / config.initial_capital;
    assert!((metrics.total_return - expected_return).abs() < 1e-9);
    assert!(metrics.max_drawdown <= 0.0);
    assert!((0.0..=1.0).contains(&metrics.win_rate));

    let counts = metrics.exit_reasons;
    let total = counts.stop_loss
        + counts.take_profit
        + counts.signal_reversal
        + counts.end_of_data
        + counts.max_holding_period;
    assert_eq!(total, metrics.trade_count);
}

#[test]
fn all_flat_run_yields_empty_metrics() {
    let bars = make_bars(50);
    let signals = vec![Signal::Flat; 50];
    let result = run_backtest(&bars, &signals, &BacktestConfig::default()).unwrap();

    let metrics = PerformanceMetrics::from_result(&result, PERIODS_PER_YEAR_HOURLY);
    assert_eq!(metrics.trade_count, 0);
    assert_eq!(metrics.total_return, 0.0);
    assert_eq!(metrics.max_drawdown, 0.0);
}
