//! Property tests over random price paths.

mod common;

use common::*;
use crossbench::domain::backtest::{run_backtest, BacktestConfig};
use crossbench::domain::execution::TradeCost;
use crossbench::domain::indicator::{calculate_ema, calculate_rsi, calculate_sma, IndicatorSeries};
use crossbench::domain::metrics::compare;
use crossbench::domain::signal::{crossovers, generate_signals, Signal, SignalPoint};
use proptest::prelude::*;

fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1_000.0, 0..120)
}

fn assert_warm_up(series: &IndicatorSeries, undefined: usize) {
    for (i, point) in series.values.iter().enumerate() {
        assert_eq!(point.value.is_none(), i < undefined, "index {i}");
    }
}

proptest! {
    #[test]
    fn prop_sma_length_and_warm_up(closes in closes_strategy(), n in 1usize..40) {
        let series = daily_series(&closes);
        let sma = calculate_sma(&series, n).unwrap();
        prop_assert_eq!(sma.len(), closes.len());
        let undefined = if n > closes.len() { closes.len() } else { n - 1 };
        assert_warm_up(&sma, undefined);
    }

    #[test]
    fn prop_ema_follows_recurrence(closes in closes_strategy(), n in 1usize..40) {
        let series = daily_series(&closes);
        let ema = calculate_ema(&series, n).unwrap();
        prop_assert_eq!(ema.len(), closes.len());
        if n <= closes.len() {
            let seed = closes[..n].iter().sum::<f64>() / n as f64;
            let seeded = ema.value_at(n - 1).unwrap();
            prop_assert!((seeded - seed).abs() <= 1e-9 * seed.abs().max(1.0));

            let k = 2.0 / (n as f64 + 1.0);
            for i in n..closes.len() {
                let prev = ema.value_at(i - 1).unwrap();
                let expected = prev + k * (closes[i] - prev);
                let actual = ema.value_at(i).unwrap();
                prop_assert!((actual - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            }
        }
    }

    #[test]
    fn prop_rsi_bounded(closes in closes_strategy(), n in 1usize..30) {
        let series = daily_series(&closes);
        let rsi = calculate_rsi(&series, n).unwrap();
        prop_assert_eq!(rsi.len(), closes.len());
        for value in rsi.values.iter().filter_map(|p| p.value) {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn prop_rsi_is_100_without_losses(start in 1.0f64..100.0, steps in prop::collection::vec(0.0f64..5.0, 2..60), n in 1usize..20) {
        let closes: Vec<f64> = steps
            .iter()
            .scan(start, |price, step| {
                *price += step;
                Some(*price)
            })
            .collect();
        let series = daily_series(&closes);
        let rsi = calculate_rsi(&series, n).unwrap();
        for value in rsi.values.iter().filter_map(|p| p.value) {
            prop_assert_eq!(value, 100.0);
        }
    }

    #[test]
    fn prop_constant_ordering_single_transition(closes in closes_strategy(), fast in 1usize..10, gap in 1usize..10) {
        let series = daily_series(&closes);
        let slow = fast + gap;
        let fast_ma = calculate_sma(&series, fast).unwrap();
        let slow_ma = calculate_sma(&series, slow).unwrap();

        // shift the fast average above the slow one wherever both exist
        let mut lifted = fast_ma.clone();
        for (point, slow_point) in lifted.values.iter_mut().zip(&slow_ma.values) {
            if let (Some(f), Some(s)) = (point.value, slow_point.value) {
                point.value = Some(f.max(s) + 1.0);
            }
        }
        let signals = generate_signals(&lifted, &slow_ma).unwrap();
        let events = crossovers(&signals);
        let expected = usize::from(slow <= closes.len());
        prop_assert_eq!(events.len(), expected);
    }

    #[test]
    fn prop_always_flat_conserves_capital(closes in closes_strategy(), capital in 1.0f64..1e6) {
        let series = daily_series(&closes);
        let signals: Vec<SignalPoint> = series
            .bars()
            .iter()
            .map(|b| SignalPoint { timestamp: b.timestamp, signal: Some(Signal::Flat) })
            .collect();
        let config = BacktestConfig {
            initial_capital: capital,
            trade_cost: TradeCost { flat: 1.0, pct: 0.5 },
        };
        let result = run_backtest(&series, &signals, &config).unwrap();
        prop_assert!(result.strategy_equity.iter().all(|p| p.equity == capital));
        prop_assert!(result.trades.is_empty());
    }

    #[test]
    fn prop_backtest_outputs_aligned_and_bounded(
        closes in closes_strategy(),
        fast in 1usize..10,
        gap in 1usize..20,
        flat in 0.0f64..20.0,
        pct in 0.0f64..2.0,
    ) {
        let series = daily_series(&closes);
        let fast_ma = calculate_sma(&series, fast).unwrap();
        let slow_ma = calculate_sma(&series, fast + gap).unwrap();
        let signals = generate_signals(&fast_ma, &slow_ma).unwrap();
        let config = BacktestConfig {
            initial_capital: 10_000.0,
            trade_cost: TradeCost { flat, pct },
        };
        let result = run_backtest(&series, &signals, &config).unwrap();

        prop_assert_eq!(result.strategy_equity.len(), closes.len());
        prop_assert_eq!(result.benchmark_equity.len(), closes.len());
        for (point, bar) in result.strategy_equity.iter().zip(series.bars()) {
            prop_assert_eq!(point.timestamp, bar.timestamp);
            prop_assert!(point.equity >= 0.0);
        }

        let comparison = compare(&result, 252.0).unwrap();
        for summary in [&comparison.strategy, &comparison.benchmark] {
            prop_assert!((-1.0..=0.0).contains(&summary.max_drawdown));
            if let Some(rate) = summary.win_rate {
                prop_assert!((0.0..=1.0).contains(&rate));
            }
        }
    }
}
