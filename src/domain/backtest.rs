//! Backtest simulator.
//!
//! Walks the signal series bar by bar with a FLAT/LONG state machine and
//! produces the strategy equity curve alongside a buy-and-hold benchmark that
//! enters on the first bar with a defined signal.

use tracing::{debug, warn};

use super::error::CrossbenchError;
use super::execution::{enter_long, exit_long, EntryResult, TradeCost};
use super::ohlcv::PriceSeries;
use super::portfolio::{EquityPoint, Portfolio};
use super::position::{ClosedTrade, Position, PositionState};
use super::signal::{Signal, SignalPoint};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub trade_cost: TradeCost,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            trade_cost: TradeCost::default(),
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), CrossbenchError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(CrossbenchError::invalid_config(
                "initial capital must be positive",
            ));
        }
        self.trade_cost.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub strategy_equity: Vec<EquityPoint>,
    pub benchmark_equity: Vec<EquityPoint>,
    pub trades: Vec<ClosedTrade>,
    /// Position still open at the last bar, marked to market but not a trade.
    pub open_position: Option<Position>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.strategy_equity
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }
}

fn ensure_signals_aligned(
    series: &PriceSeries,
    signals: &[SignalPoint],
) -> Result<(), CrossbenchError> {
    if series.len() != signals.len() {
        return Err(CrossbenchError::misaligned(
            "prices",
            "signals",
            format!("length {} vs {}", series.len(), signals.len()),
        ));
    }
    if let Some((i, (bar, point))) = series
        .bars()
        .iter()
        .zip(signals)
        .enumerate()
        .find(|(_, (bar, point))| bar.timestamp != point.timestamp)
    {
        return Err(CrossbenchError::misaligned(
            "prices",
            "signals",
            format!("index {i}: {} vs {}", bar.timestamp, point.timestamp),
        ));
    }
    Ok(())
}

pub fn run_backtest(
    series: &PriceSeries,
    signals: &[SignalPoint],
    config: &BacktestConfig,
) -> Result<BacktestResult, CrossbenchError> {
    config.validate()?;
    ensure_signals_aligned(series, signals)?;

    let cost = &config.trade_cost;
    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut previous = Signal::Flat;

    for (i, (bar, point)) in series.bars().iter().zip(signals).enumerate() {
        let current = point.effective();
        if current != previous {
            match current {
                Signal::Long => match enter_long(&mut portfolio, i, bar.timestamp, bar.close, cost) {
                    EntryResult::Entered { units, fees } => {
                        debug!(index = i, price = bar.close, units, fees, "entered long");
                    }
                    skipped => {
                        warn!(index = i, price = bar.close, reason = ?skipped, "entry skipped");
                    }
                },
                Signal::Flat => {
                    if let Some(trade) = exit_long(&mut portfolio, bar.timestamp, bar.close, cost) {
                        debug!(index = i, price = bar.close, pnl = trade.pnl, "exited long");
                    }
                }
            }
        }
        let equity = portfolio.equity(bar.close);
        portfolio.record_equity(bar.timestamp, equity);
        previous = current;
    }

    let first_valid = signals.iter().position(|p| p.signal.is_some());
    let benchmark_equity = buy_and_hold(series, first_valid, config);

    let open_position = match portfolio.state {
        PositionState::Long(position) => Some(position),
        PositionState::Flat => None,
    };

    Ok(BacktestResult {
        initial_capital: config.initial_capital,
        strategy_equity: portfolio.equity_curve,
        benchmark_equity,
        trades: portfolio.closed_trades,
        open_position,
    })
}

/// Buy at `entry` (if any) and hold to the end; flat at initial capital before.
/// A zero close cannot be bought, so the entry moves to the next positive one.
pub fn buy_and_hold(
    series: &PriceSeries,
    entry: Option<usize>,
    config: &BacktestConfig,
) -> Vec<EquityPoint> {
    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut pending = entry;
    for (i, bar) in series.bars().iter().enumerate() {
        if pending.is_some_and(|start| i >= start) {
            match enter_long(&mut portfolio, i, bar.timestamp, bar.close, &config.trade_cost) {
                EntryResult::Entered { .. } => pending = None,
                EntryResult::ZeroPrice => {
                    debug!(index = i, "benchmark entry deferred past zero close");
                }
                other => {
                    warn!(index = i, reason = ?other, "benchmark entry skipped");
                    pending = None;
                }
            }
        }
        let equity = portfolio.equity(bar.close);
        portfolio.record_equity(bar.timestamp, equity);
    }
    portfolio.equity_curve
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_series;

    fn signals_for(series: &PriceSeries, values: &[Option<Signal>]) -> Vec<SignalPoint> {
        series
            .bars()
            .iter()
            .zip(values)
            .map(|(bar, signal)| SignalPoint {
                timestamp: bar.timestamp,
                signal: *signal,
            })
            .collect()
    }

    fn equities(curve: &[EquityPoint]) -> Vec<f64> {
        curve.iter().map(|p| p.equity).collect()
    }

    const L: Option<Signal> = Some(Signal::Long);
    const F: Option<Signal> = Some(Signal::Flat);

    #[test]
    fn config_validation() {
        assert!(BacktestConfig::default().validate().is_ok());
        let bad = BacktestConfig {
            initial_capital: 0.0,
            ..BacktestConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(CrossbenchError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn always_flat_conserves_capital() {
        let series = make_series(&[10.0, 12.0, 8.0, 15.0]);
        let signals = signals_for(&series, &[None, F, F, F]);
        let result = run_backtest(&series, &signals, &BacktestConfig::default()).unwrap();

        assert_eq!(equities(&result.strategy_equity), vec![10_000.0; 4]);
        assert!(result.trades.is_empty());
        assert!(result.open_position.is_none());
        assert_eq!(result.final_equity(), 10_000.0);
    }

    #[test]
    fn enters_at_close_and_marks_to_market() {
        let series = make_series(&[10.0, 10.0, 20.0, 25.0]);
        let signals = signals_for(&series, &[None, F, L, L]);
        let result = run_backtest(&series, &signals, &BacktestConfig::default()).unwrap();

        assert_eq!(
            equities(&result.strategy_equity),
            vec![10_000.0, 10_000.0, 10_000.0, 12_500.0]
        );
        let open = result.open_position.unwrap();
        assert_eq!(open.entry_index, 2);
        assert_eq!(open.entry_price, 20.0);
        assert!(result.trades.is_empty());
    }

    #[test]
    fn exit_completes_trade_and_carries_cash() {
        let series = make_series(&[10.0, 10.0, 20.0, 30.0, 15.0]);
        let signals = signals_for(&series, &[F, L, L, F, F]);
        let result = run_backtest(&series, &signals, &BacktestConfig::default()).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_price, 10.0);
        assert_eq!(trade.exit_price, 30.0);
        assert!((trade.pnl - 20_000.0).abs() < 1e-9);
        assert_eq!(
            equities(&result.strategy_equity),
            vec![10_000.0, 10_000.0, 20_000.0, 30_000.0, 30_000.0]
        );
        assert!(result.open_position.is_none());
    }

    #[test]
    fn unchanged_signal_opens_no_new_trade() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let signals = signals_for(&series, &[L, L, L, F, F, F]);
        let result = run_backtest(&series, &signals, &BacktestConfig::default()).unwrap();
        assert_eq!(result.trades.len(), 1);
    }

    #[test]
    fn costs_charged_at_entry_and_exit() {
        let series = make_series(&[10.0, 10.0, 10.0]);
        let signals = signals_for(&series, &[L, L, F]);
        let config = BacktestConfig {
            initial_capital: 1_000.0,
            trade_cost: TradeCost { flat: 5.0, pct: 0.0 },
        };
        let result = run_backtest(&series, &signals, &config).unwrap();

        let curve = equities(&result.strategy_equity);
        assert!((curve[0] - 995.0).abs() < 1e-9);
        assert!((curve[2] - 990.0).abs() < 1e-9);
        assert!((result.trades[0].fees - 10.0).abs() < 1e-9);
    }

    #[test]
    fn benchmark_enters_on_first_defined_signal() {
        let series = make_series(&[10.0, 20.0, 40.0]);
        let signals = signals_for(&series, &[None, F, F]);
        let result = run_backtest(&series, &signals, &BacktestConfig::default()).unwrap();

        assert_eq!(
            equities(&result.benchmark_equity),
            vec![10_000.0, 10_000.0, 20_000.0]
        );
    }

    #[test]
    fn benchmark_entry_waits_for_positive_close() {
        let series = make_series(&[10.0, 0.0, 5.0, 10.0]);
        let signals = signals_for(&series, &[None, F, F, F]);
        let result = run_backtest(&series, &signals, &BacktestConfig::default()).unwrap();

        assert_eq!(
            equities(&result.benchmark_equity),
            vec![10_000.0, 10_000.0, 10_000.0, 20_000.0]
        );
        assert_eq!(equities(&result.strategy_equity), vec![10_000.0; 4]);
    }

    #[test]
    fn benchmark_stays_flat_without_signals() {
        let series = make_series(&[10.0, 20.0, 40.0]);
        let signals = signals_for(&series, &[None, None, None]);
        let result = run_backtest(&series, &signals, &BacktestConfig::default()).unwrap();

        assert_eq!(equities(&result.benchmark_equity), vec![10_000.0; 3]);
        assert_eq!(equities(&result.strategy_equity), vec![10_000.0; 3]);
    }

    #[test]
    fn misaligned_signals_rejected() {
        let series = make_series(&[10.0, 20.0, 40.0]);
        let signals = signals_for(&series, &[None, None, None]);
        let err = run_backtest(&series, &signals[..2], &BacktestConfig::default()).unwrap_err();
        assert!(matches!(err, CrossbenchError::MisalignedSeries { .. }));
    }

    #[test]
    fn empty_series_yields_empty_curves() {
        let series = make_series(&[]);
        let result = run_backtest(&series, &[], &BacktestConfig::default()).unwrap();
        assert!(result.strategy_equity.is_empty());
        assert!(result.benchmark_equity.is_empty());
        assert_eq!(result.final_equity(), DEFAULT_INITIAL_CAPITAL);
    }
}
