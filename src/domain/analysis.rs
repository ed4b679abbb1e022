//! End-to-end analysis pipeline.
//!
//! Indicators -> signals -> backtest -> performance comparison, driven by a
//! single validated `AnalysisConfig`. Every stage sees the same price series
//! so all outputs share its timestamps.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::backtest::{run_backtest, BacktestConfig, BacktestResult, DEFAULT_INITIAL_CAPITAL};
use super::config_validation::{read, validate_analysis_config, BACKTEST, INDICATORS, STRATEGY};
use super::error::CrossbenchError;
use super::execution::TradeCost;
use super::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use super::indicator::rsi::DEFAULT_PERIOD as DEFAULT_RSI_PERIOD;
use super::indicator::{
    calculate_change_pct, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
    moving_average, validate_window, IndicatorSeries, MacdParams, MacdSeries, MovingAverageKind,
};
use super::interval::{BarInterval, TRADING_DAYS_PER_YEAR};
use super::metrics::{compare, PerformanceComparison};
use super::ohlcv::PriceSeries;
use super::portfolio::EquityPoint;
use super::signal::{crossovers, generate_signals, Crossover, Signal, SignalPoint};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_FAST_WINDOW: usize = 20;
pub const DEFAULT_SLOW_WINDOW: usize = 50;
pub const DEFAULT_SMA_OVERLAY: usize = 20;
pub const DEFAULT_EMA_OVERLAY: usize = 50;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnalysisConfig {
    pub fast_window: usize,
    pub slow_window: usize,
    pub ma_kind: MovingAverageKind,
    pub rsi_window: usize,
    /// Display-only SMA, independent of the strategy averages.
    pub sma_window: usize,
    /// Display-only EMA, independent of the strategy averages.
    pub ema_window: usize,
    pub macd: MacdParams,
    pub backtest: BacktestConfig,
    /// Overrides the annualisation factor inferred from bar spacing.
    pub periods_per_year: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fast_window: DEFAULT_FAST_WINDOW,
            slow_window: DEFAULT_SLOW_WINDOW,
            ma_kind: MovingAverageKind::default(),
            rsi_window: DEFAULT_RSI_PERIOD,
            sma_window: DEFAULT_SMA_OVERLAY,
            ema_window: DEFAULT_EMA_OVERLAY,
            macd: MacdParams::default(),
            backtest: BacktestConfig::default(),
            periods_per_year: None,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), CrossbenchError> {
        validate_window("fast", self.fast_window)?;
        validate_window("slow", self.slow_window)?;
        if self.slow_window <= self.fast_window {
            return Err(CrossbenchError::invalid_config(format!(
                "slow window ({}) must be greater than fast window ({})",
                self.slow_window, self.fast_window
            )));
        }
        validate_window("RSI", self.rsi_window)?;
        validate_window("SMA overlay", self.sma_window)?;
        validate_window("EMA overlay", self.ema_window)?;
        self.macd.validate()?;
        self.backtest.validate()?;
        if let Some(ppy) = self.periods_per_year {
            if !ppy.is_finite() || ppy <= 0.0 {
                return Err(CrossbenchError::invalid_config(
                    "periods per year must be positive",
                ));
            }
        }
        Ok(())
    }

    /// Build from `[strategy]`, `[indicators]` and `[backtest]`; absent keys
    /// take the defaults.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, CrossbenchError> {
        validate_analysis_config(config)?;

        let cfg = Self {
            fast_window: read(config, STRATEGY, "fast_window")?.unwrap_or(DEFAULT_FAST_WINDOW),
            slow_window: read(config, STRATEGY, "slow_window")?.unwrap_or(DEFAULT_SLOW_WINDOW),
            ma_kind: read(config, STRATEGY, "moving_average")?.unwrap_or_default(),
            rsi_window: read(config, INDICATORS, "rsi_window")?.unwrap_or(DEFAULT_RSI_PERIOD),
            sma_window: read(config, INDICATORS, "sma_window")?.unwrap_or(DEFAULT_SMA_OVERLAY),
            ema_window: read(config, INDICATORS, "ema_window")?.unwrap_or(DEFAULT_EMA_OVERLAY),
            macd: MacdParams {
                fast: read(config, INDICATORS, "macd_fast")?.unwrap_or(DEFAULT_FAST),
                slow: read(config, INDICATORS, "macd_slow")?.unwrap_or(DEFAULT_SLOW),
                signal: read(config, INDICATORS, "macd_signal")?.unwrap_or(DEFAULT_SIGNAL),
            },
            backtest: BacktestConfig {
                initial_capital: read(config, BACKTEST, "initial_capital")?
                    .unwrap_or(DEFAULT_INITIAL_CAPITAL),
                trade_cost: TradeCost {
                    flat: read(config, BACKTEST, "cost_flat")?.unwrap_or(0.0),
                    pct: read(config, BACKTEST, "cost_pct")?.unwrap_or(0.0),
                },
            },
            periods_per_year: read(config, BACKTEST, "periods_per_year")?,
        };
        // Cross-key checks against defaults, e.g. fast_window = 60 with no slow_window.
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Every indicator the analysis computes, aligned with the input series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorSet {
    pub fast: IndicatorSeries,
    pub slow: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub macd: MacdSeries,
    pub sma_overlay: IndicatorSeries,
    pub ema_overlay: IndicatorSeries,
    pub change_pct: IndicatorSeries,
    pub signals: Vec<SignalPoint>,
}

impl IndicatorSet {
    pub fn results_table(&self, series: &PriceSeries) -> ResultsTable {
        ResultsTable::build(series, self, None)
    }
}

pub fn compute_indicators(
    series: &PriceSeries,
    config: &AnalysisConfig,
) -> Result<IndicatorSet, CrossbenchError> {
    config.validate()?;

    let fast = moving_average(config.ma_kind, series, config.fast_window)?;
    let slow = moving_average(config.ma_kind, series, config.slow_window)?;
    let rsi = calculate_rsi(series, config.rsi_window)?;
    let macd = calculate_macd(series, config.macd)?;
    let sma_overlay = calculate_sma(series, config.sma_window)?;
    let ema_overlay = calculate_ema(series, config.ema_window)?;
    let change_pct = calculate_change_pct(series);
    let signals = generate_signals(&fast, &slow)?;

    debug!(
        fast = %fast.indicator_type,
        fast_defined = fast.defined_count(),
        slow = %slow.indicator_type,
        slow_defined = slow.defined_count(),
        rsi_defined = rsi.defined_count(),
        macd_defined = macd.histogram.defined_count(),
        sma_overlay = %sma_overlay.indicator_type,
        ema_overlay = %ema_overlay.indicator_type,
        "indicators computed"
    );
    if slow.defined_count() == 0 && !series.is_empty() {
        warn!(
            bars = series.len(),
            window = config.slow_window,
            "series shorter than slow window, no signals"
        );
    }

    Ok(IndicatorSet {
        fast,
        slow,
        rsi,
        macd,
        sma_overlay,
        ema_overlay,
        change_pct,
        signals,
    })
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnalysisReport {
    pub indicators: IndicatorSet,
    pub crossovers: Vec<Crossover>,
    pub backtest: BacktestResult,
    pub interval: Option<BarInterval>,
    pub periods_per_year: f64,
    pub comparison: PerformanceComparison,
}

impl AnalysisReport {
    pub fn results_table(&self, series: &PriceSeries) -> ResultsTable {
        ResultsTable::build(series, &self.indicators, Some(&self.backtest))
    }
}

pub fn run_analysis(
    series: &PriceSeries,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, CrossbenchError> {
    info!(
        bars = series.len(),
        fast = config.fast_window,
        slow = config.slow_window,
        ma = %config.ma_kind,
        "running analysis"
    );

    let indicators = compute_indicators(series, config)?;
    let events = crossovers(&indicators.signals);
    debug!(crossovers = events.len(), "signals generated");

    let backtest = run_backtest(series, &indicators.signals, &config.backtest)?;

    let interval = BarInterval::infer(&series.timestamps());
    let periods_per_year = config
        .periods_per_year
        .or_else(|| interval.map(|i| i.periods_per_year()))
        .unwrap_or(TRADING_DAYS_PER_YEAR);
    debug!(interval = ?interval, periods_per_year, "annualisation factor");

    let comparison = compare(&backtest, periods_per_year)?;
    if comparison.strategy.sharpe_ratio.is_none() {
        warn!("strategy Sharpe ratio undefined");
    }
    info!(
        trades = backtest.trades.len(),
        strategy_return = comparison.strategy.total_return,
        benchmark_return = comparison.benchmark.total_return,
        "analysis complete"
    );

    Ok(AnalysisReport {
        indicators,
        crossovers: events,
        backtest,
        interval,
        periods_per_year,
        comparison,
    })
}

/// One output row per bar; `None` renders as an empty cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResultRow {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub change_pct: Option<f64>,
    pub sma_overlay: Option<f64>,
    pub ema_overlay: Option<f64>,
    pub signal: Option<Signal>,
    pub strategy_equity: Option<f64>,
    pub benchmark_equity: Option<f64>,
}

impl ResultRow {
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.close.to_string(),
            format_cell(self.fast_ma),
            format_cell(self.slow_ma),
            format_cell(self.rsi),
            format_cell(self.macd_line),
            format_cell(self.macd_signal),
            format_cell(self.macd_histogram),
            format_cell(self.change_pct),
            format_cell(self.sma_overlay),
            format_cell(self.ema_overlay),
            self.signal.map(|s| s.to_string()).unwrap_or_default(),
            format_cell(self.strategy_equity),
            format_cell(self.benchmark_equity),
        ]
    }
}

fn equity_at(curve: &[EquityPoint], index: usize) -> Option<f64> {
    curve.get(index).map(|p| p.equity)
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResultsTable {
    pub headers: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultsTable {
    fn build(
        series: &PriceSeries,
        indicators: &IndicatorSet,
        backtest: Option<&BacktestResult>,
    ) -> Self {
        let headers = vec![
            "timestamp".to_string(),
            "close".to_string(),
            indicators.fast.indicator_type.to_string(),
            indicators.slow.indicator_type.to_string(),
            indicators.rsi.indicator_type.to_string(),
            indicators.macd.line.indicator_type.to_string(),
            indicators.macd.signal.indicator_type.to_string(),
            indicators.macd.histogram.indicator_type.to_string(),
            indicators.change_pct.indicator_type.to_string(),
            format!("overlay_{}", indicators.sma_overlay.indicator_type),
            format!("overlay_{}", indicators.ema_overlay.indicator_type),
            "signal".to_string(),
            "strategy_equity".to_string(),
            "benchmark_equity".to_string(),
        ];

        let rows = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| ResultRow {
                timestamp: bar.timestamp,
                close: bar.close,
                fast_ma: indicators.fast.value_at(i),
                slow_ma: indicators.slow.value_at(i),
                rsi: indicators.rsi.value_at(i),
                macd_line: indicators.macd.line.value_at(i),
                macd_signal: indicators.macd.signal.value_at(i),
                macd_histogram: indicators.macd.histogram.value_at(i),
                change_pct: indicators.change_pct.value_at(i),
                sma_overlay: indicators.sma_overlay.value_at(i),
                ema_overlay: indicators.ema_overlay.value_at(i),
                signal: indicators.signals.get(i).and_then(|p| p.signal),
                strategy_equity: backtest.and_then(|b| equity_at(&b.strategy_equity, i)),
                benchmark_equity: backtest.and_then(|b| equity_at(&b.benchmark_equity, i)),
            })
            .collect();

        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
