//! Performance metrics and statistics.
//!
//! Strategy and benchmark curves go through the same `summarize` so their
//! numbers are directly comparable. Statistics that cannot be computed
//! (no trades, flat returns) are `None` rather than 0 or infinity.

use tracing::debug;

use super::backtest::BacktestResult;
use super::error::CrossbenchError;
use super::portfolio::EquityPoint;
use super::position::ClosedTrade;

/// Standard deviations at or below this are treated as zero variance.
const ZERO_VARIANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub annualized_return: Option<f64>,
    /// Non-positive fraction: -0.25 is a 25% peak-to-trough decline.
    pub max_drawdown: f64,
    pub sharpe_ratio: Option<f64>,
    pub win_rate: Option<f64>,
    pub trade_count: usize,
}

impl PerformanceSummary {
    pub fn summarize(
        equity_curve: &[EquityPoint],
        trades: &[ClosedTrade],
        initial_capital: f64,
        periods_per_year: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            final_equity / initial_capital - 1.0
        } else {
            0.0
        };

        let returns = period_returns(equity_curve);
        let annualized_return = annualize(total_return, returns.len(), periods_per_year);

        Self {
            total_return,
            annualized_return,
            max_drawdown: compute_drawdown(equity_curve),
            sharpe_ratio: compute_sharpe(&returns, periods_per_year),
            win_rate: compute_win_rate(trades),
            trade_count: trades.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PerformanceComparison {
    pub strategy: PerformanceSummary,
    pub benchmark: PerformanceSummary,
}

impl PerformanceComparison {
    /// Strategy minus benchmark total return.
    pub fn excess_return(&self) -> f64 {
        self.strategy.total_return - self.benchmark.total_return
    }
}

/// Summarise strategy and benchmark curves of one backtest.
pub fn compare(
    result: &BacktestResult,
    periods_per_year: f64,
) -> Result<PerformanceComparison, CrossbenchError> {
    if !result.initial_capital.is_finite() || result.initial_capital <= 0.0 {
        return Err(CrossbenchError::invalid_config(
            "initial capital must be positive",
        ));
    }
    if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
        return Err(CrossbenchError::invalid_config(
            "periods per year must be positive",
        ));
    }
    ensure_curves_aligned(&result.strategy_equity, &result.benchmark_equity)?;

    let strategy = PerformanceSummary::summarize(
        &result.strategy_equity,
        &result.trades,
        result.initial_capital,
        periods_per_year,
    );
    let benchmark = PerformanceSummary::summarize(
        &result.benchmark_equity,
        &[],
        result.initial_capital,
        periods_per_year,
    );
    debug!(
        strategy_return = strategy.total_return,
        benchmark_return = benchmark.total_return,
        "performance summarised"
    );
    Ok(PerformanceComparison {
        strategy,
        benchmark,
    })
}

fn ensure_curves_aligned(
    strategy: &[EquityPoint],
    benchmark: &[EquityPoint],
) -> Result<(), CrossbenchError> {
    if strategy.len() != benchmark.len() {
        return Err(CrossbenchError::misaligned(
            "strategy equity",
            "benchmark equity",
            format!("length {} vs {}", strategy.len(), benchmark.len()),
        ));
    }
    if let Some((i, (s, b))) = strategy
        .iter()
        .zip(benchmark)
        .enumerate()
        .find(|(_, (s, b))| s.timestamp != b.timestamp)
    {
        return Err(CrossbenchError::misaligned(
            "strategy equity",
            "benchmark equity",
            format!("index {i}: {} vs {}", s.timestamp, b.timestamp),
        ));
    }
    Ok(())
}

pub fn period_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect()
}

/// Minimum of equity / running peak - 1, within [-1, 0].
pub fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        peak = peak.max(point.equity);
        if peak > 0.0 {
            let dd = point.equity / peak - 1.0;
            max_dd = max_dd.min(dd);
        }
    }

    max_dd.clamp(-1.0, 0.0)
}

/// mean / sample stdev * sqrt(periods per year).
pub fn compute_sharpe(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if !stddev.is_finite() || stddev <= ZERO_VARIANCE {
        return None;
    }
    Some(mean / stddev * periods_per_year.sqrt())
}

pub fn compute_win_rate(trades: &[ClosedTrade]) -> Option<f64> {
    if trades.is_empty() {
        return None;
    }
    let wins = trades.iter().filter(|t| t.is_win()).count();
    Some(wins as f64 / trades.len() as f64)
}

fn annualize(total_return: f64, periods: usize, periods_per_year: f64) -> Option<f64> {
    let years = periods as f64 / periods_per_year;
    let growth = 1.0 + total_return;
    if years > 0.0 && growth > 0.0 && growth.is_finite() {
        Some(growth.powf(1.0 / years) - 1.0)
    } else {
        None
    }
}
