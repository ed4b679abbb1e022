//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: a single timestamped value, `None` during warm-up
//! - `IndicatorType`: indicator identity + parameters, used as a column label
//! - `IndicatorSeries`: a series aligned 1:1 with the input price series
//! - `MovingAverageKind`: selects SMA or EMA for the crossover strategy
//!
//! Every calculation validates its window before touching the data and never
//! fabricates a value for an incomplete look-back window. `change` has a fixed
//! one-bar look-back and no window.

pub mod change;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use change::calculate_change_pct;
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdParams, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::CrossbenchError;
use crate::domain::ohlcv::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    MacdLine { fast: usize, slow: usize },
    MacdSignal { fast: usize, slow: usize, signal: usize },
    MacdHistogram { fast: usize, slow: usize, signal: usize },
    ChangePct,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::MacdLine { fast, slow } => write!(f, "MACD({},{})", fast, slow),
            IndicatorType::MacdSignal { fast, slow, signal } => {
                write!(f, "MACD_SIGNAL({},{},{})", fast, slow, signal)
            }
            IndicatorType::MacdHistogram { fast, slow, signal } => {
                write!(f, "MACD_HIST({},{},{})", fast, slow, signal)
            }
            IndicatorType::ChangePct => write!(f, "CHANGE_PCT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Zip raw per-bar values with the series timestamps.
    pub(crate) fn from_values(
        indicator_type: IndicatorType,
        series: &PriceSeries,
        raw: Vec<Option<f64>>,
    ) -> Self {
        debug_assert_eq!(raw.len(), series.len());
        let values = series
            .bars()
            .iter()
            .zip(raw)
            .map(|(bar, value)| IndicatorPoint {
                timestamp: bar.timestamp,
                value,
            })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|p| p.value.is_some())
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }

    pub fn raw_values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(|p| p.value).collect()
    }
}

/// Which moving average the crossover strategy compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MovingAverageKind {
    #[default]
    Sma,
    Ema,
}

impl FromStr for MovingAverageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma" => Ok(MovingAverageKind::Sma),
            "ema" => Ok(MovingAverageKind::Ema),
            other => Err(format!("unknown moving average '{other}' (expected sma or ema)")),
        }
    }
}

impl fmt::Display for MovingAverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovingAverageKind::Sma => write!(f, "sma"),
            MovingAverageKind::Ema => write!(f, "ema"),
        }
    }
}

pub fn moving_average(
    kind: MovingAverageKind,
    series: &PriceSeries,
    period: usize,
) -> Result<IndicatorSeries, CrossbenchError> {
    match kind {
        MovingAverageKind::Sma => calculate_sma(series, period),
        MovingAverageKind::Ema => calculate_ema(series, period),
    }
}

pub(crate) fn validate_window(name: &str, period: usize) -> Result<(), CrossbenchError> {
    if period < 1 {
        return Err(CrossbenchError::invalid_config(format!(
            "{name} window must be at least 1"
        )));
    }
    Ok(())
}
