//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the defined part of the MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: the line is defined from slow - 1, signal and histogram from
//! slow - 1 + signal - 1.

use crate::domain::error::CrossbenchError;
use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{validate_window, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            signal: DEFAULT_SIGNAL,
        }
    }
}

impl MacdParams {
    pub fn validate(&self) -> Result<(), CrossbenchError> {
        validate_window("MACD fast", self.fast)?;
        validate_window("MACD slow", self.slow)?;
        validate_window("MACD signal", self.signal)?;
        if self.fast >= self.slow {
            return Err(CrossbenchError::invalid_config(format!(
                "MACD fast window ({}) must be shorter than slow window ({})",
                self.fast, self.slow
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MacdSeries {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn calculate_macd(series: &PriceSeries, params: MacdParams) -> Result<MacdSeries, CrossbenchError> {
    params.validate()?;
    let MacdParams { fast, slow, signal } = params;

    let closes = series.closes();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let mut signal_line = vec![None; line.len()];
    if let Some(start) = line.iter().position(Option::is_some) {
        let defined: Vec<f64> = line[start..].iter().flatten().copied().collect();
        for (offset, value) in ema_values(&defined, signal).into_iter().enumerate() {
            signal_line[start + offset] = value;
        }
    }

    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    Ok(MacdSeries {
        line: IndicatorSeries::from_values(IndicatorType::MacdLine { fast, slow }, series, line),
        signal: IndicatorSeries::from_values(
            IndicatorType::MacdSignal { fast, slow, signal },
            series,
            signal_line,
        ),
        histogram: IndicatorSeries::from_values(
            IndicatorType::MacdHistogram { fast, slow, signal },
            series,
            histogram,
        ),
    })
}
