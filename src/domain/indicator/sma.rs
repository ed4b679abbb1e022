//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(C[i-n+1..=i]).
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::CrossbenchError;
use crate::domain::indicator::{validate_window, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

pub fn calculate_sma(series: &PriceSeries, period: usize) -> Result<IndicatorSeries, CrossbenchError> {
    validate_window("SMA", period)?;
    let raw = sma_values(&series.closes(), period);
    Ok(IndicatorSeries::from_values(
        IndicatorType::Sma(period),
        series,
        raw,
    ))
}

/// A window longer than the input leaves every entry undefined; a window of
/// exactly the input length defines the last entry only.
pub(crate) fn sma_values(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || period > values.len() {
        return out;
    }
    for (offset, window) in values.windows(period).enumerate() {
        out[offset + period - 1] = Some(window.iter().sum::<f64>() / period as f64);
    }
    out
}
