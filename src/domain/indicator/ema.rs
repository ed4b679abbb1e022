//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::CrossbenchError;
use crate::domain::indicator::{validate_window, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

pub fn calculate_ema(series: &PriceSeries, period: usize) -> Result<IndicatorSeries, CrossbenchError> {
    validate_window("EMA", period)?;
    let raw = ema_values(&series.closes(), period);
    Ok(IndicatorSeries::from_values(
        IndicatorType::Ema(period),
        series,
        raw,
    ))
}

pub(crate) fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Single forward pass; a window longer than the input leaves every entry
/// undefined.
pub(crate) fn ema_values(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if period == 0 || period > values.len() {
        out.resize(values.len(), None);
        return out;
    }

    let k = smoothing_factor(period);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        if i < period - 1 {
            sum += value;
            out.push(None);
        } else if i == period - 1 {
            sum += value;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = value * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }
    out
}
