//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are undefined (need n price changes to seed).

use crate::domain::error::CrossbenchError;
use crate::domain::indicator::{validate_window, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(series: &PriceSeries, period: usize) -> Result<IndicatorSeries, CrossbenchError> {
    validate_window("RSI", period)?;
    let raw = rsi_values(&series.closes(), period);
    Ok(IndicatorSeries::from_values(
        IndicatorType::Rsi(period),
        series,
        raw,
    ))
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

fn rsi_values(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || period >= closes.len() {
        return out;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    // change index j lands on bar j + 1
    for j in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[j]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[j]) / period as f64;
        out[j + 1] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}
