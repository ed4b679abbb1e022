//! Per-bar percentage change of the close.
//!
//! CHANGE[i] = (C[i] / C[i-1] - 1) * 100, undefined at the first bar and
//! after a zero close.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

pub fn calculate_change_pct(series: &PriceSeries) -> IndicatorSeries {
    let closes = series.closes();
    let mut raw = Vec::with_capacity(closes.len());
    if !closes.is_empty() {
        raw.push(None);
    }
    raw.extend(closes.windows(2).map(|pair| {
        if pair[0] > 0.0 {
            Some((pair[1] / pair[0] - 1.0) * 100.0)
        } else {
            None
        }
    }));
    IndicatorSeries::from_values(IndicatorType::ChangePct, series, raw)
}
