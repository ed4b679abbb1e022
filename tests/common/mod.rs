#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use crossbench::domain::analysis::AnalysisConfig;
use crossbench::domain::error::CrossbenchError;
pub use crossbench::domain::ohlcv::{PriceBar, PriceSeries};
use crossbench::ports::data_port::DataPort;

/// Serves a fixed series, applying the date bounds like the CSV adapter.
pub struct MockDataPort {
    pub bars: Vec<PriceBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn with_error(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, CrossbenchError> {
        if let Some(reason) = &self.error {
            return Err(CrossbenchError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self
            .bars
            .iter()
            .filter(|b| start.is_none_or(|s| b.timestamp.date() >= s))
            .filter(|b| end.is_none_or(|e| b.timestamp.date() <= e))
            .cloned()
            .collect();
        PriceSeries::from_unsorted(bars)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn start_time() -> NaiveDateTime {
    date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap()
}

pub fn make_bar(timestamp: NaiveDateTime, close: f64) -> PriceBar {
    PriceBar {
        timestamp,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000.0,
    }
}

/// Daily bars starting 2024-01-01.
pub fn daily_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start_time() + Duration::days(i as i64), c))
        .collect()
}

pub fn daily_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(daily_bars(closes)).unwrap()
}

/// 50 bars: flat at 100 through bar 19, +2 per bar to 122 at bar 30, then -3
/// per bar. With fast 5 / slow 20 SMAs the first signal is FLAT at bar 19,
/// the bullish cross is at bar 20 (close 102) and the bearish cross at bar
/// 36 (close 104).
pub fn crossover_closes() -> Vec<f64> {
    (0..50)
        .map(|i| {
            if i < 20 {
                100.0
            } else if i <= 30 {
                100.0 + (i as f64 - 19.0) * 2.0
            } else {
                122.0 - (i as f64 - 30.0) * 3.0
            }
        })
        .collect()
}

pub fn crossover_config() -> AnalysisConfig {
    AnalysisConfig {
        fast_window: 5,
        slow_window: 20,
        ..AnalysisConfig::default()
    }
}

pub fn price_csv(bars: &[PriceBar]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
