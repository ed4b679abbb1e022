//! CSV file price data adapter.
//!
//! Expects a header row followed by `timestamp,open,high,low,close,volume`.
//! Rows may arrive in any order; the series is sorted before validation.

use crate::domain::error::CrossbenchError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::path::PathBuf;
use tracing::debug;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Accepts a bare date (midnight) or a date with time.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, CrossbenchError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| CrossbenchError::Data {
            reason: format!("invalid timestamp '{}'", value),
        })
}

fn parse_field(record: &StringRecord, index: usize, name: &str, line: u64) -> Result<f64, CrossbenchError> {
    record
        .get(index)
        .ok_or_else(|| CrossbenchError::Data {
            reason: format!("line {}: missing {} column", line, name),
        })?
        .trim()
        .parse()
        .map_err(|e| CrossbenchError::Data {
            reason: format!("line {}: invalid {} value: {}", line, name, e),
        })
}

fn parse_record(record: &StringRecord) -> Result<PriceBar, CrossbenchError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    let timestamp = record.get(0).ok_or_else(|| CrossbenchError::Data {
        reason: format!("line {}: missing timestamp column", line),
    })?;

    Ok(PriceBar {
        timestamp: parse_timestamp(timestamp)?,
        open: parse_field(record, 1, "open", line)?,
        high: parse_field(record, 2, "high", line)?,
        low: parse_field(record, 3, "low", line)?,
        close: parse_field(record, 4, "close", line)?,
        volume: parse_field(record, 5, "volume", line)?,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, CrossbenchError> {
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| CrossbenchError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| CrossbenchError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let bar = parse_record(&record)?;

            let date = bar.timestamp.date();
            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }
            bars.push(bar);
        }

        debug!(path = %self.path.display(), bars = bars.len(), "loaded price data");
        PriceSeries::from_unsorted(bars)
    }
}
