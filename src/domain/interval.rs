//! Bar interval inference and Sharpe annualisation factors.
//!
//! The interval is read off the median spacing between consecutive
//! timestamps, so weekend and holiday gaps in daily data do not skew it.

use chrono::{Duration, NaiveDateTime};
use std::fmt;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const WEEKS_PER_YEAR: f64 = 52.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;
/// Regular session length of a US equity trading day.
pub const TRADING_MINUTES_PER_DAY: f64 = 390.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BarInterval {
    Minutes(u32),
    Daily,
    Weekly,
    Monthly,
}

impl BarInterval {
    /// Infer the interval from timestamps. `None` with fewer than two.
    pub fn infer(timestamps: &[NaiveDateTime]) -> Option<Self> {
        let mut gaps: Vec<Duration> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
        if gaps.is_empty() {
            return None;
        }
        gaps.sort();
        let median = gaps[gaps.len() / 2];
        Some(Self::from_spacing(median))
    }

    pub fn from_spacing(spacing: Duration) -> Self {
        if spacing >= Duration::days(28) {
            BarInterval::Monthly
        } else if spacing >= Duration::days(5) {
            BarInterval::Weekly
        } else if spacing >= Duration::hours(20) {
            BarInterval::Daily
        } else {
            let minutes = spacing.num_minutes().clamp(1, u32::MAX as i64) as u32;
            BarInterval::Minutes(minutes)
        }
    }

    pub fn periods_per_year(&self) -> f64 {
        match self {
            BarInterval::Minutes(m) => {
                let bars_per_day = (TRADING_MINUTES_PER_DAY / *m as f64).ceil().max(1.0);
                TRADING_DAYS_PER_YEAR * bars_per_day
            }
            BarInterval::Daily => TRADING_DAYS_PER_YEAR,
            BarInterval::Weekly => WEEKS_PER_YEAR,
            BarInterval::Monthly => MONTHS_PER_YEAR,
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarInterval::Minutes(m) => write!(f, "{}m", m),
            BarInterval::Daily => write!(f, "1d"),
            BarInterval::Weekly => write!(f, "1wk"),
            BarInterval::Monthly => write!(f, "1mo"),
        }
    }
}
