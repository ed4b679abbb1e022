//! OHLCV bar representation and the validated price series.

use chrono::NaiveDateTime;

use crate::domain::error::CrossbenchError;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    fn check(&self) -> Result<(), CrossbenchError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CrossbenchError::InvalidSeries {
                    reason: format!("{name} at {} is {value}", self.timestamp),
                });
            }
        }
        Ok(())
    }
}

/// Bars in strictly ascending timestamp order.
///
/// Construction is the only validation point: once built, every consumer can
/// rely on unique, ordered timestamps and non-negative finite prices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, CrossbenchError> {
        for bar in &bars {
            bar.check()?;
        }
        for pair in bars.windows(2) {
            if pair[1].timestamp == pair[0].timestamp {
                return Err(CrossbenchError::InvalidSeries {
                    reason: format!("duplicate timestamp {}", pair[1].timestamp),
                });
            }
            if pair[1].timestamp < pair[0].timestamp {
                return Err(CrossbenchError::InvalidSeries {
                    reason: format!(
                        "timestamp {} follows {}",
                        pair[1].timestamp, pair[0].timestamp
                    ),
                });
            }
        }
        Ok(Self { bars })
    }

    /// Sorts by timestamp before validating. Duplicates are still rejected.
    pub fn from_unsorted(mut bars: Vec<PriceBar>) -> Result<Self, CrossbenchError> {
        bars.sort_by_key(|b| b.timestamp);
        Self::new(bars)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceBar;
    type IntoIter = std::slice::Iter<'a, PriceBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            timestamp: ts(day),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn accepts_ascending_with_gaps() {
        let series = PriceSeries::new(vec![bar(1, 10.0), bar(2, 11.0), bar(5, 12.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn accepts_empty() {
        let series = PriceSeries::new(vec![]).unwrap();
        assert!(series.is_empty());
        assert!(series.first().is_none());
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let err = PriceSeries::new(vec![bar(1, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(err, CrossbenchError::InvalidSeries { .. }));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_descending() {
        let err = PriceSeries::new(vec![bar(2, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(err, CrossbenchError::InvalidSeries { .. }));
    }

    #[test]
    fn rejects_negative_close() {
        let b = PriceBar {
            close: -1.0,
            ..bar(1, 10.0)
        };
        let err = PriceSeries::new(vec![b]).unwrap_err();
        assert!(matches!(err, CrossbenchError::InvalidSeries { .. }));
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn reports_first_bad_field() {
        let err = PriceSeries::new(vec![bar(1, -1.0)]).unwrap_err();
        assert!(err.to_string().contains("open"));
    }

    #[test]
    fn accepts_zero_close() {
        let b = PriceBar {
            low: 0.0,
            close: 0.0,
            ..bar(1, 10.0)
        };
        assert!(PriceSeries::new(vec![b]).is_ok());
    }

    #[test]
    fn rejects_nan_volume() {
        let mut b = bar(1, 10.0);
        b.volume = f64::NAN;
        assert!(PriceSeries::new(vec![b]).is_err());
    }

    #[test]
    fn from_unsorted_orders_bars() {
        let series = PriceSeries::from_unsorted(vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0)]).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first().unwrap().timestamp, ts(1));
        assert_eq!(series.last().unwrap().timestamp, ts(3));
    }

    #[test]
    fn from_unsorted_still_rejects_duplicates() {
        assert!(PriceSeries::from_unsorted(vec![bar(2, 1.0), bar(2, 2.0)]).is_err());
    }
}
