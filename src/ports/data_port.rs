//! Price data access port trait.

use crate::domain::error::CrossbenchError;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Load the series, keeping only bars whose date lies in `[start, end]`.
    /// Either bound may be open.
    fn fetch_series(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, CrossbenchError>;
}
