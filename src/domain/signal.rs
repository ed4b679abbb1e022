//! Crossover signal generation.
//!
//! A bar is LONG while the fast average sits strictly above the slow one and
//! FLAT otherwise. Bars where either average is still warming up carry no
//! signal at all.

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::error::CrossbenchError;
use crate::domain::indicator::IndicatorSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Signal {
    Long,
    Flat,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Long => write!(f, "LONG"),
            Signal::Flat => write!(f, "FLAT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SignalPoint {
    pub timestamp: NaiveDateTime,
    pub signal: Option<Signal>,
}

impl SignalPoint {
    /// Warm-up bars behave as FLAT for position purposes.
    pub fn effective(&self) -> Signal {
        self.signal.unwrap_or(Signal::Flat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CrossDirection {
    /// FLAT -> LONG
    Bullish,
    /// LONG -> FLAT
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Crossover {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub direction: CrossDirection,
}

/// Reject series that differ in length or timestamps.
pub(crate) fn ensure_aligned(
    left: &IndicatorSeries,
    right: &IndicatorSeries,
) -> Result<(), CrossbenchError> {
    if left.len() != right.len() {
        return Err(CrossbenchError::misaligned(
            left.indicator_type.to_string(),
            right.indicator_type.to_string(),
            format!("length {} vs {}", left.len(), right.len()),
        ));
    }
    if let Some((i, (a, b))) = left
        .values
        .iter()
        .zip(&right.values)
        .enumerate()
        .find(|(_, (a, b))| a.timestamp != b.timestamp)
    {
        return Err(CrossbenchError::misaligned(
            left.indicator_type.to_string(),
            right.indicator_type.to_string(),
            format!("index {i}: {} vs {}", a.timestamp, b.timestamp),
        ));
    }
    Ok(())
}

pub fn generate_signals(
    fast: &IndicatorSeries,
    slow: &IndicatorSeries,
) -> Result<Vec<SignalPoint>, CrossbenchError> {
    ensure_aligned(fast, slow)?;

    Ok(fast
        .values
        .iter()
        .zip(&slow.values)
        .map(|(f, s)| {
            let signal = match (f.value, s.value) {
                (Some(f), Some(s)) if f > s => Some(Signal::Long),
                (Some(_), Some(_)) => Some(Signal::Flat),
                _ => None,
            };
            SignalPoint {
                timestamp: f.timestamp,
                signal,
            }
        })
        .collect())
}

/// Every bar where the effective signal differs from the previous bar's.
/// The bar before the series is taken as FLAT.
pub fn crossovers(signals: &[SignalPoint]) -> Vec<Crossover> {
    let mut previous = Signal::Flat;
    let mut events = Vec::new();
    for (index, point) in signals.iter().enumerate() {
        let current = point.effective();
        if current != previous {
            let direction = match current {
                Signal::Long => CrossDirection::Bullish,
                Signal::Flat => CrossDirection::Bearish,
            };
            events.push(Crossover {
                index,
                timestamp: point.timestamp,
                direction,
            });
        }
        previous = current;
    }
    events
}
