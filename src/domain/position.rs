//! Position tracking for the single-asset long-only simulator.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Position {
    pub entry_index: usize,
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub units: f64,
    /// Equity before entry costs were taken out.
    pub committed_equity: f64,
    pub entry_fees: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.units * price
    }
}

/// FLAT carries no data; LONG carries the open position.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long(Position),
}

impl PositionState {
    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClosedTrade {
    pub entry_timestamp: NaiveDateTime,
    pub exit_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub units: f64,
    pub committed_equity: f64,
    pub exit_equity: f64,
    pub fees: f64,
    pub pnl: f64,
}

impl ClosedTrade {
    /// Round-trip return on the equity committed at entry, costs included.
    pub fn return_pct(&self) -> f64 {
        if self.committed_equity > 0.0 {
            self.pnl / self.committed_equity
        } else {
            0.0
        }
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}
