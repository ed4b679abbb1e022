//! Portfolio state and equity tracking.

use chrono::NaiveDateTime;

use super::position::{ClosedTrade, PositionState};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// Cash plus at most one open long position in the single traded asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub state: PositionState,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            state: PositionState::Flat,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn record_trade(&mut self, trade: ClosedTrade) {
        self.closed_trades.push(trade);
    }

    pub fn record_equity(&mut self, timestamp: NaiveDateTime, equity: f64) {
        self.equity_curve.push(EquityPoint { timestamp, equity });
    }

    /// Cash while flat, mark-to-market value while long.
    pub fn equity(&self, price: f64) -> f64 {
        match &self.state {
            PositionState::Flat => self.cash,
            PositionState::Long(position) => self.cash + position.market_value(price),
        }
    }
}
