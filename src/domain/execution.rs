//! Trade execution and fill simulation.
//!
//! Fills happen at the bar close with 100% of equity committed. Costs are
//! charged on both sides of a round trip:
//! - entry: invested = (equity - flat) / (1 + pct/100), fees = equity - invested
//! - exit: equity = proceeds - flat - proceeds * pct/100, floored at zero

use chrono::NaiveDateTime;

use super::error::CrossbenchError;
use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position, PositionState};

/// Per-fill trading cost. `pct` is a percentage of the filled notional.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TradeCost {
    pub flat: f64,
    pub pct: f64,
}

impl TradeCost {
    pub fn validate(&self) -> Result<(), CrossbenchError> {
        if !self.flat.is_finite() || self.flat < 0.0 {
            return Err(CrossbenchError::invalid_config(
                "flat trade cost must be a non-negative amount",
            ));
        }
        if !self.pct.is_finite() || self.pct < 0.0 {
            return Err(CrossbenchError::invalid_config(
                "percentage trade cost must be non-negative",
            ));
        }
        Ok(())
    }

    pub fn is_free(&self) -> bool {
        self.flat == 0.0 && self.pct == 0.0
    }
}

/// Calculate commission: flat_fee + (trade_value * pct / 100).
pub fn calculate_commission(trade_value: f64, cost: &TradeCost) -> f64 {
    cost.flat + (trade_value * cost.pct / 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { units: f64, fees: f64 },
    AlreadyLong,
    InsufficientCapital,
    ZeroPrice,
}

/// Open a long position with all available cash.
pub fn enter_long(
    portfolio: &mut Portfolio,
    index: usize,
    timestamp: NaiveDateTime,
    price: f64,
    cost: &TradeCost,
) -> EntryResult {
    if portfolio.state.is_long() {
        return EntryResult::AlreadyLong;
    }
    if price <= 0.0 {
        return EntryResult::ZeroPrice;
    }

    let equity = portfolio.cash;
    if equity <= cost.flat {
        return EntryResult::InsufficientCapital;
    }

    let invested = if cost.is_free() {
        equity
    } else {
        (equity - cost.flat) / (1.0 + cost.pct / 100.0)
    };
    let fees = equity - invested;
    let units = invested / price;

    portfolio.cash = 0.0;
    portfolio.state = PositionState::Long(Position {
        entry_index: index,
        entry_timestamp: timestamp,
        entry_price: price,
        units,
        committed_equity: equity,
        entry_fees: fees,
    });

    EntryResult::Entered { units, fees }
}

/// Close the open long position, if any, and record the round trip.
pub fn exit_long(
    portfolio: &mut Portfolio,
    timestamp: NaiveDateTime,
    price: f64,
    cost: &TradeCost,
) -> Option<ClosedTrade> {
    let position = match std::mem::take(&mut portfolio.state) {
        PositionState::Long(position) => position,
        PositionState::Flat => return None,
    };

    let proceeds = position.market_value(price);
    let exit_equity = if cost.is_free() {
        proceeds
    } else {
        (proceeds - calculate_commission(proceeds, cost)).max(0.0)
    };
    let exit_fees = proceeds - exit_equity;

    portfolio.cash = exit_equity;
    let trade = ClosedTrade {
        entry_timestamp: position.entry_timestamp,
        exit_timestamp: timestamp,
        entry_price: position.entry_price,
        exit_price: price,
        units: position.units,
        committed_equity: position.committed_equity,
        exit_equity,
        fees: position.entry_fees + exit_fees,
        pnl: exit_equity - position.committed_equity,
    };
    portfolio.record_trade(trade.clone());
    Some(trade)
}
