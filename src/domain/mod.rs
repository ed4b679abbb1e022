//! Core domain types and logic.

pub mod ohlcv;
pub mod interval;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod analysis;
pub mod config_validation;
pub mod error;
