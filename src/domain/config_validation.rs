//! Configuration validation.
//!
//! Validates every recognised key before any computation runs. A key that is
//! absent falls back to its default; a key that is present but malformed or
//! out of range is an error naming the section and key.

use std::str::FromStr;

use crate::domain::error::CrossbenchError;
use crate::domain::indicator::MovingAverageKind;
use crate::ports::config_port::ConfigPort;

pub const STRATEGY: &str = "strategy";
pub const INDICATORS: &str = "indicators";
pub const BACKTEST: &str = "backtest";

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), CrossbenchError> {
    validate_windows(config)?;
    validate_moving_average(config)?;
    validate_initial_capital(config)?;
    validate_trade_cost(config)?;
    validate_periods_per_year(config)?;
    Ok(())
}

/// Parse `[section] key` if present.
pub(crate) fn read<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, CrossbenchError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CrossbenchError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("cannot parse '{}': {}", raw.trim(), e),
            }),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> CrossbenchError {
    CrossbenchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), CrossbenchError> {
    let keys = [
        (STRATEGY, "fast_window"),
        (STRATEGY, "slow_window"),
        (INDICATORS, "rsi_window"),
        (INDICATORS, "sma_window"),
        (INDICATORS, "ema_window"),
        (INDICATORS, "macd_fast"),
        (INDICATORS, "macd_slow"),
        (INDICATORS, "macd_signal"),
    ];
    for (section, key) in keys {
        if let Some(value) = read::<i64>(config, section, key)? {
            if value < 1 {
                return Err(invalid(section, key, "window must be at least 1"));
            }
        }
    }

    let fast = read::<i64>(config, STRATEGY, "fast_window")?;
    let slow = read::<i64>(config, STRATEGY, "slow_window")?;
    if let (Some(fast), Some(slow)) = (fast, slow) {
        if slow <= fast {
            return Err(invalid(
                STRATEGY,
                "slow_window",
                "slow_window must be greater than fast_window",
            ));
        }
    }

    let macd_fast = read::<i64>(config, INDICATORS, "macd_fast")?;
    let macd_slow = read::<i64>(config, INDICATORS, "macd_slow")?;
    if let (Some(fast), Some(slow)) = (macd_fast, macd_slow) {
        if slow <= fast {
            return Err(invalid(
                INDICATORS,
                "macd_slow",
                "macd_slow must be greater than macd_fast",
            ));
        }
    }
    Ok(())
}

fn validate_moving_average(config: &dyn ConfigPort) -> Result<(), CrossbenchError> {
    read::<MovingAverageKind>(config, STRATEGY, "moving_average")?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), CrossbenchError> {
    if let Some(value) = read::<f64>(config, BACKTEST, "initial_capital")? {
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(
                BACKTEST,
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_trade_cost(config: &dyn ConfigPort) -> Result<(), CrossbenchError> {
    for key in ["cost_flat", "cost_pct"] {
        if let Some(value) = read::<f64>(config, BACKTEST, key)? {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(BACKTEST, key, "trade cost must be non-negative"));
            }
        }
    }
    Ok(())
}

fn validate_periods_per_year(config: &dyn ConfigPort) -> Result<(), CrossbenchError> {
    if let Some(value) = read::<f64>(config, BACKTEST, "periods_per_year")? {
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(
                BACKTEST,
                "periods_per_year",
                "periods_per_year must be positive",
            ));
        }
    }
    Ok(())
}
