//! Configuration validation.
//!
//! Validates the `[indicators]`, `[precedence]` and `[bounds]` sections
//! before anything is computed. Absent keys fall back to defaults and are
//! always valid.

use crate::domain::error::OrionError;
use crate::domain::indicator::{SignalThresholds, macd, rsi};
use crate::domain::metric::CanonicalFieldKey;
use crate::domain::precedence::Bounds;
use crate::ports::config_port::ConfigPort;

pub const INDICATORS: &str = "indicators";
pub const PRECEDENCE: &str = "precedence";
pub const BOUNDS: &str = "bounds";
pub const ADMIT_UNLISTED: &str = "admit_unlisted";

pub const DEFAULT_LOOKBACK: i64 = 365;

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), OrionError> {
    for (key, default) in [
        ("rsi_period", rsi::DEFAULT_PERIOD as i64),
        ("macd_fast", macd::DEFAULT_FAST as i64),
        ("macd_slow", macd::DEFAULT_SLOW as i64),
        ("macd_signal", macd::DEFAULT_SIGNAL as i64),
        ("lookback", DEFAULT_LOOKBACK),
    ] {
        validate_positive_int(config, key, default)?;
    }
    validate_macd_periods(config)?;
    validate_rsi_thresholds(config)?;
    Ok(())
}

pub fn validate_precedence_config(config: &dyn ConfigPort) -> Result<(), OrionError> {
    for key in config.keys(PRECEDENCE) {
        let value = config.get_string(PRECEDENCE, &key).unwrap_or_default();
        if key == ADMIT_UNLISTED {
            if parse_bool(&value).is_none() {
                return Err(invalid(PRECEDENCE, &key, "expected true or false"));
            }
            continue;
        }
        parse_field_key(PRECEDENCE, &key)?;
        if parse_source_list(&value).is_empty() {
            return Err(invalid(PRECEDENCE, &key, "source list must not be empty"));
        }
    }

    for key in config.keys(BOUNDS) {
        parse_field_key(BOUNDS, &key)?;
        let value = config.get_string(BOUNDS, &key).unwrap_or_default();
        value
            .parse::<Bounds>()
            .map_err(|e| invalid(BOUNDS, &key, &e.to_string()))?;
    }
    Ok(())
}

/// Comma-separated source ids, trimmed and lower-cased. Empty tokens are
/// dropped.
pub fn parse_source_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn parse_field_key(section: &str, key: &str) -> Result<CanonicalFieldKey, OrionError> {
    key.parse::<CanonicalFieldKey>()
        .map_err(|e| invalid(section, key, &e.to_string()))
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> OrionError {
    OrionError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_positive_int(config: &dyn ConfigPort, key: &str, default: i64) -> Result<(), OrionError> {
    if let Some(raw) = config.get_string(INDICATORS, key) {
        if raw.trim().parse::<i64>().is_err() {
            return Err(invalid(INDICATORS, key, &format!("{} must be an integer", key)));
        }
    }
    if config.get_int(INDICATORS, key, default) <= 0 {
        return Err(invalid(INDICATORS, key, &format!("{} must be positive", key)));
    }
    Ok(())
}

fn validate_macd_periods(config: &dyn ConfigPort) -> Result<(), OrionError> {
    let fast = config.get_int(INDICATORS, "macd_fast", macd::DEFAULT_FAST as i64);
    let slow = config.get_int(INDICATORS, "macd_slow", macd::DEFAULT_SLOW as i64);
    if fast >= slow {
        return Err(invalid(
            INDICATORS,
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(())
}

fn validate_rsi_thresholds(config: &dyn ConfigPort) -> Result<(), OrionError> {
    let defaults = SignalThresholds::default();
    for key in ["rsi_overbought", "rsi_oversold"] {
        if let Some(raw) = config.get_string(INDICATORS, key) {
            if raw.trim().parse::<f64>().map_or(true, |v| !v.is_finite()) {
                return Err(invalid(INDICATORS, key, &format!("{} must be a number", key)));
            }
        }
    }
    let overbought = config.get_double(INDICATORS, "rsi_overbought", defaults.overbought);
    let oversold = config.get_double(INDICATORS, "rsi_oversold", defaults.oversold);
    if oversold < 0.0 || overbought > 100.0 {
        return Err(invalid(
            INDICATORS,
            "rsi_overbought",
            "rsi thresholds must be between 0 and 100",
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            INDICATORS,
            "rsi_oversold",
            "rsi_oversold must be less than rsi_overbought",
        ));
    }
    Ok(())
}
