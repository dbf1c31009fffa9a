//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow), evaluated on every prefix of length
//! `slow..=N`; the last value is the reported line.
//! Signal Line = EMA(signal) of those MACD values (mean when there are fewer
//! than `signal` of them).
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Fewer than `slow` bars yields all zeros.

use serde::Serialize;

use crate::domain::indicator::ema::{ema_by_prefix, ema_of_values};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn calculate_macd(bars: &[Bar], fast: usize, slow: usize, signal_period: usize) -> MacdValue {
    let macd_values = macd_line_values(bars, fast, slow);
    let Some(&macd) = macd_values.last() else {
        return MacdValue::default();
    };

    let signal = ema_of_values(&macd_values, signal_period);

    MacdValue {
        macd,
        signal,
        histogram: macd - signal,
    }
}

pub fn calculate_macd_default(bars: &[Bar]) -> MacdValue {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

/// MACD line for every prefix of length `slow..=bars.len()`, oldest first.
fn macd_line_values(bars: &[Bar], fast: usize, slow: usize) -> Vec<f64> {
    let first = slow.max(1);
    if bars.len() < first {
        return Vec::new();
    }

    let ema_fast = ema_by_prefix(bars, fast);
    let ema_slow = ema_by_prefix(bars, slow);

    (first - 1..bars.len())
        .map(|i| ema_fast[i] - ema_slow[i])
        .collect()
}
