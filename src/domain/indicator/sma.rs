//! Simple Moving Average over closing prices.
//!
//! Fewer bars than the period degrades to the mean of what is available.

use crate::domain::ohlcv::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> f64 {
    if bars.is_empty() {
        return 0.0;
    }
    let window = if period == 0 || bars.len() < period {
        bars
    } else {
        &bars[bars.len() - period..]
    };
    window.iter().map(|b| b.close).sum::<f64>() / window.len() as f64
}
