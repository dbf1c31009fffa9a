//! RSI (Relative Strength Index).
//!
//! Uses Wilder's smoothing over the most recent `period + 1` closes:
//! - First average: simple mean of the first `period` gains/losses
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Fewer than `period + 1` bars yields the neutral value 50.

use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;
pub const NEUTRAL: f64 = 50.0;

pub fn calculate_rsi(bars: &[Bar], period: usize) -> f64 {
    if period == 0 || bars.len() <= period {
        return NEUTRAL;
    }

    let recent = &bars[bars.len() - (period + 1)..];

    let mut gains: Vec<f64> = Vec::with_capacity(period);
    let mut losses: Vec<f64> = Vec::with_capacity(period);
    for pair in recent.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}
