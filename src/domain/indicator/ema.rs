//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA = C*k + EMA_prev*(1-k) for every later bar in order.
//! Fewer than n bars degrades to the SMA of all available bars.

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::Bar;

pub fn calculate_ema(bars: &[Bar], period: usize) -> f64 {
    if period == 0 || bars.len() < period {
        return calculate_sma(bars, bars.len());
    }

    let k = smoothing_factor(period);
    let mut ema = calculate_sma(&bars[..period], period);
    for bar in &bars[period..] {
        ema = bar.close * k + ema * (1.0 - k);
    }
    ema
}

/// `out[i]` equals `calculate_ema(&bars[..=i], period)`, computed in one pass.
pub(crate) fn ema_by_prefix(bars: &[Bar], period: usize) -> Vec<f64> {
    let k = smoothing_factor(period);
    let mut out = Vec::with_capacity(bars.len());
    let mut sum = 0.0;
    let mut ema = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let len = i + 1;
        if period == 0 || len < period {
            sum += bar.close;
            out.push(sum / len as f64);
        } else if len == period {
            sum += bar.close;
            ema = sum / period as f64;
            out.push(ema);
        } else {
            ema = bar.close * k + ema * (1.0 - k);
            out.push(ema);
        }
    }
    out
}

/// Applies the same seed-then-recurse scheme to an arbitrary value series.
/// Used for the MACD signal line.
pub(crate) fn ema_of_values(values: &[f64], period: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    if period == 0 || values.len() < period {
        return values.iter().sum::<f64>() / values.len() as f64;
    }

    let k = smoothing_factor(period);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    for &value in &values[period..] {
        ema = value * k + ema * (1.0 - k);
    }
    ema
}

fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}
