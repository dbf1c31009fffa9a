//! Point-in-time indicator snapshot for one series.

use serde::Serialize;

use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::macd::{self, calculate_macd};
use crate::domain::indicator::rsi::{self, calculate_rsi};
use crate::domain::indicator::signal::SignalThresholds;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::OhlcSeries;

/// Bars required before the long SMAs are reported.
pub const SMA50_MIN_BARS: usize = 50;
pub const SMA200_MIN_BARS: usize = 200;

/// Tunable parameters for [`IndicatorSnapshot::compute`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub thresholds: SignalThresholds,
    /// Number of most recent bars requested from the OHLC provider.
    pub lookback: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: rsi::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            thresholds: SignalThresholds::default(),
            lookback: 365,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub current_price: f64,
    pub rsi: f64,
    pub sma20: f64,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub ema12: f64,
    pub ema26: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
}

impl IndicatorSnapshot {
    /// Computes every indicator fresh from `series`. Never fails; short or
    /// empty series fall back to each indicator's neutral value.
    pub fn compute(series: &OhlcSeries, settings: &IndicatorSettings) -> Self {
        let bars = series.bars();
        let macd = calculate_macd(
            bars,
            settings.macd_fast,
            settings.macd_slow,
            settings.macd_signal,
        );

        IndicatorSnapshot {
            current_price: series.last_close().unwrap_or(0.0),
            rsi: calculate_rsi(bars, settings.rsi_period),
            sma20: calculate_sma(bars, 20),
            sma50: (bars.len() >= SMA50_MIN_BARS).then(|| calculate_sma(bars, 50)),
            sma200: (bars.len() >= SMA200_MIN_BARS).then(|| calculate_sma(bars, 200)),
            ema12: calculate_ema(bars, 12),
            ema26: calculate_ema(bars, 26),
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
        }
    }
}
