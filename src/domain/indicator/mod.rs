//! Technical indicator implementations.
//!
//! Every calculator is a pure, total function of an ordered bar slice that
//! returns the indicator's latest value:
//! - `calculate_rsi`: Wilder-smoothed RSI, neutral 50 on short history
//! - `calculate_sma` / `calculate_ema`: moving averages that degrade to the
//!   mean of available closes
//! - `calculate_macd`: MACD line, signal and histogram
//!
//! [`IndicatorSnapshot`] bundles them for one series and [`IndicatorSignals`]
//! labels the snapshot for display.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod signal;
pub mod sma;
pub mod snapshot;

use std::fmt;

pub use ema::calculate_ema;
pub use macd::{MacdValue, calculate_macd, calculate_macd_default};
pub use rsi::calculate_rsi;
pub use signal::{IndicatorSignals, SignalThresholds};
pub use sma::calculate_sma;
pub use snapshot::{IndicatorSettings, IndicatorSnapshot};

/// Indicator identity plus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl IndicatorType {
    /// Indicators reported in a snapshot computed with `settings`.
    pub fn for_settings(settings: &IndicatorSettings) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Rsi(settings.rsi_period),
            IndicatorType::Sma(20),
            IndicatorType::Sma(50),
            IndicatorType::Sma(200),
            IndicatorType::Ema(12),
            IndicatorType::Ema(26),
            IndicatorType::Macd {
                fast: settings.macd_fast,
                slow: settings.macd_slow,
                signal: settings.macd_signal,
            },
        ]
    }

    /// Bars needed before the indicator stops degrading.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(period) | IndicatorType::Ema(period) => *period,
            IndicatorType::Rsi(period) => period.saturating_add(1),
            IndicatorType::Macd { slow, signal, .. } => {
                (*slow).max(1).saturating_add(*signal).saturating_sub(1)
            }
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}
