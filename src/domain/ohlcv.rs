//! OHLCV bar and the ordered series indicators are computed from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix seconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// A bar whose open, high and low all equal the close.
    pub fn flat(timestamp: i64, close: f64) -> Self {
        Bar {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }

    /// Calendar date of the bar in UTC, if the timestamp is representable.
    pub fn date(&self) -> Option<chrono::NaiveDate> {
        chrono::DateTime::from_timestamp(self.timestamp, 0).map(|dt| dt.date_naive())
    }
}

/// Bars ordered ascending by timestamp. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcSeries {
    bars: Vec<Bar>,
}

impl OhlcSeries {
    /// Builds a series, sorting bars by timestamp. Bars sharing a timestamp
    /// keep their input order.
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// The most recent `n` bars (all of them when `n >= len`).
    pub fn tail(&self, n: usize) -> Self {
        let start = self.bars.len().saturating_sub(n);
        Self {
            bars: self.bars[start..].to_vec(),
        }
    }
}

impl From<Vec<Bar>> for OhlcSeries {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}
