#![allow(dead_code)]

use orion::domain::error::OrionError;
use orion::domain::metric::{CanonicalFieldKey, PartialMetrics};
pub use orion::domain::ohlcv::Bar;
use orion::ports::ohlc_port::OhlcPort;
use orion::ports::source_port::SourcePort;
use std::collections::HashMap;

pub const DAY: i64 = 86_400;
/// 2024-01-01T00:00:00Z
pub const START: i64 = 1_704_067_200;

pub struct MockSourcePort {
    pub id: String,
    pub data: HashMap<String, PartialMetrics>,
    pub errors: HashMap<String, String>,
}

impl MockSourcePort {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_values(mut self, symbol: &str, values: &[(CanonicalFieldKey, Option<f64>)]) -> Self {
        self.data
            .insert(symbol.to_string(), values.iter().copied().collect());
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn boxed(self) -> Box<dyn SourcePort> {
        Box::new(self)
    }
}

impl SourcePort for MockSourcePort {
    fn source_id(&self) -> &str {
        &self.id
    }

    fn fetch(&self, symbol: &str) -> Result<PartialMetrics, OrionError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(OrionError::SourceUnavailable {
                source_id: self.id.clone(),
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub struct MockOhlcPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockOhlcPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl OhlcPort for MockOhlcPort {
    fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<Bar>, OrionError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(OrionError::DataFormat {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        let start = bars.len().saturating_sub(lookback);
        Ok(bars[start..].to_vec())
    }
}

pub fn make_bar(day: i64, close: f64) -> Bar {
    Bar {
        timestamp: START + day * DAY,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Daily bars with the given closes, oldest first.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as i64, close))
        .collect()
}

/// `count` bars rising by `step` from `start_price`.
pub fn generate_bars(count: usize, start_price: f64, step: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| make_bar(i as i64, start_price + step * i as f64))
        .collect()
}
