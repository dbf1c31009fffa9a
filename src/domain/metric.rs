//! Canonical fundamental-metric schema.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The ten fundamental metrics a resolved record always carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalFieldKey {
    PeRatio,
    DividendYield,
    Beta,
    Eps,
    PriceToBook,
    PriceToSales,
    Revenue,
    ProfitMargin,
    ReturnOnEquity,
    DebtToEquity,
}

impl CanonicalFieldKey {
    pub const ALL: [CanonicalFieldKey; 10] = [
        CanonicalFieldKey::PeRatio,
        CanonicalFieldKey::DividendYield,
        CanonicalFieldKey::Beta,
        CanonicalFieldKey::Eps,
        CanonicalFieldKey::PriceToBook,
        CanonicalFieldKey::PriceToSales,
        CanonicalFieldKey::Revenue,
        CanonicalFieldKey::ProfitMargin,
        CanonicalFieldKey::ReturnOnEquity,
        CanonicalFieldKey::DebtToEquity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalFieldKey::PeRatio => "peRatio",
            CanonicalFieldKey::DividendYield => "dividendYield",
            CanonicalFieldKey::Beta => "beta",
            CanonicalFieldKey::Eps => "eps",
            CanonicalFieldKey::PriceToBook => "priceToBook",
            CanonicalFieldKey::PriceToSales => "priceToSales",
            CanonicalFieldKey::Revenue => "revenue",
            CanonicalFieldKey::ProfitMargin => "profitMargin",
            CanonicalFieldKey::ReturnOnEquity => "returnOnEquity",
            CanonicalFieldKey::DebtToEquity => "debtToEquity",
        }
    }

    /// Metrics stored as fractions (0.25 rather than 25%).
    pub fn is_fraction(&self) -> bool {
        matches!(
            self,
            CanonicalFieldKey::DividendYield
                | CanonicalFieldKey::ProfitMargin
                | CanonicalFieldKey::ReturnOnEquity
        )
    }
}

impl fmt::Display for CanonicalFieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric key: {0}")]
pub struct UnknownFieldKey(pub String);

impl FromStr for CanonicalFieldKey {
    type Err = UnknownFieldKey;

    /// Case-insensitive; `_` and `-` are ignored, so `pe_ratio`, `peratio` and
    /// `peRatio` all match. `pe` is accepted for the P/E ratio.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if normalized == "pe" {
            return Ok(CanonicalFieldKey::PeRatio);
        }
        CanonicalFieldKey::ALL
            .into_iter()
            .find(|key| key.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| UnknownFieldKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Observed,
    Estimated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricField {
    pub value: f64,
    pub source_id: String,
    pub confidence: Confidence,
}

impl MetricField {
    pub fn observed(value: f64, source_id: impl Into<String>) -> Self {
        Self {
            value,
            source_id: source_id.into(),
            confidence: Confidence::Observed,
        }
    }

    pub fn estimated(value: f64, source_id: impl Into<String>) -> Self {
        Self {
            value,
            source_id: source_id.into(),
            confidence: Confidence::Estimated,
        }
    }
}

/// One source's contribution: canonical key to value, `None` where the
/// source had the field but no usable number.
pub type PartialMetrics = BTreeMap<CanonicalFieldKey, Option<f64>>;

#[derive(Debug, Clone, PartialEq)]
pub struct SourceContribution {
    pub source_id: String,
    pub values: PartialMetrics,
}

impl SourceContribution {
    pub fn new(source_id: impl Into<String>, values: PartialMetrics) -> Self {
        Self {
            source_id: source_id.into(),
            values,
        }
    }

    /// Contribution of a source that failed or returned nothing.
    pub fn empty(source_id: impl Into<String>) -> Self {
        Self::new(source_id, PartialMetrics::new())
    }

    pub fn value(&self, key: CanonicalFieldKey) -> Option<f64> {
        self.values.get(&key).copied().flatten()
    }
}

/// At most one field per canonical key. Complete once every key is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricRecord {
    fields: BTreeMap<CanonicalFieldKey, MetricField>,
}

impl MetricRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: CanonicalFieldKey) -> Option<&MetricField> {
        self.fields.get(&key)
    }

    pub fn value(&self, key: CanonicalFieldKey) -> Option<f64> {
        self.fields.get(&key).map(|f| f.value)
    }

    pub fn contains(&self, key: CanonicalFieldKey) -> bool {
        self.fields.contains_key(&key)
    }

    /// Sets the field for `key`, replacing any previous one.
    pub fn insert(&mut self, key: CanonicalFieldKey, field: MetricField) {
        self.fields.insert(key, field);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        CanonicalFieldKey::ALL.iter().all(|k| self.fields.contains_key(k))
    }

    pub fn missing(&self) -> Vec<CanonicalFieldKey> {
        CanonicalFieldKey::ALL
            .into_iter()
            .filter(|k| !self.fields.contains_key(k))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalFieldKey, &MetricField)> {
        self.fields.iter()
    }

    pub fn count_with(&self, confidence: Confidence) -> usize {
        self.fields
            .values()
            .filter(|f| f.confidence == confidence)
            .count()
    }
}
