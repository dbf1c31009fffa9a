//! Per-symbol snapshot files as metric sources.
//!
//! `<dir>/<SYMBOL>.ini` holds one section per source id with whatever that
//! source reported, plus an optional `[context]` section:
//!
//! ```ini
//! [nse]
//! pe_ratio = 29.4
//! dividend_yield = 1.35%
//!
//! [screener]
//! revenue = 2,40,893 Cr
//! return_on_equity = 51.2
//!
//! [context]
//! current_price = 3,512.40
//! industry = Computers - Software & Consulting
//! ```
//!
//! Values go through [`parse_number`]. Fraction fields reported above 1 are
//! taken as percentages and divided by 100.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::value_parser::parse_number;
use crate::domain::error::OrionError;
use crate::domain::estimator::InstrumentContext;
use crate::domain::metric::{CanonicalFieldKey, PartialMetrics};
use crate::ports::config_port::ConfigPort;
use crate::ports::source_port::SourcePort;

pub const CONTEXT_SECTION: &str = "context";

pub struct SnapshotAdapter {
    base_path: PathBuf,
    source_id: String,
}

impl SnapshotAdapter {
    pub fn new(base_path: PathBuf, source_id: impl Into<String>) -> Self {
        Self {
            base_path,
            source_id: source_id.into(),
        }
    }

    fn unavailable(&self, symbol: &str, reason: impl Into<String>) -> OrionError {
        OrionError::SourceUnavailable {
            source_id: self.source_id.clone(),
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

fn snapshot_path(base_path: &Path, symbol: &str) -> PathBuf {
    base_path.join(format!("{}.ini", symbol))
}

/// Fraction fields reported as percentages (`25` for 25%) are rescaled.
fn normalise(key: CanonicalFieldKey, value: f64) -> f64 {
    if key.is_fraction() && value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

impl SourcePort for SnapshotAdapter {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn fetch(&self, symbol: &str) -> Result<PartialMetrics, OrionError> {
        let path = snapshot_path(&self.base_path, symbol);
        let snapshot = FileConfigAdapter::from_file(&path)
            .map_err(|e| self.unavailable(symbol, format!("{}: {}", path.display(), e)))?;

        if !snapshot.has_section(&self.source_id) {
            return Err(self.unavailable(symbol, "no section in snapshot"));
        }

        let mut values = PartialMetrics::new();
        for name in snapshot.keys(&self.source_id) {
            let Ok(key) = name.parse::<CanonicalFieldKey>() else {
                debug!(source = %self.source_id, symbol, field = %name, "ignoring non-canonical field");
                continue;
            };
            let value = snapshot
                .get_string(&self.source_id, &name)
                .as_deref()
                .and_then(parse_number)
                .map(|v| normalise(key, v));
            values.insert(key, value);
        }

        debug!(source = %self.source_id, symbol, fields = values.len(), "read snapshot");
        Ok(values)
    }
}

/// Reads the `[context]` section of a symbol's snapshot. A snapshot without
/// one yields an empty context; a missing file is `NoData`.
pub fn load_context(base_path: &Path, symbol: &str) -> Result<InstrumentContext, OrionError> {
    let path = snapshot_path(base_path, symbol);
    if !path.exists() {
        return Err(OrionError::NoData {
            symbol: symbol.to_string(),
        });
    }
    let snapshot = FileConfigAdapter::from_file(&path).map_err(|e| OrionError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let number = |key: &str| {
        snapshot
            .get_string(CONTEXT_SECTION, key)
            .as_deref()
            .and_then(parse_number)
    };

    Ok(InstrumentContext {
        current_price: number("current_price"),
        market_cap: number("market_cap"),
        shares_outstanding: number("shares_outstanding"),
        face_value: number("face_value"),
        industry: snapshot
            .get_string(CONTEXT_SECTION, "industry")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_snapshot() -> TempDir {
        let dir = TempDir::new().unwrap();
        let content = "\
[nse]
pe_ratio = 29.4
dividend_yield = 1.35%
beta = N/A
market_cap = 12,70,000 Cr

[screener]
revenue = 2,40,893 Cr
return_on_equity = 51.2
debtToEquity = 0.09

[context]
current_price = 3,512.40
market_cap = 12,70,000 Cr
face_value = 1
industry = Computers - Software & Consulting
";
        fs::write(dir.path().join("TCS.ini"), content).unwrap();
        dir
    }

    #[test]
    fn fetch_reads_own_section() {
        let dir = setup_snapshot();
        let adapter = SnapshotAdapter::new(dir.path().to_path_buf(), "nse");
        let values = adapter.fetch("TCS").unwrap();

        assert_eq!(values.get(&CanonicalFieldKey::PeRatio), Some(&Some(29.4)));
        assert_eq!(values.get(&CanonicalFieldKey::Beta), Some(&None));
        assert!(!values.contains_key(&CanonicalFieldKey::Revenue));
        // market_cap is not a canonical field
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn fetch_normalises_fractions() {
        let dir = setup_snapshot();
        let nse = SnapshotAdapter::new(dir.path().to_path_buf(), "nse")
            .fetch("TCS")
            .unwrap();
        let dy = nse[&CanonicalFieldKey::DividendYield].unwrap();
        assert!((dy - 0.0135).abs() < 1e-12);

        let screener = SnapshotAdapter::new(dir.path().to_path_buf(), "screener")
            .fetch("TCS")
            .unwrap();
        let roe = screener[&CanonicalFieldKey::ReturnOnEquity].unwrap();
        assert!((roe - 0.512).abs() < 1e-12);
        assert_eq!(screener[&CanonicalFieldKey::Revenue], Some(2.40893e12));
        assert_eq!(screener[&CanonicalFieldKey::DebtToEquity], Some(0.09));
    }

    #[test]
    fn missing_section_is_unavailable() {
        let dir = setup_snapshot();
        let adapter = SnapshotAdapter::new(dir.path().to_path_buf(), "yahoo");
        let err = adapter.fetch("TCS").unwrap_err();
        assert!(matches!(err, OrionError::SourceUnavailable { ref source_id, .. } if source_id == "yahoo"));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = setup_snapshot();
        let adapter = SnapshotAdapter::new(dir.path().to_path_buf(), "nse");
        assert!(matches!(
            adapter.fetch("INFY"),
            Err(OrionError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn load_context_parses_numbers() {
        let dir = setup_snapshot();
        let ctx = load_context(dir.path(), "TCS").unwrap();
        assert_eq!(ctx.current_price, Some(3512.4));
        assert_eq!(ctx.market_cap, Some(1.27e13));
        assert_eq!(ctx.face_value, Some(1.0));
        assert_eq!(ctx.shares_outstanding, None);
        assert!(ctx.is_it_sector());
    }

    #[test]
    fn load_context_without_section_is_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("INFY.ini"), "[nse]\npe = 24\n").unwrap();
        assert_eq!(
            load_context(dir.path(), "INFY").unwrap(),
            InstrumentContext::default()
        );
    }

    #[test]
    fn load_context_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_context(dir.path(), "INFY"),
            Err(OrionError::NoData { .. })
        ));
    }
}
