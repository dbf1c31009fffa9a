//! Metric source port trait.

use crate::domain::error::OrionError;
use crate::domain::metric::PartialMetrics;

/// One upstream data source, already reduced to canonical keys.
///
/// Implementations own all fetching and parsing. An `Err` is treated by the
/// pipeline exactly like a source that returned nothing.
pub trait SourcePort: Send + Sync {
    fn source_id(&self) -> &str;

    fn fetch(&self, symbol: &str) -> Result<PartialMetrics, OrionError>;
}
