//! Metric fusion: merges per-source partial maps into one record.
//!
//! For each key the precedence table's source order is scanned and the first
//! present, plausible value is adopted. Arrival order of contributions never
//! matters; only source identity does.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::metric::{CanonicalFieldKey, MetricField, MetricRecord, SourceContribution};
use crate::domain::precedence::PrecedenceTable;

pub fn merge(symbol: &str, sources: &[SourceContribution], table: &PrecedenceTable) -> MetricRecord {
    let by_source = index_by_source(sources);
    let mut record = MetricRecord::new();

    for key in CanonicalFieldKey::ALL {
        let bounds = table.bounds(key);
        let order = source_order(key, table, &by_source);

        for source_id in order {
            let Some(contributions) = by_source.get(source_id) else {
                continue;
            };
            let plausible = contributions
                .iter()
                .filter_map(|c| c.value(key))
                .filter(|&v| {
                    let ok = bounds.contains(v);
                    if !ok {
                        debug!(symbol, source = source_id, field = %key, value = v, %bounds, "discarding implausible value");
                    }
                    ok
                })
                .min_by(f64::total_cmp);

            if let Some(value) = plausible {
                record.insert(key, MetricField::observed(value, source_id));
                break;
            }
        }
    }

    debug!(
        symbol,
        observed = record.len(),
        missing = record.missing().len(),
        "merged source contributions"
    );
    record
}

/// Contributions grouped by source id. A source id may appear more than once.
fn index_by_source(sources: &[SourceContribution]) -> BTreeMap<&str, Vec<&SourceContribution>> {
    let mut map: BTreeMap<&str, Vec<&SourceContribution>> = BTreeMap::new();
    for contribution in sources {
        map.entry(contribution.source_id.as_str())
            .or_default()
            .push(contribution);
    }
    map
}

/// Listed sources first; then, if admitted, every other contributing source
/// in lexicographic order.
fn source_order<'a>(
    key: CanonicalFieldKey,
    table: &'a PrecedenceTable,
    by_source: &BTreeMap<&'a str, Vec<&SourceContribution>>,
) -> Vec<&'a str> {
    let listed = table.sources(key);
    let mut order: Vec<&str> = listed.iter().map(String::as_str).collect();
    if table.admit_unlisted {
        order.extend(
            by_source
                .keys()
                .copied()
                .filter(|id| !listed.iter().any(|l| l == id)),
        );
    }
    order
}
