//! End-to-end resolution: sources -> fusion -> estimation, and OHLC
//! provider -> indicator snapshot.
//!
//! Source and provider failures never abort a run. A failing source counts
//! as an empty contribution and a failing provider as an empty series.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::estimator::{InstrumentContext, estimate};
use crate::domain::fusion::merge;
use crate::domain::indicator::{IndicatorSettings, IndicatorSnapshot, IndicatorType};
use crate::domain::metric::{Confidence, MetricRecord, SourceContribution};
use crate::domain::ohlcv::OhlcSeries;
use crate::domain::precedence::PrecedenceTable;
use crate::ports::ohlc_port::OhlcPort;
use crate::ports::source_port::SourcePort;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMetrics {
    pub symbol: String,
    pub metrics: MetricRecord,
}

pub fn collect_contributions(
    symbol: &str,
    sources: &[Box<dyn SourcePort>],
) -> Vec<SourceContribution> {
    sources
        .iter()
        .map(|source| match source.fetch(symbol) {
            Ok(values) => SourceContribution::new(source.source_id(), values),
            Err(e) => {
                warn!(symbol, source = source.source_id(), error = %e, "source failed, treating as empty");
                SourceContribution::empty(source.source_id())
            }
        })
        .collect()
}

/// Complete record for one symbol.
pub fn resolve_metrics(
    symbol: &str,
    sources: &[Box<dyn SourcePort>],
    table: &PrecedenceTable,
    context: &InstrumentContext,
) -> MetricRecord {
    let contributions = collect_contributions(symbol, sources);
    let record = estimate(merge(symbol, &contributions, table), context);
    info!(
        symbol,
        observed = record.count_with(Confidence::Observed),
        estimated = record.count_with(Confidence::Estimated),
        "resolved metrics"
    );
    record
}

/// Resolves every symbol in parallel. Output order follows `symbols`.
/// Symbols without an entry in `contexts` get an empty context.
pub fn resolve_batch(
    symbols: &[String],
    sources: &[Box<dyn SourcePort>],
    table: &PrecedenceTable,
    contexts: &BTreeMap<String, InstrumentContext>,
) -> Vec<ResolvedMetrics> {
    let empty = InstrumentContext::default();
    symbols
        .par_iter()
        .map(|symbol| ResolvedMetrics {
            symbol: symbol.clone(),
            metrics: resolve_metrics(
                symbol,
                sources,
                table,
                contexts.get(symbol).unwrap_or(&empty),
            ),
        })
        .collect()
}

/// Indicator snapshot over the configured lookback.
pub fn compute_indicators(
    symbol: &str,
    ohlc: &dyn OhlcPort,
    settings: &IndicatorSettings,
) -> IndicatorSnapshot {
    let series = match ohlc.fetch_bars(symbol, settings.lookback) {
        Ok(bars) => OhlcSeries::new(bars).tail(settings.lookback),
        Err(e) => {
            warn!(symbol, error = %e, "price history unavailable, using empty series");
            OhlcSeries::default()
        }
    };

    for indicator in IndicatorType::for_settings(settings) {
        let warmup = indicator.warmup();
        if series.len() < warmup {
            debug!(symbol, %indicator, bars = series.len(), warmup, "short history, value degraded");
        }
    }

    let snapshot = IndicatorSnapshot::compute(&series, settings);
    info!(symbol, bars = series.len(), "computed indicators");
    snapshot
}
