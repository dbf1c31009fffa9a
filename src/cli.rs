//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::snapshot_adapter::{SnapshotAdapter, load_context};
use crate::domain::config_validation::{
    ADMIT_UNLISTED, BOUNDS, DEFAULT_LOOKBACK, INDICATORS, PRECEDENCE, parse_field_key,
    parse_source_list, validate_indicator_config, validate_precedence_config,
};
use crate::domain::error::OrionError;
use crate::domain::estimator::InstrumentContext;
use crate::domain::indicator::{
    IndicatorSettings, IndicatorSignals, IndicatorSnapshot, SignalThresholds, macd, rsi,
};
use crate::domain::metric::CanonicalFieldKey;
use crate::domain::pipeline::{ResolvedMetrics, compute_indicators, resolve_batch};
use crate::domain::precedence::{Bounds, PrecedenceTable};
use crate::domain::universe::{clean_symbol, parse_codes};
use crate::ports::config_port::ConfigPort;
use crate::ports::source_port::SourcePort;

#[derive(Parser, Debug)]
#[command(
    name = "orion",
    about = "Technical indicators and multi-source fundamental metrics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators for one symbol from <data-dir>/<SYMBOL>.csv
    Indicators {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Resolve complete metric records from per-symbol snapshot files
    Metrics {
        #[arg(long)]
        snapshot_dir: PathBuf,
        /// Comma-separated symbols, e.g. TCS,INFY
        #[arg(long)]
        symbols: String,
        /// Source ids to read; defaults to every source in the precedence table
        #[arg(long)]
        sources: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the effective precedence table
    Precedence {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Indicators {
            data_dir,
            symbol,
            config,
        } => indicator_report(&data_dir, &symbol, config.as_deref())
            .and_then(|report| print_json(&report)),
        Command::Metrics {
            snapshot_dir,
            symbols,
            sources,
            config,
        } => metrics_report(&snapshot_dir, &symbols, sources.as_deref(), config.as_deref())
            .and_then(|report| print_json(&report)),
        Command::Precedence { config } => {
            precedence_report(config.as_deref()).and_then(|view| print_json(&view))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Loads the INI config. No path, or a path that does not exist, means
/// defaults everywhere.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, OrionError> {
    let defaults = || {
        FileConfigAdapter::from_string("").map_err(|reason| OrionError::ConfigParse {
            file: "<defaults>".into(),
            reason,
        })
    };
    match path {
        None => defaults(),
        Some(path) if !path.exists() => {
            warn!(path = %path.display(), "config file not found, using defaults");
            defaults()
        }
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path).map_err(|e| OrionError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    }
}

fn period(config: &dyn ConfigPort, key: &str, default: usize) -> usize {
    usize::try_from(config.get_int(INDICATORS, key, default as i64)).unwrap_or(default)
}

pub fn build_indicator_settings(config: &dyn ConfigPort) -> Result<IndicatorSettings, OrionError> {
    validate_indicator_config(config)?;
    let thresholds = SignalThresholds::default();

    Ok(IndicatorSettings {
        rsi_period: period(config, "rsi_period", rsi::DEFAULT_PERIOD),
        macd_fast: period(config, "macd_fast", macd::DEFAULT_FAST),
        macd_slow: period(config, "macd_slow", macd::DEFAULT_SLOW),
        macd_signal: period(config, "macd_signal", macd::DEFAULT_SIGNAL),
        thresholds: SignalThresholds {
            overbought: config.get_double(INDICATORS, "rsi_overbought", thresholds.overbought),
            oversold: config.get_double(INDICATORS, "rsi_oversold", thresholds.oversold),
        },
        lookback: period(config, "lookback", DEFAULT_LOOKBACK as usize),
    })
}

/// Default table with `[precedence]` and `[bounds]` overrides applied.
pub fn build_precedence_table(config: &dyn ConfigPort) -> Result<PrecedenceTable, OrionError> {
    validate_precedence_config(config)?;
    let mut table = PrecedenceTable::default()
        .with_admit_unlisted(config.get_bool(PRECEDENCE, ADMIT_UNLISTED, false));

    for key in config.keys(PRECEDENCE) {
        if key == ADMIT_UNLISTED {
            continue;
        }
        let field = parse_field_key(PRECEDENCE, &key)?;
        let sources = parse_source_list(&config.get_string(PRECEDENCE, &key).unwrap_or_default());
        table = table.with_sources(field, sources);
    }

    for key in config.keys(BOUNDS) {
        let field = parse_field_key(BOUNDS, &key)?;
        let raw = config.get_string(BOUNDS, &key).unwrap_or_default();
        let bounds = raw.parse::<Bounds>().map_err(|e| OrionError::ConfigInvalid {
            section: BOUNDS.into(),
            key: key.clone(),
            reason: e.to_string(),
        })?;
        table = table.with_bounds(field, bounds);
    }

    Ok(table)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), OrionError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct IndicatorReport {
    pub symbol: String,
    pub snapshot: IndicatorSnapshot,
    pub signals: IndicatorSignals,
}

pub fn indicator_report(
    data_dir: &Path,
    symbol: &str,
    config_path: Option<&Path>,
) -> Result<IndicatorReport, OrionError> {
    let config = load_config(config_path)?;
    let settings = build_indicator_settings(&config)?;
    let symbol = clean_symbol(symbol);

    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let snapshot = compute_indicators(&symbol, &adapter, &settings);
    let signals = IndicatorSignals::from_snapshot(&snapshot, &settings.thresholds);

    Ok(IndicatorReport {
        symbol,
        snapshot,
        signals,
    })
}

/// Resolves every symbol in `symbols` from `<snapshot_dir>/<SYMBOL>.ini`.
/// `sources` overrides the set of source ids read.
pub fn metrics_report(
    snapshot_dir: &Path,
    symbols: &str,
    sources: Option<&str>,
    config_path: Option<&Path>,
) -> Result<Vec<ResolvedMetrics>, OrionError> {
    let config = load_config(config_path)?;
    let table = build_precedence_table(&config)?;
    let symbols = parse_codes(symbols)?;

    let source_ids = match sources {
        Some(list) => parse_source_list(list),
        None => table.source_ids(),
    };
    let adapters: Vec<Box<dyn SourcePort>> = source_ids
        .iter()
        .map(|id| {
            Box::new(SnapshotAdapter::new(snapshot_dir.to_path_buf(), id.as_str()))
                as Box<dyn SourcePort>
        })
        .collect();

    let mut contexts = BTreeMap::new();
    for symbol in &symbols {
        let context = match load_context(snapshot_dir, symbol) {
            Ok(context) => context,
            Err(OrionError::NoData { .. }) => {
                warn!(symbol = %symbol, "no snapshot file, estimating from defaults");
                InstrumentContext::default()
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "unreadable context, estimating from defaults");
                InstrumentContext::default()
            }
        };
        contexts.insert(symbol.clone(), context);
    }

    info!(symbols = symbols.len(), sources = adapters.len(), "resolving metrics");
    Ok(resolve_batch(&symbols, &adapters, &table, &contexts))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyView {
    pub sources: Vec<String>,
    pub bounds: String,
}

/// Effective precedence table with bounds in interval notation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecedenceView {
    pub admit_unlisted: bool,
    pub fields: BTreeMap<CanonicalFieldKey, PolicyView>,
}

pub fn precedence_report(config_path: Option<&Path>) -> Result<PrecedenceView, OrionError> {
    let config = load_config(config_path)?;
    let table = build_precedence_table(&config)?;

    let fields = table
        .iter()
        .map(|(key, policy)| {
            (
                *key,
                PolicyView {
                    sources: policy.sources.clone(),
                    bounds: policy.bounds.to_string(),
                },
            )
        })
        .collect();

    Ok(PrecedenceView {
        admit_unlisted: table.admit_unlisted,
        fields,
    })
}
