//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for orion.
///
/// The computational core never produces these; they come from ports,
/// adapters and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum OrionError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("source {source_id} unavailable for {symbol}: {reason}")]
    SourceUnavailable {
        source_id: String,
        symbol: String,
        reason: String,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("data format error: {reason}")]
    DataFormat { reason: String },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&OrionError> for std::process::ExitCode {
    fn from(err: &OrionError) -> Self {
        let code: u8 = match err {
            OrionError::Io(_) => 1,
            OrionError::ConfigParse { .. }
            | OrionError::ConfigMissing { .. }
            | OrionError::ConfigInvalid { .. } => 2,
            OrionError::SourceUnavailable { .. } | OrionError::NoData { .. } => 3,
            OrionError::DataFormat { .. } => 4,
            OrionError::Universe(_) => 5,
            OrionError::Json(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}
