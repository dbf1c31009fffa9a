//! Symbol lists for batch resolution.
//!
//! Parses comma-separated symbol lists from the command line or configuration
//! and normalises exchange-suffixed tickers to bare symbols.

use std::collections::HashSet;

/// Exchange suffixes stripped from tickers (`TCS.NS` -> `TCS`).
pub const EXCHANGE_SUFFIXES: [&str; 2] = [".NS", ".BO"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

/// Upper-cases and strips a trailing `.NS` / `.BO` exchange suffix.
pub fn clean_symbol(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    EXCHANGE_SUFFIXES
        .iter()
        .find_map(|suffix| upper.strip_suffix(suffix))
        .map(str::to_string)
        .unwrap_or(upper)
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = clean_symbol(trimmed);
        if code.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}
