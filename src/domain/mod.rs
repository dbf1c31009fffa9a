//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod metric;
pub mod precedence;
pub mod fusion;
pub mod estimator;
pub mod pipeline;
pub mod config_validation;
pub mod universe;
pub mod error;
