//! Port traits at the crate's I/O seams.

pub mod config_port;
pub mod ohlc_port;
pub mod source_port;
