//! OHLC price history port trait.

use crate::domain::error::OrionError;
use crate::domain::ohlcv::Bar;

pub trait OhlcPort {
    /// Up to `lookback` most recent bars for `symbol`, in any order.
    fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<Bar>, OrionError>;
}
