//! Labelled threshold signals derived from a snapshot, for display only.

use serde::Serialize;

use crate::domain::indicator::snapshot::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PricePosition {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MacdBias {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSignals {
    pub rsi: RsiZone,
    pub price_vs_sma20: PricePosition,
    pub price_vs_sma50: Option<PricePosition>,
    pub price_vs_sma200: Option<PricePosition>,
    pub macd: MacdBias,
}

impl IndicatorSignals {
    pub fn from_snapshot(snapshot: &IndicatorSnapshot, thresholds: &SignalThresholds) -> Self {
        let price = snapshot.current_price;
        Self {
            rsi: rsi_zone(snapshot.rsi, thresholds),
            price_vs_sma20: position(price, snapshot.sma20),
            price_vs_sma50: snapshot.sma50.map(|sma| position(price, sma)),
            price_vs_sma200: snapshot.sma200.map(|sma| position(price, sma)),
            macd: if snapshot.macd > snapshot.macd_signal {
                MacdBias::Bullish
            } else {
                MacdBias::Bearish
            },
        }
    }
}

fn rsi_zone(rsi: f64, thresholds: &SignalThresholds) -> RsiZone {
    if rsi > thresholds.overbought {
        RsiZone::Overbought
    } else if rsi < thresholds.oversold {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    }
}

fn position(price: f64, average: f64) -> PricePosition {
    if price > average {
        PricePosition::Above
    } else {
        PricePosition::Below
    }
}
