//! Live trading-pair metadata supplied by the exchange connectivity layer.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Venue symbols of a trading pair to look up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TradingPairSymbols {
    pub base_symbol: String,
    pub quote_symbol: String,
}

/// Precision and limits reported by a venue for one trading pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LiveTradingInfo {
    pub price_precision: i64,
    pub amount_precision: i64,
    pub amount_limit_min: f64,
    pub amount_limit_max: f64,
    pub price_limit_min: f64,
    pub price_limit_max: f64,
    pub min_notional: f64,
}

/// Lookup of live trading info. The returned map is keyed by the index of
/// the pair in `pairs`; pairs the venue does not know are absent.
#[async_trait]
pub trait LiveExchangeInfoProvider: Send + Sync {
    async fn get_live_trading_info(
        &self,
        exchange_id: i64,
        pairs: &[TradingPairSymbols],
    ) -> Result<HashMap<usize, LiveTradingInfo>>;
}
