//! Exchange domain models.

use serde::{Deserialize, Serialize};

/// A centralized trading venue the reserve is connected to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub id: i64,
    pub name: String,
    pub trading_fee_maker: Option<f64>,
    pub trading_fee_taker: Option<f64>,
    pub disable: bool,
}

impl Exchange {
    /// An exchange can only be enabled once both fees are known.
    pub fn has_fees(&self) -> bool {
        self.trading_fee_maker.is_some() && self.trading_fee_taker.is_some()
    }
}

/// Input model for registering a new exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExchange {
    pub name: String,
    pub trading_fee_maker: Option<f64>,
    pub trading_fee_taker: Option<f64>,
    #[serde(default = "default_disable")]
    pub disable: bool,
}

fn default_disable() -> bool {
    true
}

/// Partial update of an exchange. Omitted fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeUpdate {
    pub exchange_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_fee_maker: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_fee_taker: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
}
