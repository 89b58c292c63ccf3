//! Trading pair domain models.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingError};
use crate::setting_change::LiveTradingInfo;

/// A base/quote market on one exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradingPair {
    pub id: i64,
    pub exchange_id: i64,
    pub base: i64,
    pub quote: i64,
    pub price_precision: i64,
    pub amount_precision: i64,
    pub amount_limit_min: f64,
    pub amount_limit_max: f64,
    pub price_limit_min: f64,
    pub price_limit_max: f64,
    pub min_notional: f64,
}

impl TradingPair {
    pub fn involves(&self, asset_id: i64) -> bool {
        self.base == asset_id || self.quote == asset_id
    }
}

/// Which leg of a trading pair was left implicit (`0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplicitLeg {
    Base,
    Quote,
}

/// Input model for a trading pair. The exchange comes from the context the
/// pair is declared in; a leg set to `0` is implicit and resolves to the
/// asset being configured.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTradingPair {
    #[serde(default)]
    pub base: i64,
    #[serde(default)]
    pub quote: i64,
    #[serde(default)]
    pub price_precision: i64,
    #[serde(default)]
    pub amount_precision: i64,
    #[serde(default)]
    pub amount_limit_min: f64,
    #[serde(default)]
    pub amount_limit_max: f64,
    #[serde(default)]
    pub price_limit_min: f64,
    #[serde(default)]
    pub price_limit_max: f64,
    #[serde(default)]
    pub min_notional: f64,
}

impl NewTradingPair {
    /// Returns the implicit leg. Exactly one of base/quote must be `0`.
    pub fn implicit_leg(&self) -> Result<ImplicitLeg> {
        match (self.base == 0, self.quote == 0) {
            (true, false) => Ok(ImplicitLeg::Base),
            (false, true) => Ok(ImplicitLeg::Quote),
            _ => Err(SettingError::BadTradingPairConfiguration.into()),
        }
    }

    /// Resolves the implicit leg to `asset_id` and returns `(base, quote)`.
    pub fn resolve_implicit_leg(&self, asset_id: i64) -> Result<(i64, i64)> {
        match self.implicit_leg()? {
            ImplicitLeg::Base => Ok((asset_id, self.quote)),
            ImplicitLeg::Quote => Ok((self.base, asset_id)),
        }
    }

    /// Like [`resolve_implicit_leg`](Self::resolve_implicit_leg) but also
    /// accepts a pair with both legs given explicitly.
    pub fn resolve_legs(&self, asset_id: i64) -> Result<(i64, i64)> {
        if self.base != 0 && self.quote != 0 {
            if self.base == self.quote {
                return Err(SettingError::BadTradingPairConfiguration.into());
            }
            return Ok((self.base, self.quote));
        }
        self.resolve_implicit_leg(asset_id)
    }

    /// Overwrites precision and limits with what the venue reports.
    pub fn apply_live_info(&mut self, info: &LiveTradingInfo) {
        self.price_precision = info.price_precision;
        self.amount_precision = info.amount_precision;
        self.amount_limit_min = info.amount_limit_min;
        self.amount_limit_max = info.amount_limit_max;
        self.price_limit_min = info.price_limit_min;
        self.price_limit_max = info.price_limit_max;
        self.min_notional = info.min_notional;
    }
}

/// A standalone trading pair creation. `asset_id` is the asset the pair is
/// added for; it receives the trading-by association.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTradingPair {
    #[serde(flatten)]
    pub trading_pair: NewTradingPair,
    pub asset_id: i64,
    pub exchange_id: i64,
}

/// Partial update of a trading pair's precision and limits.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradingPairUpdate {
    pub trading_pair_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_precision: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_precision: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_limit_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_limit_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_limit_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_limit_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_notional: Option<f64>,
}

/// Association of an asset with a trading pair it participates in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradingBy {
    pub id: i64,
    pub asset_id: i64,
    pub trading_pair_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTradingBy {
    pub asset_id: i64,
    pub trading_pair_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(base: i64, quote: i64) -> NewTradingPair {
        NewTradingPair {
            base,
            quote,
            ..Default::default()
        }
    }

    #[test]
    fn test_implicit_base_resolves_to_asset() {
        assert_eq!(pair(0, 3).resolve_implicit_leg(9).unwrap(), (9, 3));
        assert_eq!(pair(4, 0).resolve_implicit_leg(9).unwrap(), (4, 9));
    }

    #[test]
    fn test_both_or_neither_leg_implicit_is_rejected() {
        for p in [pair(0, 0), pair(1, 2)] {
            let err = p.resolve_implicit_leg(9).unwrap_err();
            assert_eq!(
                err.setting_error(),
                Some(&SettingError::BadTradingPairConfiguration)
            );
        }
    }

    #[test]
    fn test_resolve_legs_accepts_explicit_pair() {
        assert_eq!(pair(1, 2).resolve_legs(9).unwrap(), (1, 2));
        assert_eq!(pair(0, 2).resolve_legs(9).unwrap(), (9, 2));
        assert!(pair(2, 2).resolve_legs(9).is_err());
        assert!(pair(0, 0).resolve_legs(9).is_err());
    }

    #[test]
    fn test_create_trading_pair_payload_is_flat() {
        let json = serde_json::json!({
            "base": 0,
            "quote": 2,
            "pricePrecision": 6,
            "minNotional": 0.01,
            "assetId": 5,
            "exchangeId": 1
        });
        let entry: CreateTradingPair = serde_json::from_value(json).unwrap();
        assert_eq!(entry.trading_pair.quote, 2);
        assert_eq!(entry.trading_pair.price_precision, 6);
        assert_eq!(entry.asset_id, 5);
        assert_eq!(entry.trading_pair.amount_limit_max, 0.0);
    }
}
