//! Asset domain models.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, SettingError, ValidationError};
use crate::trading_pairs::{ImplicitLeg, NewTradingPair, TradingPair};

static ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("Invalid regex pattern"));

/// Checks that `address` is a 20-byte hex address with a `0x` prefix.
pub fn validate_address(address: &str) -> Result<()> {
    if ADDRESS_REGEX.is_match(address) {
        Ok(())
    } else {
        Err(SettingError::InvalidAddress(address.to_string()).into())
    }
}

/// Addresses are compared and stored case-insensitively.
pub fn normalize_address(address: &str) -> String {
    address.to_ascii_lowercase()
}

fn has_text(value: &Option<String>) -> bool {
    non_empty_address(value).is_some()
}

/// Blank address text is treated as no address.
pub fn non_empty_address(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Strategy used to source the rate of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetRate {
    #[default]
    NotSet,
    ExchangeFeed,
    GoldFeed,
    BtcFeed,
}

impl SetRate {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetRate::NotSet => "not_set",
            SetRate::ExchangeFeed => "exchange_feed",
            SetRate::GoldFeed => "gold_feed",
            SetRate::BtcFeed => "btc_feed",
        }
    }
}

impl FromStr for SetRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "not_set" => Ok(SetRate::NotSet),
            "exchange_feed" => Ok(SetRate::ExchangeFeed),
            "gold_feed" => Ok(SetRate::GoldFeed),
            "btc_feed" => Ok(SetRate::BtcFeed),
            other => Err(ValidationError::InvalidInput(format!("unknown set rate '{}'", other)).into()),
        }
    }
}

/// One side of the price weighting equation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PwiEquation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub min_min_spread: f64,
    pub price_multiply_factor: f64,
}

/// Price weighting equations used to quote rates for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssetPwi {
    pub ask: PwiEquation,
    pub bid: PwiEquation,
}

/// Coefficients of the rebalancing incentive curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceQuadratic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Target inventory thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssetTarget {
    pub total: f64,
    pub reserve: f64,
    pub rebalance_threshold: f64,
    pub transfer_threshold: f64,
}

/// Configuration of one asset on one exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetExchange {
    pub id: i64,
    pub asset_id: i64,
    pub exchange_id: i64,
    pub symbol: String,
    pub deposit_address: Option<String>,
    pub min_deposit: f64,
    pub withdraw_fee: f64,
    pub target_recommended: f64,
    pub target_ratio: f64,
    #[serde(default)]
    pub trading_pairs: Vec<TradingPair>,
}

/// Domain model representing a tradable asset of the reserve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub address: Option<String>,
    pub old_addresses: Vec<String>,
    pub decimals: i64,
    pub transferable: bool,
    pub set_rate: SetRate,
    pub rebalance: bool,
    pub is_quote: bool,
    pub pwi: Option<AssetPwi>,
    pub rebalance_quadratic: Option<RebalanceQuadratic>,
    pub exchanges: Vec<AssetExchange>,
    pub target: Option<AssetTarget>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Asset {
    pub fn exchange(&self, exchange_id: i64) -> Option<&AssetExchange> {
        self.exchanges.iter().find(|ae| ae.exchange_id == exchange_id)
    }
}

/// Input model for an asset exchange. Nested inside [`NewAsset`] the
/// `asset_id` is ignored and resolved to the asset being created.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAssetExchange {
    #[serde(default)]
    pub asset_id: i64,
    pub exchange_id: i64,
    pub symbol: String,
    #[serde(default)]
    pub deposit_address: Option<String>,
    #[serde(default)]
    pub min_deposit: f64,
    #[serde(default)]
    pub withdraw_fee: f64,
    #[serde(default)]
    pub target_recommended: f64,
    #[serde(default)]
    pub target_ratio: f64,
    #[serde(default)]
    pub trading_pairs: Vec<NewTradingPair>,
}

impl NewAssetExchange {
    /// Rules that only need the owning asset's flags.
    pub fn validate_for(&self, transferable: bool, is_quote: bool) -> Result<()> {
        if transferable && !has_text(&self.deposit_address) {
            return Err(SettingError::DepositAddressMissing.into());
        }
        if let Some(address) = non_empty_address(&self.deposit_address) {
            validate_address(address)?;
        }
        for pair in &self.trading_pairs {
            if pair.implicit_leg()? == ImplicitLeg::Quote && !is_quote {
                return Err(SettingError::QuoteAssetInvalid.into());
            }
        }
        Ok(())
    }
}

/// Input model for creating a new asset together with its exchange links
/// and trading pairs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub decimals: i64,
    pub transferable: bool,
    #[serde(default)]
    pub set_rate: SetRate,
    #[serde(default)]
    pub rebalance: bool,
    #[serde(default)]
    pub is_quote: bool,
    #[serde(default)]
    pub pwi: Option<AssetPwi>,
    #[serde(default)]
    pub rebalance_quadratic: Option<RebalanceQuadratic>,
    #[serde(default)]
    pub exchanges: Vec<NewAssetExchange>,
    #[serde(default)]
    pub target: Option<AssetTarget>,
}

impl NewAsset {
    /// Checks the conditional-field rules that need no stored state.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }
        if let Some(address) = non_empty_address(&self.address) {
            validate_address(address)?;
        }
        if self.transferable && !has_text(&self.address) {
            return Err(SettingError::AddressMissing.into());
        }
        if self.set_rate != SetRate::NotSet && self.pwi.is_none() {
            return Err(SettingError::PwiMissing.into());
        }
        if self.rebalance {
            if self.target.is_none() {
                return Err(SettingError::AssetTargetMissing.into());
            }
            if self.rebalance_quadratic.is_none() {
                return Err(SettingError::RebalanceQuadraticMissing.into());
            }
            if self.exchanges.is_empty() {
                return Err(SettingError::AssetExchangeMissing.into());
            }
        }
        let mut seen = std::collections::HashSet::new();
        for exchange in &self.exchanges {
            if !seen.insert(exchange.exchange_id) {
                return Err(SettingError::AssetExchangeAlreadyExist.into());
            }
            exchange.validate_for(self.transferable, self.is_quote)?;
        }
        Ok(())
    }
}

/// Partial update of an asset. Omitted fields are left unchanged; optional
/// parameter blocks can be replaced but not cleared.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub asset_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_rate: Option<SetRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebalance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_quote: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwi: Option<AssetPwi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebalance_quadratic: Option<RebalanceQuadratic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<AssetTarget>,
}

impl AssetUpdate {
    /// Checks the conditional-field rules on the merged state. A dependency
    /// is missing only if neither the stored asset nor this update supplies it.
    pub fn validate_against(&self, existing: &Asset) -> Result<()> {
        if let Some(address) = non_empty_address(&self.address) {
            validate_address(address)?;
        }
        if let Some(symbol) = &self.symbol {
            if symbol.trim().is_empty() {
                return Err(ValidationError::MissingField("symbol".to_string()).into());
            }
        }

        let transferable = self.transferable.unwrap_or(existing.transferable);
        if transferable && !has_text(&self.address) && !has_text(&existing.address) {
            return Err(SettingError::AddressMissing.into());
        }
        if transferable && !existing.transferable {
            if existing.exchanges.iter().any(|ae| !has_text(&ae.deposit_address)) {
                return Err(SettingError::DepositAddressMissing.into());
            }
        }

        let set_rate = self.set_rate.unwrap_or(existing.set_rate);
        if set_rate != SetRate::NotSet && self.pwi.is_none() && existing.pwi.is_none() {
            return Err(SettingError::PwiMissing.into());
        }

        if self.rebalance.unwrap_or(existing.rebalance) {
            if self.target.is_none() && existing.target.is_none() {
                return Err(SettingError::AssetTargetMissing.into());
            }
            if self.rebalance_quadratic.is_none() && existing.rebalance_quadratic.is_none() {
                return Err(SettingError::RebalanceQuadraticMissing.into());
            }
            if existing.exchanges.is_empty() {
                return Err(SettingError::AssetExchangeMissing.into());
            }
        }

        if self.is_quote == Some(false) && existing.is_quote {
            // Trading pairs quoted in this asset would become invalid.
            let quoted = existing
                .exchanges
                .iter()
                .flat_map(|ae| ae.trading_pairs.iter())
                .any(|tp| tp.quote == existing.id);
            if quoted {
                return Err(SettingError::QuoteAssetInvalid.into());
            }
        }
        Ok(())
    }
}

/// Replacement of an asset's on-chain address; the current one is archived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAssetAddress {
    pub asset_id: i64,
    pub address: String,
}

/// Partial update of an asset exchange.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetExchangeUpdate {
    pub asset_exchange_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_deposit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdraw_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_recommended: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ratio: Option<f64>,
}

impl AssetExchangeUpdate {
    pub fn validate_against(&self, existing: &AssetExchange, asset: &Asset) -> Result<()> {
        if let Some(address) = non_empty_address(&self.deposit_address) {
            validate_address(address)?;
        }
        if asset.transferable
            && !has_text(&self.deposit_address)
            && !has_text(&existing.deposit_address)
        {
            return Err(SettingError::DepositAddressMissing.into());
        }
        Ok(())
    }
}
