//! Database models for assets, their exchange links and superseded addresses.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;

use reserve_setting_core::assets::{
    non_empty_address, normalize_address, Asset, AssetExchange, AssetExchangeUpdate, AssetUpdate,
    NewAsset, NewAssetExchange, SetRate,
};
use reserve_setting_core::errors::Result;
use reserve_setting_core::trading_pairs::TradingPair;

use crate::errors::IntoCore;

// Parameter blocks (pwi, quadratic, target) are stored as JSON text.
fn encode_json<T: Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(|v| serde_json::to_string(v))
        .transpose()
        .into_core()
}

fn decode_json<T: DeserializeOwned>(value: Option<String>) -> Result<Option<T>> {
    value
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .into_core()
}

/// Database model for assets
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub address: Option<String>,
    pub decimals: i64,
    pub transferable: bool,
    pub set_rate: String,
    pub rebalance: bool,
    pub is_quote: bool,
    pub pwi: Option<String>,
    pub rebalance_quadratic: Option<String>,
    pub target: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AssetDB {
    /// Builds the domain asset from the row and its already loaded children.
    pub fn into_domain(
        self,
        old_addresses: Vec<String>,
        exchanges: Vec<AssetExchange>,
    ) -> Result<Asset> {
        Ok(Asset {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
            address: self.address,
            old_addresses,
            decimals: self.decimals,
            transferable: self.transferable,
            set_rate: SetRate::from_str(&self.set_rate)?,
            rebalance: self.rebalance,
            is_quote: self.is_quote,
            pwi: decode_json(self.pwi)?,
            rebalance_quadratic: decode_json(self.rebalance_quadratic)?,
            exchanges,
            target: decode_json(self.target)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::assets)]
pub struct NewAssetDB {
    pub symbol: String,
    pub name: String,
    pub address: Option<String>,
    pub decimals: i64,
    pub transferable: bool,
    pub set_rate: String,
    pub rebalance: bool,
    pub is_quote: bool,
    pub pwi: Option<String>,
    pub rebalance_quadratic: Option<String>,
    pub target: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewAssetDB {
    pub fn from_domain(domain: &NewAsset) -> Result<Self> {
        let now = chrono::Utc::now().naive_utc();
        Ok(Self {
            symbol: domain.symbol.clone(),
            name: domain.name.clone(),
            address: non_empty_address(&domain.address).map(normalize_address),
            decimals: domain.decimals,
            transferable: domain.transferable,
            set_rate: domain.set_rate.as_str().to_string(),
            rebalance: domain.rebalance,
            is_quote: domain.is_quote,
            pwi: encode_json(&domain.pwi)?,
            rebalance_quadratic: encode_json(&domain.rebalance_quadratic)?,
            target: encode_json(&domain.target)?,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Changeset for partial asset updates; `None` columns are left untouched.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::assets)]
pub struct AssetChangesetDB {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub decimals: Option<i64>,
    pub transferable: Option<bool>,
    pub set_rate: Option<String>,
    pub rebalance: Option<bool>,
    pub is_quote: Option<bool>,
    pub pwi: Option<String>,
    pub rebalance_quadratic: Option<String>,
    pub target: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl AssetChangesetDB {
    pub fn from_domain(update: &AssetUpdate) -> Result<Self> {
        Ok(Self {
            symbol: update.symbol.clone(),
            name: update.name.clone(),
            address: non_empty_address(&update.address).map(normalize_address),
            decimals: update.decimals,
            transferable: update.transferable,
            set_rate: update.set_rate.map(|r| r.as_str().to_string()),
            rebalance: update.rebalance,
            is_quote: update.is_quote,
            pwi: encode_json(&update.pwi)?,
            rebalance_quadratic: encode_json(&update.rebalance_quadratic)?,
            target: encode_json(&update.target)?,
            updated_at: chrono::Utc::now().naive_utc(),
        })
    }
}

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::asset_old_addresses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetOldAddressDB {
    pub id: i64,
    pub asset_id: i64,
    pub address: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::asset_old_addresses)]
pub struct NewAssetOldAddressDB {
    pub asset_id: i64,
    pub address: String,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::asset_exchanges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetExchangeDB {
    pub id: i64,
    pub asset_id: i64,
    pub exchange_id: i64,
    pub symbol: String,
    pub deposit_address: Option<String>,
    pub min_deposit: f64,
    pub withdraw_fee: f64,
    pub target_recommended: f64,
    pub target_ratio: f64,
}

impl AssetExchangeDB {
    /// Attaches the pairs on this exchange in which the asset is base or quote.
    pub fn into_domain(self, pairs: &[TradingPair]) -> AssetExchange {
        let trading_pairs = pairs
            .iter()
            .filter(|tp| tp.exchange_id == self.exchange_id && tp.involves(self.asset_id))
            .cloned()
            .collect();
        AssetExchange {
            id: self.id,
            asset_id: self.asset_id,
            exchange_id: self.exchange_id,
            symbol: self.symbol,
            deposit_address: self.deposit_address,
            min_deposit: self.min_deposit,
            withdraw_fee: self.withdraw_fee,
            target_recommended: self.target_recommended,
            target_ratio: self.target_ratio,
            trading_pairs,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::asset_exchanges)]
pub struct NewAssetExchangeDB {
    pub asset_id: i64,
    pub exchange_id: i64,
    pub symbol: String,
    pub deposit_address: Option<String>,
    pub min_deposit: f64,
    pub withdraw_fee: f64,
    pub target_recommended: f64,
    pub target_ratio: f64,
}

impl NewAssetExchangeDB {
    pub fn for_asset(asset_id: i64, domain: &NewAssetExchange) -> Self {
        Self {
            asset_id,
            exchange_id: domain.exchange_id,
            symbol: domain.symbol.clone(),
            deposit_address: domain
                .deposit_address
                .clone()
                .filter(|a| !a.trim().is_empty()),
            min_deposit: domain.min_deposit,
            withdraw_fee: domain.withdraw_fee,
            target_recommended: domain.target_recommended,
            target_ratio: domain.target_ratio,
        }
    }
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::asset_exchanges)]
pub struct AssetExchangeChangesetDB {
    pub symbol: Option<String>,
    pub deposit_address: Option<String>,
    pub min_deposit: Option<f64>,
    pub withdraw_fee: Option<f64>,
    pub target_recommended: Option<f64>,
    pub target_ratio: Option<f64>,
}

impl AssetExchangeChangesetDB {
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.deposit_address.is_none()
            && self.min_deposit.is_none()
            && self.withdraw_fee.is_none()
            && self.target_recommended.is_none()
            && self.target_ratio.is_none()
    }
}

impl From<&AssetExchangeUpdate> for AssetExchangeChangesetDB {
    fn from(update: &AssetExchangeUpdate) -> Self {
        Self {
            symbol: update.symbol.clone(),
            deposit_address: update
                .deposit_address
                .clone()
                .filter(|a| !a.trim().is_empty()),
            min_deposit: update.min_deposit,
            withdraw_fee: update.withdraw_fee,
            target_recommended: update.target_recommended,
            target_ratio: update.target_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reserve_setting_core::assets::{AssetTarget, RebalanceQuadratic};

    #[test]
    fn test_new_asset_row_normalizes_address_and_encodes_blocks() {
        let row = NewAssetDB::from_domain(&NewAsset {
            symbol: "KNC".to_string(),
            name: "Kyber Network".to_string(),
            address: Some("0xDD974D5C2E2928DEA5F71B9825B8B646686BD200".to_string()),
            decimals: 18,
            rebalance_quadratic: Some(RebalanceQuadratic {
                a: 1.0,
                b: 2.0,
                c: 3.0,
            }),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            row.address.as_deref(),
            Some("0xdd974d5c2e2928dea5f71b9825b8b646686bd200")
        );
        assert_eq!(row.set_rate, "not_set");
        assert!(row.pwi.is_none());
        let quadratic: RebalanceQuadratic =
            serde_json::from_str(row.rebalance_quadratic.as_deref().unwrap()).unwrap();
        assert_eq!(quadratic.c, 3.0);
    }

    #[test]
    fn test_blank_address_is_stored_as_null() {
        let row = NewAssetDB::from_domain(&NewAsset {
            symbol: "OMG".to_string(),
            name: "OmiseGo".to_string(),
            address: Some(String::new()),
            decimals: 18,
            ..Default::default()
        })
        .unwrap();
        assert!(row.address.is_none());

        let changes = AssetChangesetDB::from_domain(&AssetUpdate {
            asset_id: 1,
            address: Some(" ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(changes.address.is_none());
    }

    #[test]
    fn test_corrupt_json_column_is_an_error() {
        let now = chrono::Utc::now().naive_utc();
        let row = AssetDB {
            id: 1,
            symbol: "ETH".to_string(),
            name: "Ether".to_string(),
            address: None,
            decimals: 18,
            transferable: false,
            set_rate: "not_set".to_string(),
            rebalance: false,
            is_quote: true,
            pwi: None,
            rebalance_quadratic: None,
            target: Some("{not json".to_string()),
            created_at: now,
            updated_at: now,
        };
        assert!(row.clone().into_domain(vec![], vec![]).is_err());

        let row = AssetDB {
            target: Some(serde_json::to_string(&AssetTarget::default()).unwrap()),
            ..row
        };
        let asset = row.into_domain(vec![], vec![]).unwrap();
        assert_eq!(asset.target, Some(AssetTarget::default()));
    }
}
