//! Setting change domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::assets::{
    AssetExchangeUpdate, AssetUpdate, ChangeAssetAddress, NewAsset, NewAssetExchange,
};
use crate::errors::{Error, Result, ValidationError};
use crate::exchanges::ExchangeUpdate;
use crate::pending::PendingObject;
use crate::trading_pairs::{CreateTradingPair, NewTradingBy, TradingPairUpdate};

/// The pending-object kind a setting change is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCatalog {
    SettingChangeMain,
    SettingChangeTarget,
    SettingChangePwis,
    SettingChangeRebalance,
    SettingChangeUpdateExchange,
}

impl ChangeCatalog {
    pub const ALL: [ChangeCatalog; 5] = [
        ChangeCatalog::SettingChangeMain,
        ChangeCatalog::SettingChangeTarget,
        ChangeCatalog::SettingChangePwis,
        ChangeCatalog::SettingChangeRebalance,
        ChangeCatalog::SettingChangeUpdateExchange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCatalog::SettingChangeMain => "setting_change_main",
            ChangeCatalog::SettingChangeTarget => "setting_change_target",
            ChangeCatalog::SettingChangePwis => "setting_change_pwis",
            ChangeCatalog::SettingChangeRebalance => "setting_change_rebalance",
            ChangeCatalog::SettingChangeUpdateExchange => "setting_change_update_exchange",
        }
    }
}

impl fmt::Display for ChangeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeCatalog {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ChangeCatalog::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!("unknown change catalog '{}'", s)).into()
            })
    }
}

/// One typed entry of a setting change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SettingChangeEntry {
    CreateAsset(NewAsset),
    UpdateAsset(AssetUpdate),
    CreateAssetExchange(NewAssetExchange),
    UpdateAssetExchange(AssetExchangeUpdate),
    CreateTradingPair(CreateTradingPair),
    UpdateTradingPair(TradingPairUpdate),
    CreateTradingBy(NewTradingBy),
    ChangeAssetAddr(ChangeAssetAddress),
    UpdateExchange(ExchangeUpdate),
    #[serde(rename_all = "camelCase")]
    DeleteTradingPair { trading_pair_id: i64 },
    #[serde(rename_all = "camelCase")]
    DeleteAssetExchange { asset_exchange_id: i64 },
}

impl SettingChangeEntry {
    /// The `type` tag of the entry.
    pub fn change_type(&self) -> &'static str {
        match self {
            SettingChangeEntry::CreateAsset(_) => "create_asset",
            SettingChangeEntry::UpdateAsset(_) => "update_asset",
            SettingChangeEntry::CreateAssetExchange(_) => "create_asset_exchange",
            SettingChangeEntry::UpdateAssetExchange(_) => "update_asset_exchange",
            SettingChangeEntry::CreateTradingPair(_) => "create_trading_pair",
            SettingChangeEntry::UpdateTradingPair(_) => "update_trading_pair",
            SettingChangeEntry::CreateTradingBy(_) => "create_trading_by",
            SettingChangeEntry::ChangeAssetAddr(_) => "change_asset_addr",
            SettingChangeEntry::UpdateExchange(_) => "update_exchange",
            SettingChangeEntry::DeleteTradingPair { .. } => "delete_trading_pair",
            SettingChangeEntry::DeleteAssetExchange { .. } => "delete_asset_exchange",
        }
    }
}

/// An ordered batch of entries applied all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SettingChange {
    pub change_list: Vec<SettingChangeEntry>,
}

impl SettingChange {
    pub fn new(change_list: Vec<SettingChangeEntry>) -> Self {
        Self { change_list }
    }

    pub fn from_payload(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A staged setting change as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingChangeProposal {
    pub id: i64,
    pub catalog: ChangeCatalog,
    pub change: SettingChange,
    pub created_at: NaiveDateTime,
}

impl SettingChangeProposal {
    pub fn from_pending(catalog: ChangeCatalog, object: &PendingObject) -> Result<Self> {
        Ok(Self {
            id: object.id,
            catalog,
            change: SettingChange::from_payload(&object.payload)?,
            created_at: object.created_at,
        })
    }
}
