//! Setting change module - staged, validated, all-or-nothing configuration
//! changes.

mod exchange_info;
mod setting_change_config;
mod setting_change_enricher;
mod setting_change_model;
mod setting_change_service;
mod setting_change_traits;
mod setting_change_validator;

#[cfg(test)]
mod setting_change_service_tests;

pub use exchange_info::{LiveExchangeInfoProvider, LiveTradingInfo, TradingPairSymbols};
pub use setting_change_config::{EnrichmentPolicy, SettingChangeConfig};
pub use setting_change_enricher::ExchangeInfoEnricher;
pub use setting_change_model::{
    ChangeCatalog, SettingChange, SettingChangeEntry, SettingChangeProposal,
};
pub use setting_change_service::SettingChangeService;
pub use setting_change_traits::{SettingChangeApplierTrait, SettingChangeServiceTrait};
pub use setting_change_validator::SettingChangeValidator;
