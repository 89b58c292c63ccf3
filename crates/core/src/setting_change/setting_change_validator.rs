//! Precondition checks run before a setting change is staged.
//!
//! Entries are applied in order, so an entry may depend on rows that an
//! earlier entry of the same change writes. Such an entry gets only its local
//! checks here; the applier enforces the rest at confirm time.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use super::setting_change_model::{SettingChange, SettingChangeEntry};
use crate::assets::{
    non_empty_address, normalize_address, validate_address, Asset, AssetExchangeUpdate,
    AssetRepositoryTrait, AssetUpdate, ChangeAssetAddress, NewAsset, NewAssetExchange,
};
use crate::errors::{Error, Result, SettingError};
use crate::exchanges::ExchangeRepositoryTrait;
use crate::trading_pairs::{CreateTradingPair, NewTradingBy, TradingPairRepositoryTrait};

/// Stored entity sets touched by setting change entries. Exchanges are
/// absent: no entry creates or removes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Entities {
    Assets,
    AssetExchanges,
    TradingPairs,
    TradingBy,
}

/// Entity sets the stored-state checks of `entry` read.
fn reads(entry: &SettingChangeEntry) -> &'static [Entities] {
    use Entities::*;
    match entry {
        SettingChangeEntry::CreateAsset(_) => &[Assets, AssetExchanges],
        SettingChangeEntry::UpdateAsset(_) => &[Assets, AssetExchanges, TradingPairs],
        SettingChangeEntry::CreateAssetExchange(_) => &[Assets, AssetExchanges],
        SettingChangeEntry::UpdateAssetExchange(_) => &[Assets, AssetExchanges],
        SettingChangeEntry::CreateTradingPair(_) => &[Assets, AssetExchanges, TradingPairs],
        SettingChangeEntry::UpdateTradingPair(_) => &[TradingPairs],
        SettingChangeEntry::CreateTradingBy(_) => &[Assets, TradingPairs, TradingBy],
        SettingChangeEntry::ChangeAssetAddr(_) => &[Assets],
        SettingChangeEntry::UpdateExchange(_) => &[],
        SettingChangeEntry::DeleteTradingPair { .. } => &[TradingPairs],
        SettingChangeEntry::DeleteAssetExchange { .. } => &[AssetExchanges, TradingPairs],
    }
}

/// Entity sets applying `entry` writes.
fn writes(entry: &SettingChangeEntry) -> &'static [Entities] {
    use Entities::*;
    match entry {
        SettingChangeEntry::CreateAsset(_) => &[Assets, AssetExchanges, TradingPairs, TradingBy],
        SettingChangeEntry::UpdateAsset(_) => &[Assets],
        SettingChangeEntry::CreateAssetExchange(_) => &[AssetExchanges, TradingPairs, TradingBy],
        SettingChangeEntry::UpdateAssetExchange(_) => &[AssetExchanges],
        SettingChangeEntry::CreateTradingPair(_) => &[TradingPairs, TradingBy],
        SettingChangeEntry::UpdateTradingPair(_) => &[TradingPairs],
        SettingChangeEntry::CreateTradingBy(_) => &[TradingBy],
        SettingChangeEntry::ChangeAssetAddr(_) => &[Assets],
        SettingChangeEntry::UpdateExchange(_) => &[],
        SettingChangeEntry::DeleteTradingPair { .. } => &[TradingPairs, TradingBy],
        SettingChangeEntry::DeleteAssetExchange { .. } => &[AssetExchanges],
    }
}

pub struct SettingChangeValidator {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    exchange_repository: Arc<dyn ExchangeRepositoryTrait>,
    trading_pair_repository: Arc<dyn TradingPairRepositoryTrait>,
}

impl SettingChangeValidator {
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        exchange_repository: Arc<dyn ExchangeRepositoryTrait>,
        trading_pair_repository: Arc<dyn TradingPairRepositoryTrait>,
    ) -> Self {
        Self {
            asset_repository,
            exchange_repository,
            trading_pair_repository,
        }
    }

    /// Validates the entries in order. An entry whose stored-state checks
    /// read entities written by an earlier entry is checked locally only.
    /// The first failure is returned annotated with its index.
    pub fn validate(&self, change: &SettingChange) -> Result<()> {
        let mut written: HashSet<Entities> = HashSet::new();
        for (index, entry) in change.change_list.iter().enumerate() {
            let result = if reads(entry).iter().any(|e| written.contains(e)) {
                debug!(
                    "Deferring stored-state checks of {} entry at index {}",
                    entry.change_type(),
                    index
                );
                self.check_local(entry)
            } else {
                debug!("Validating {} entry at index {}", entry.change_type(), index);
                self.validate_entry(entry)
            };
            result.map_err(|e| e.at_entry(index))?;
            written.extend(writes(entry).iter().copied());
        }
        Ok(())
    }

    /// Local and stored-state checks of a single entry.
    fn validate_entry(&self, entry: &SettingChangeEntry) -> Result<()> {
        self.check_local(entry)?;
        self.check_stored_state(entry)
    }

    /// Rules that need nothing but the entry itself.
    fn check_local(&self, entry: &SettingChangeEntry) -> Result<()> {
        match entry {
            SettingChangeEntry::CreateAsset(new_asset) => new_asset.validate(),
            SettingChangeEntry::UpdateAsset(update) => match non_empty_address(&update.address) {
                Some(address) => validate_address(address),
                None => Ok(()),
            },
            SettingChangeEntry::CreateAssetExchange(new_asset_exchange) => {
                if let Some(address) = non_empty_address(&new_asset_exchange.deposit_address) {
                    validate_address(address)?;
                }
                for pair in &new_asset_exchange.trading_pairs {
                    pair.implicit_leg()?;
                }
                Ok(())
            }
            SettingChangeEntry::CreateTradingPair(entry) => {
                let (base, quote) = entry.trading_pair.resolve_legs(entry.asset_id)?;
                if base == quote {
                    return Err(SettingError::BadTradingPairConfiguration.into());
                }
                if entry.asset_id != base && entry.asset_id != quote {
                    return Err(SettingError::TradingByAssetIdInvalid.into());
                }
                Ok(())
            }
            SettingChangeEntry::ChangeAssetAddr(change) => validate_address(&change.address),
            SettingChangeEntry::UpdateAssetExchange(_)
            | SettingChangeEntry::UpdateTradingPair(_)
            | SettingChangeEntry::CreateTradingBy(_)
            | SettingChangeEntry::UpdateExchange(_)
            | SettingChangeEntry::DeleteTradingPair { .. }
            | SettingChangeEntry::DeleteAssetExchange { .. } => Ok(()),
        }
    }

    fn check_stored_state(&self, entry: &SettingChangeEntry) -> Result<()> {
        match entry {
            SettingChangeEntry::CreateAsset(new_asset) => self.check_create_asset(new_asset),
            SettingChangeEntry::UpdateAsset(update) => self.check_update_asset(update),
            SettingChangeEntry::CreateAssetExchange(new_asset_exchange) => {
                self.check_create_asset_exchange(new_asset_exchange)
            }
            SettingChangeEntry::UpdateAssetExchange(update) => {
                self.check_update_asset_exchange(update)
            }
            SettingChangeEntry::CreateTradingPair(entry) => self.check_create_trading_pair(entry),
            SettingChangeEntry::UpdateTradingPair(update) => self
                .trading_pair_repository
                .get_by_id(update.trading_pair_id)
                .map(|_| ()),
            SettingChangeEntry::CreateTradingBy(trading_by) => {
                self.check_create_trading_by(trading_by)
            }
            SettingChangeEntry::ChangeAssetAddr(change) => self.check_change_asset_address(change),
            SettingChangeEntry::UpdateExchange(_) => Ok(()),
            SettingChangeEntry::DeleteTradingPair { trading_pair_id } => self
                .trading_pair_repository
                .get_by_id(*trading_pair_id)
                .map(|_| ()),
            SettingChangeEntry::DeleteAssetExchange { asset_exchange_id } => {
                self.check_delete_asset_exchange(*asset_exchange_id)
            }
        }
    }

    fn check_create_asset(&self, new_asset: &NewAsset) -> Result<()> {
        if self
            .asset_repository
            .find_by_symbol(&new_asset.symbol)?
            .is_some()
        {
            return Err(SettingError::SymbolExists.into());
        }
        if let Some(address) = non_empty_address(&new_asset.address) {
            if self.asset_repository.is_address_in_use(address)? {
                return Err(SettingError::AddressExists.into());
            }
        }
        for asset_exchange in &new_asset.exchanges {
            self.require_exchange(asset_exchange.exchange_id)?;
            for pair in &asset_exchange.trading_pairs {
                // The new asset fills the implicit leg; only the other leg is stored.
                let (base, quote) = pair.resolve_implicit_leg(0)?;
                self.check_explicit_leg(asset_exchange.exchange_id, base, quote)?;
            }
        }
        Ok(())
    }

    fn check_update_asset(&self, update: &AssetUpdate) -> Result<()> {
        let existing = self.asset_repository.get_by_id(update.asset_id)?;
        update.validate_against(&existing)?;

        if let Some(symbol) = &update.symbol {
            if let Some(other) = self.asset_repository.find_by_symbol(symbol)? {
                if other.id != existing.id {
                    return Err(SettingError::SymbolExists.into());
                }
            }
        }
        if let Some(address) = non_empty_address(&update.address) {
            self.check_address_free_for(&existing, address)?;
        }
        Ok(())
    }

    fn check_create_asset_exchange(&self, new_asset_exchange: &NewAssetExchange) -> Result<()> {
        let asset = self.require_asset(new_asset_exchange.asset_id)?;
        self.require_exchange(new_asset_exchange.exchange_id)?;
        if asset.exchange(new_asset_exchange.exchange_id).is_some() {
            return Err(SettingError::AssetExchangeAlreadyExist.into());
        }
        new_asset_exchange.validate_for(asset.transferable, asset.is_quote)?;
        for pair in &new_asset_exchange.trading_pairs {
            let (base, quote) = pair.resolve_implicit_leg(0)?;
            if base == asset.id || quote == asset.id {
                return Err(SettingError::BadTradingPairConfiguration.into());
            }
            self.check_explicit_leg(new_asset_exchange.exchange_id, base, quote)?;
        }
        Ok(())
    }

    fn check_update_asset_exchange(&self, update: &AssetExchangeUpdate) -> Result<()> {
        let existing = self
            .asset_repository
            .get_asset_exchange(update.asset_exchange_id)?;
        let asset = self.asset_repository.get_by_id(existing.asset_id)?;
        update.validate_against(&existing, &asset)
    }

    fn check_create_trading_pair(&self, entry: &CreateTradingPair) -> Result<()> {
        self.require_exchange(entry.exchange_id)?;
        let (base, quote) = entry.trading_pair.resolve_legs(entry.asset_id)?;
        let base_asset = self
            .lookup_asset(base)?
            .ok_or(SettingError::BaseAssetInvalid)?;
        let quote_asset = self
            .lookup_asset(quote)?
            .ok_or(SettingError::QuoteAssetInvalid)?;
        if !quote_asset.is_quote {
            return Err(SettingError::QuoteAssetInvalid.into());
        }
        if base_asset.exchange(entry.exchange_id).is_none() {
            return Err(SettingError::BaseAssetInvalid.into());
        }
        if quote_asset.exchange(entry.exchange_id).is_none() {
            return Err(SettingError::QuoteAssetInvalid.into());
        }

        let duplicate = self
            .trading_pair_repository
            .list_by_asset_on_exchange(base, entry.exchange_id)?
            .iter()
            .any(|tp| tp.base == base && tp.quote == quote);
        if duplicate {
            return Err(SettingError::TradingPairAlreadyExists.into());
        }
        Ok(())
    }

    fn check_create_trading_by(&self, trading_by: &NewTradingBy) -> Result<()> {
        let trading_pair = self
            .trading_pair_repository
            .get_by_id(trading_by.trading_pair_id)?;
        self.require_asset(trading_by.asset_id)?;
        if !trading_pair.involves(trading_by.asset_id) {
            return Err(SettingError::TradingByAssetIdInvalid.into());
        }
        if self
            .trading_pair_repository
            .find_trading_by(trading_by.asset_id, trading_by.trading_pair_id)?
            .is_some()
        {
            return Err(SettingError::TradingByAlreadyExists.into());
        }
        Ok(())
    }

    fn check_change_asset_address(&self, change: &ChangeAssetAddress) -> Result<()> {
        let asset = self.asset_repository.get_by_id(change.asset_id)?;
        if self.asset_repository.is_address_in_use(&change.address)? {
            return Err(SettingError::AddressExists.into());
        }
        debug!("Asset {} address change to {} accepted", asset.id, change.address);
        Ok(())
    }

    fn check_delete_asset_exchange(&self, asset_exchange_id: i64) -> Result<()> {
        let asset_exchange = self.asset_repository.get_asset_exchange(asset_exchange_id)?;
        let dependents = self
            .trading_pair_repository
            .list_by_asset_on_exchange(asset_exchange.asset_id, asset_exchange.exchange_id)?;
        if !dependents.is_empty() {
            return Err(SettingError::DeleteViolation(format!(
                "asset exchange {} still has {} trading pair(s)",
                asset_exchange_id,
                dependents.len()
            ))
            .into());
        }
        Ok(())
    }

    /// Checks the stored leg of a pair whose other leg is the asset being
    /// configured (`0`). The stored leg must be listed on the same exchange.
    fn check_explicit_leg(&self, exchange_id: i64, base: i64, quote: i64) -> Result<()> {
        if base != 0 {
            match self.lookup_asset(base)? {
                Some(asset) if asset.exchange(exchange_id).is_some() => {}
                _ => return Err(SettingError::BaseAssetInvalid.into()),
            }
        }
        if quote != 0 {
            match self.lookup_asset(quote)? {
                Some(asset) if asset.is_quote && asset.exchange(exchange_id).is_some() => {}
                _ => return Err(SettingError::QuoteAssetInvalid.into()),
            }
        }
        Ok(())
    }

    fn check_address_free_for(&self, asset: &Asset, address: &str) -> Result<()> {
        let unchanged = asset
            .address
            .as_deref()
            .is_some_and(|current| normalize_address(current) == normalize_address(address));
        if !unchanged && self.asset_repository.is_address_in_use(address)? {
            return Err(SettingError::AddressExists.into());
        }
        Ok(())
    }

    fn lookup_asset(&self, asset_id: i64) -> Result<Option<Asset>> {
        match self.asset_repository.get_by_id(asset_id) {
            Ok(asset) => Ok(Some(asset)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn require_asset(&self, asset_id: i64) -> Result<Asset> {
        self.lookup_asset(asset_id)?
            .ok_or_else(|| Error::from(SettingError::AssetNotExists))
    }

    fn require_exchange(&self, exchange_id: i64) -> Result<()> {
        match self.exchange_repository.get_by_id(exchange_id) {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(SettingError::ExchangeNotExists.into()),
            Err(e) => Err(e),
        }
    }
}
