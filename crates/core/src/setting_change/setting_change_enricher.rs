//! Fills trading pair precision and limits from live venue data before a
//! change is staged.

use std::sync::Arc;

use log::{debug, warn};

use super::exchange_info::{LiveExchangeInfoProvider, TradingPairSymbols};
use super::setting_change_config::EnrichmentPolicy;
use super::setting_change_model::{SettingChange, SettingChangeEntry};
use crate::assets::AssetRepositoryTrait;
use crate::errors::{Error, Result};
use crate::trading_pairs::NewTradingPair;

pub struct ExchangeInfoEnricher {
    provider: Arc<dyn LiveExchangeInfoProvider>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    policy: EnrichmentPolicy,
}

impl ExchangeInfoEnricher {
    pub fn new(
        provider: Arc<dyn LiveExchangeInfoProvider>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        policy: EnrichmentPolicy,
    ) -> Self {
        Self {
            provider,
            asset_repository,
            policy,
        }
    }

    pub async fn enrich(&self, change: &mut SettingChange) -> Result<()> {
        for (index, entry) in change.change_list.iter_mut().enumerate() {
            self.enrich_entry(entry)
                .await
                .map_err(|e| e.at_entry(index))?;
        }
        Ok(())
    }

    async fn enrich_entry(&self, entry: &mut SettingChangeEntry) -> Result<()> {
        match entry {
            SettingChangeEntry::CreateAsset(new_asset) => {
                for asset_exchange in new_asset.exchanges.iter_mut() {
                    let own_symbol = asset_exchange.symbol.clone();
                    self.enrich_pairs(
                        asset_exchange.exchange_id,
                        &own_symbol,
                        &mut asset_exchange.trading_pairs,
                    )
                    .await?;
                }
                Ok(())
            }
            SettingChangeEntry::CreateAssetExchange(asset_exchange) => {
                let own_symbol = asset_exchange.symbol.clone();
                self.enrich_pairs(
                    asset_exchange.exchange_id,
                    &own_symbol,
                    &mut asset_exchange.trading_pairs,
                )
                .await
            }
            SettingChangeEntry::CreateTradingPair(entry) => {
                let (base, quote) = entry.trading_pair.resolve_legs(entry.asset_id)?;
                let (Some(base_symbol), Some(quote_symbol)) = (
                    self.symbol_on_exchange(base, entry.exchange_id)?,
                    self.symbol_on_exchange(quote, entry.exchange_id)?,
                ) else {
                    return self.tolerate(unresolved_symbols(entry.exchange_id));
                };
                let symbols = [TradingPairSymbols {
                    base_symbol,
                    quote_symbol,
                }];
                self.fetch_and_apply(
                    entry.exchange_id,
                    &symbols,
                    std::slice::from_mut(&mut entry.trading_pair),
                )
                .await
            }
            _ => Ok(()),
        }
    }

    /// Pairs declared for an asset that is being configured; its venue
    /// symbol fills the implicit leg.
    async fn enrich_pairs(
        &self,
        exchange_id: i64,
        own_symbol: &str,
        pairs: &mut [NewTradingPair],
    ) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let mut symbols = Vec::with_capacity(pairs.len());
        for pair in pairs.iter() {
            let (base, quote) = pair.resolve_implicit_leg(0)?;
            let base_symbol = if base == 0 {
                Some(own_symbol.to_string())
            } else {
                self.symbol_on_exchange(base, exchange_id)?
            };
            let quote_symbol = if quote == 0 {
                Some(own_symbol.to_string())
            } else {
                self.symbol_on_exchange(quote, exchange_id)?
            };
            let (Some(base_symbol), Some(quote_symbol)) = (base_symbol, quote_symbol) else {
                return self.tolerate(unresolved_symbols(exchange_id));
            };
            symbols.push(TradingPairSymbols {
                base_symbol,
                quote_symbol,
            });
        }
        self.fetch_and_apply(exchange_id, &symbols, pairs).await
    }

    async fn fetch_and_apply(
        &self,
        exchange_id: i64,
        symbols: &[TradingPairSymbols],
        pairs: &mut [NewTradingPair],
    ) -> Result<()> {
        let infos = match self
            .provider
            .get_live_trading_info(exchange_id, symbols)
            .await
        {
            Ok(infos) => infos,
            Err(e) => {
                return self.tolerate(Error::ExchangeInfo(format!(
                    "exchange {}: {}",
                    exchange_id, e
                )))
            }
        };

        for (i, pair) in pairs.iter_mut().enumerate() {
            match infos.get(&i) {
                Some(info) => {
                    debug!(
                        "Live trading info for {}/{} on exchange {}: {:?}",
                        symbols[i].base_symbol, symbols[i].quote_symbol, exchange_id, info
                    );
                    pair.apply_live_info(info);
                }
                None => self.tolerate(Error::ExchangeInfo(format!(
                    "no trading info for {}/{} on exchange {}",
                    symbols[i].base_symbol, symbols[i].quote_symbol, exchange_id
                )))?,
            }
        }
        Ok(())
    }

    fn tolerate(&self, err: Error) -> Result<()> {
        match self.policy {
            EnrichmentPolicy::Strict => Err(err),
            EnrichmentPolicy::BestEffort => {
                warn!("Staging with supplied trading pair values: {}", err);
                Ok(())
            }
        }
    }

    /// `None` when the asset is not stored yet, e.g. an earlier entry of the
    /// same change creates it.
    fn symbol_on_exchange(&self, asset_id: i64, exchange_id: i64) -> Result<Option<String>> {
        if let Some(asset_exchange) = self
            .asset_repository
            .find_asset_exchange(asset_id, exchange_id)?
        {
            return Ok(Some(asset_exchange.symbol));
        }
        match self.asset_repository.get_by_id(asset_id) {
            Ok(asset) => Ok(Some(asset.symbol)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn unresolved_symbols(exchange_id: i64) -> Error {
    Error::ExchangeInfo(format!(
        "trading pair legs not yet stored on exchange {}",
        exchange_id
    ))
}
