use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::exchange_info::LiveExchangeInfoProvider;
use super::setting_change_config::SettingChangeConfig;
use super::setting_change_enricher::ExchangeInfoEnricher;
use super::setting_change_model::{ChangeCatalog, SettingChange, SettingChangeProposal};
use super::setting_change_traits::{SettingChangeApplierTrait, SettingChangeServiceTrait};
use super::setting_change_validator::SettingChangeValidator;
use crate::assets::AssetRepositoryTrait;
use crate::errors::{Result, ValidationError};
use crate::exchanges::ExchangeRepositoryTrait;
use crate::pending::PendingObjectRepositoryTrait;
use crate::trading_pairs::TradingPairRepositoryTrait;

/// Stages, lists, confirms and rejects setting changes.
pub struct SettingChangeService {
    validator: SettingChangeValidator,
    enricher: Option<ExchangeInfoEnricher>,
    pending_repository: Arc<dyn PendingObjectRepositoryTrait>,
    applier: Arc<dyn SettingChangeApplierTrait>,
    config: SettingChangeConfig,
}

impl SettingChangeService {
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        exchange_repository: Arc<dyn ExchangeRepositoryTrait>,
        trading_pair_repository: Arc<dyn TradingPairRepositoryTrait>,
        pending_repository: Arc<dyn PendingObjectRepositoryTrait>,
        applier: Arc<dyn SettingChangeApplierTrait>,
        config: SettingChangeConfig,
    ) -> Self {
        Self {
            validator: SettingChangeValidator::new(
                asset_repository,
                exchange_repository,
                trading_pair_repository,
            ),
            enricher: None,
            pending_repository,
            applier,
            config,
        }
    }

    /// Enables enrichment of created trading pairs with live venue data.
    pub fn with_exchange_info(
        mut self,
        provider: Arc<dyn LiveExchangeInfoProvider>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
    ) -> Self {
        self.enricher = Some(ExchangeInfoEnricher::new(
            provider,
            asset_repository,
            self.config.enrichment_policy,
        ));
        self
    }

    pub fn config(&self) -> &SettingChangeConfig {
        &self.config
    }
}

#[async_trait]
impl SettingChangeServiceTrait for SettingChangeService {
    async fn stage_change(&self, catalog: ChangeCatalog, mut change: SettingChange) -> Result<i64> {
        if change.change_list.is_empty() {
            return Err(ValidationError::InvalidInput("change list is empty".to_string()).into());
        }

        self.validator.validate(&change)?;

        match &self.enricher {
            Some(enricher) => enricher.enrich(&mut change).await?,
            None => debug!("No live exchange info provider, staging {} as supplied", catalog),
        }

        let singleton = self.config.is_singleton(catalog);
        let id = self
            .pending_repository
            .stage(catalog.as_str(), change.to_payload()?, singleton)
            .await?;
        info!(
            "Staged {} proposal {} with {} entries{}",
            catalog,
            id,
            change.change_list.len(),
            if singleton { " (singleton)" } else { "" }
        );
        Ok(id)
    }

    fn get_proposal(&self, catalog: ChangeCatalog, id: i64) -> Result<SettingChangeProposal> {
        let object = self.pending_repository.get(catalog.as_str(), id)?;
        SettingChangeProposal::from_pending(catalog, &object)
    }

    fn list_proposals(&self, catalog: ChangeCatalog) -> Result<Vec<SettingChangeProposal>> {
        self.pending_repository
            .list(catalog.as_str())?
            .iter()
            .map(|object| SettingChangeProposal::from_pending(catalog, object))
            .collect()
    }

    async fn confirm_proposal(&self, catalog: ChangeCatalog, id: i64) -> Result<()> {
        match self.applier.confirm(catalog.as_str(), id).await {
            Ok(()) => {
                info!("Confirmed {} proposal {}", catalog, id);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to confirm {} proposal {}: {}", catalog, id, e);
                Err(e)
            }
        }
    }

    async fn reject_proposal(&self, catalog: ChangeCatalog, id: i64) -> Result<()> {
        self.pending_repository.delete(catalog.as_str(), id).await?;
        info!("Rejected {} proposal {}", catalog, id);
        Ok(())
    }
}
