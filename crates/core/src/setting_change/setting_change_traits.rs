use async_trait::async_trait;

use super::setting_change_model::{ChangeCatalog, SettingChange, SettingChangeProposal};
use crate::errors::Result;

/// Applies a staged setting change and removes it, all in one transaction.
#[async_trait]
pub trait SettingChangeApplierTrait: Send + Sync {
    /// Fails with `NotFound` if no pending object `(kind, id)` exists. A
    /// failing entry is reported as `ChangeEntry { index, .. }` and nothing
    /// is written.
    async fn confirm(&self, kind: &str, id: i64) -> Result<()>;
}

/// Trait defining the contract for setting change operations.
#[async_trait]
pub trait SettingChangeServiceTrait: Send + Sync {
    /// Validates, enriches and stages a change. Returns the proposal id.
    async fn stage_change(&self, catalog: ChangeCatalog, change: SettingChange) -> Result<i64>;

    fn get_proposal(&self, catalog: ChangeCatalog, id: i64) -> Result<SettingChangeProposal>;

    fn list_proposals(&self, catalog: ChangeCatalog) -> Result<Vec<SettingChangeProposal>>;

    async fn confirm_proposal(&self, catalog: ChangeCatalog, id: i64) -> Result<()>;

    async fn reject_proposal(&self, catalog: ChangeCatalog, id: i64) -> Result<()>;
}
