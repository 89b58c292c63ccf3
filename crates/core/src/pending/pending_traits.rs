use async_trait::async_trait;

use super::pending_model::PendingObject;
use crate::errors::Result;

/// Trait defining the contract for the pending object store.
#[async_trait]
pub trait PendingObjectRepositoryTrait: Send + Sync {
    /// Persists a payload under `kind` and returns its id. When `singleton`
    /// is set, existing objects of the same kind are removed in the same
    /// transaction.
    async fn stage(&self, kind: &str, payload: String, singleton: bool) -> Result<i64>;

    /// Fails with `NotFound` if the object is absent or filed under another kind.
    fn get(&self, kind: &str, id: i64) -> Result<PendingObject>;

    /// Objects of `kind` ordered by id.
    fn list(&self, kind: &str) -> Result<Vec<PendingObject>>;

    /// Fails with `NotFound` if nothing was deleted.
    async fn delete(&self, kind: &str, id: i64) -> Result<()>;
}
