use async_trait::async_trait;

use super::exchanges_model::{Exchange, ExchangeUpdate, NewExchange};
use crate::errors::Result;

/// Trait defining the contract for Exchange repository operations.
#[async_trait]
pub trait ExchangeRepositoryTrait: Send + Sync {
    /// Retrieves an exchange by its ID. Fails with `NotFound` if absent.
    fn get_by_id(&self, exchange_id: i64) -> Result<Exchange>;

    fn list(&self) -> Result<Vec<Exchange>>;

    async fn create(&self, new_exchange: NewExchange) -> Result<i64>;

    /// Updates fees and the disabled flag. Enabling an exchange without both
    /// fees fails with `ExchangeFeeMissing`.
    async fn update(&self, update: ExchangeUpdate) -> Result<()>;
}
