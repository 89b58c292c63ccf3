use async_trait::async_trait;

use super::trading_pairs_model::{
    CreateTradingPair, NewTradingBy, TradingBy, TradingPair, TradingPairUpdate,
};
use crate::errors::Result;

/// Trait defining the contract for TradingPair and TradingBy repository operations.
#[async_trait]
pub trait TradingPairRepositoryTrait: Send + Sync {
    /// Retrieves a trading pair by its ID. Fails with `NotFound` if absent.
    fn get_by_id(&self, trading_pair_id: i64) -> Result<TradingPair>;

    fn list_by_exchange(&self, exchange_id: i64) -> Result<Vec<TradingPair>>;

    /// Trading pairs on `exchange_id` in which `asset_id` is base or quote.
    fn list_by_asset_on_exchange(&self, asset_id: i64, exchange_id: i64)
        -> Result<Vec<TradingPair>>;

    fn find_trading_by(&self, asset_id: i64, trading_pair_id: i64) -> Result<Option<TradingBy>>;

    /// Creates the trading pair and the trading-by association of the
    /// declaring asset. Returns the new trading pair id.
    async fn create(&self, entry: CreateTradingPair) -> Result<i64>;

    async fn update(&self, update: TradingPairUpdate) -> Result<()>;

    /// Deletes a trading pair together with its trading-by associations.
    async fn delete(&self, trading_pair_id: i64) -> Result<()>;

    async fn create_trading_by(&self, trading_by: NewTradingBy) -> Result<i64>;
}
