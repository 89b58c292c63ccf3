use super::assets_model::{
    Asset, AssetExchange, AssetExchangeUpdate, AssetUpdate, ChangeAssetAddress, NewAsset,
    NewAssetExchange,
};
use crate::errors::Result;

/// Trait defining the contract for Asset and AssetExchange repository operations.
#[async_trait::async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    /// Retrieves an asset with its old addresses, exchanges and trading pairs.
    fn get_by_id(&self, asset_id: i64) -> Result<Asset>;
    fn list(&self) -> Result<Vec<Asset>>;
    fn find_by_symbol(&self, symbol: &str) -> Result<Option<Asset>>;

    /// True if any asset uses `address` as its current or a superseded address.
    fn is_address_in_use(&self, address: &str) -> Result<bool>;

    fn get_asset_exchange(&self, asset_exchange_id: i64) -> Result<AssetExchange>;
    fn find_asset_exchange(&self, asset_id: i64, exchange_id: i64)
        -> Result<Option<AssetExchange>>;

    /// Creates the asset, its exchange links, their trading pairs and the
    /// trading-by associations. Returns the new asset id.
    async fn create(&self, new_asset: NewAsset) -> Result<i64>;
    async fn update(&self, update: AssetUpdate) -> Result<()>;
    /// Archives the current address and sets the new one.
    async fn change_address(&self, change: ChangeAssetAddress) -> Result<()>;

    async fn create_asset_exchange(&self, new_asset_exchange: NewAssetExchange) -> Result<i64>;
    async fn update_asset_exchange(&self, update: AssetExchangeUpdate) -> Result<()>;
    /// Fails with `DeleteViolation` while trading pairs on that exchange
    /// still involve the asset.
    async fn delete_asset_exchange(&self, asset_exchange_id: i64) -> Result<()>;
}
