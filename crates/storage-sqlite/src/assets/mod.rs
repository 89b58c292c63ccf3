//! SQLite storage implementation for assets and asset exchanges.

mod model;
mod repository;

pub use model::{
    AssetChangesetDB, AssetDB, AssetExchangeChangesetDB, AssetExchangeDB, AssetOldAddressDB,
    NewAssetDB, NewAssetExchangeDB, NewAssetOldAddressDB,
};
pub use repository::AssetRepository;
pub(crate) use repository::{
    change_asset_address, create_asset, create_asset_exchange, delete_asset_exchange,
    find_asset_row, is_listed_on, require_asset_row, update_asset, update_asset_exchange,
};
