//! Assets module - domain models and traits for reserve assets and their
//! exchange links.

mod assets_model;
mod assets_traits;


pub use assets_model::{
    non_empty_address, normalize_address, validate_address, Asset, AssetExchange,
    AssetExchangeUpdate, AssetPwi, AssetTarget, AssetUpdate, ChangeAssetAddress, NewAsset,
    NewAssetExchange, PwiEquation, RebalanceQuadratic, SetRate,
};
pub use assets_traits::AssetRepositoryTrait;
