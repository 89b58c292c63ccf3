//! SQLite storage implementation for trading pairs and trading-by associations.

mod model;
mod repository;

pub use model::{NewTradingByDB, NewTradingPairDB, TradingByDB, TradingPairChangesetDB, TradingPairDB};
pub use repository::TradingPairRepository;
pub(crate) use repository::{
    create_trading_by, create_trading_pair, delete_trading_pair, insert_trading_by,
    insert_trading_pair, list_by_asset_on_exchange, list_for_assets, update_trading_pair,
};
