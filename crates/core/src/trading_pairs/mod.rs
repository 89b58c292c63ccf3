//! Trading pairs module - domain models and traits for trading pairs and
//! the trading-by association.

mod trading_pairs_model;
mod trading_pairs_traits;

pub use trading_pairs_model::{
    CreateTradingPair, ImplicitLeg, NewTradingBy, NewTradingPair, TradingBy, TradingPair,
    TradingPairUpdate,
};
pub use trading_pairs_traits::TradingPairRepositoryTrait;
