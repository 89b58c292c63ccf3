//! Exchanges module - domain models and traits.

mod exchanges_model;
mod exchanges_traits;

pub use exchanges_model::{Exchange, ExchangeUpdate, NewExchange};
pub use exchanges_traits::ExchangeRepositoryTrait;
