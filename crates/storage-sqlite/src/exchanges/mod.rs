//! SQLite storage implementation for exchanges.

mod model;
mod repository;

pub use model::{ExchangeChangesetDB, ExchangeDB, NewExchangeDB};
pub use repository::ExchangeRepository;
pub(crate) use repository::{load_exchange, require_exchange, update_exchange};
