//! SQLite storage implementation for the reserve setting engine.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `reserve-setting-core` and contains:
//! - Database connection pooling and the single writer actor
//! - Diesel migrations
//! - Repository implementations for exchanges, assets, trading pairs and
//!   pending objects
//! - The transactional applier for staged setting changes
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain, validation)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod assets;
pub mod exchanges;
pub mod pending;
pub mod setting_change;
pub mod trading_pairs;

#[cfg(test)]
mod test_utils;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use assets::AssetRepository;
pub use exchanges::ExchangeRepository;
pub use pending::PendingObjectRepository;
pub use setting_change::SettingChangeApplier;
pub use trading_pairs::TradingPairRepository;

// Re-export from reserve-setting-core for convenience
pub use reserve_setting_core::errors::{DatabaseError, Error, Result};
