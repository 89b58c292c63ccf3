//! Reserve Setting Core - Domain entities, services, and traits.
//!
//! This crate contains the staged configuration-change engine of the
//! reserve: asset, exchange and trading pair models, the setting change
//! validator and service, and the repository traits implemented by the
//! `storage-sqlite` crate.

pub mod assets;
pub mod errors;
pub mod exchanges;
pub mod pending;
pub mod setting_change;
pub mod trading_pairs;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
