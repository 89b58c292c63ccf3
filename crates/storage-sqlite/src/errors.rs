//! Storage-specific error types for SQLite operations.
//!
//! This module provides error types that wrap Diesel-specific errors and convert
//! them to the database-agnostic error types defined in `reserve_setting_core`.
//! It also holds the single table translating SQLite constraint failures into
//! domain error kinds.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use reserve_setting_core::errors::{DatabaseError, Error, SettingError};
use thiserror::Error;

/// Storage-specific errors that wrap Diesel and r2d2 types.
///
/// These errors are internal to the storage layer and are converted to
/// `reserve_setting_core::Error` before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A domain error raised inside a write job; passed through unchanged so
    /// entry annotations and error kinds survive the transaction boundary.
    #[error(transparent)]
    Core(Error),
}

impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::Core(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            StorageError::PoolError(e) => {
                Error::Database(DatabaseError::PoolCreationFailed(e.to_string()))
            }
            StorageError::QueryFailed(DieselError::NotFound) => {
                Error::Database(DatabaseError::NotFound("Record not found".to_string()))
            }
            StorageError::QueryFailed(DieselError::DatabaseError(kind, info)) => {
                match constraint_error(info.message()) {
                    Some(setting) => Error::Setting(setting),
                    None => Error::Database(DatabaseError::QueryFailed(format!(
                        "{:?}: {}",
                        kind,
                        info.message()
                    ))),
                }
            }
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            StorageError::MigrationFailed(e) => Error::Database(DatabaseError::MigrationFailed(e)),
            StorageError::SerializationError(e) => Error::Database(DatabaseError::Internal(e)),
            StorageError::Core(e) => e,
        }
    }
}

/// Constraint fragments as they appear in SQLite error messages, and the
/// domain error each one stands for.
static CONSTRAINT_ERRORS: [(&str, SettingError); 9] = [
    ("assets.symbol", SettingError::SymbolExists),
    ("assets.address", SettingError::AddressExists),
    ("asset_old_addresses.address", SettingError::AddressExists),
    (
        "asset_exchanges.asset_id, asset_exchanges.exchange_id",
        SettingError::AssetExchangeAlreadyExist,
    ),
    (
        "trading_pairs.exchange_id, trading_pairs.base_id, trading_pairs.quote_id",
        SettingError::TradingPairAlreadyExists,
    ),
    ("trading_pair_legs_check", SettingError::BadTradingPairConfiguration),
    (
        "trading_by.asset_id, trading_by.trading_pair_id",
        SettingError::TradingByAlreadyExists,
    ),
    ("exchange_fee_check", SettingError::ExchangeFeeMissing),
    ("address_transferable_check", SettingError::AddressMissing),
];

/// Looks up the domain error for a constraint failure message.
pub fn constraint_error(message: &str) -> Option<SettingError> {
    CONSTRAINT_ERRORS
        .iter()
        .find(|(fragment, _)| message.contains(fragment))
        .map(|(_, setting)| setting.clone())
}

/// Translates a failed write. SQLite does not name the violated reference
/// in foreign key failures, so the caller supplies `on_foreign_key`.
pub fn translate_write_error(err: DieselError, on_foreign_key: SettingError) -> Error {
    if let DieselError::DatabaseError(kind, info) = &err {
        if let Some(setting) = constraint_error(info.message()) {
            return setting.into();
        }
        if matches!(kind, DatabaseErrorKind::ForeignKeyViolation) {
            return on_foreign_key.into();
        }
    }
    StorageError::from(err).into()
}

/// Extension trait for easily converting Diesel Results to core Results.
///
/// This provides a `.into_core()` method on any `Result<T, diesel::result::Error>`
/// which handles the conversion through StorageError.
pub trait IntoCore<T> {
    fn into_core(self) -> reserve_setting_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> reserve_setting_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> reserve_setting_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, serde_json::Error> {
    fn into_core(self) -> reserve_setting_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_table() {
        assert_eq!(
            constraint_error("UNIQUE constraint failed: assets.symbol"),
            Some(SettingError::SymbolExists)
        );
        assert_eq!(
            constraint_error("UNIQUE constraint failed: asset_old_addresses.address"),
            Some(SettingError::AddressExists)
        );
        assert_eq!(
            constraint_error(
                "UNIQUE constraint failed: asset_exchanges.asset_id, asset_exchanges.exchange_id"
            ),
            Some(SettingError::AssetExchangeAlreadyExist)
        );
        assert_eq!(
            constraint_error("CHECK constraint failed: exchange_fee_check"),
            Some(SettingError::ExchangeFeeMissing)
        );
        assert_eq!(constraint_error("FOREIGN KEY constraint failed"), None);
    }

    #[test]
    fn test_core_error_passes_through() {
        let err: Error = StorageError::from(Error::from(SettingError::PwiMissing).at_entry(3)).into();
        assert_eq!(err.entry_index(), Some(3));
        assert_eq!(err.setting_error(), Some(&SettingError::PwiMissing));
    }
}
