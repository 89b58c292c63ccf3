//! Core error types for the reserve setting engine.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the setting engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Setting(#[from] SettingError),

    /// A single entry of a setting change failed; `index` is its position in
    /// the change list.
    #[error("Change entry {index} failed: {source}")]
    ChangeEntry { index: usize, source: Box<Error> },

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Live exchange info unavailable: {0}")]
    ExchangeInfo(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Wraps an error with the index of the change entry that produced it.
    pub fn at_entry(self, index: usize) -> Self {
        Error::ChangeEntry {
            index,
            source: Box::new(self),
        }
    }

    /// Returns the domain error kind, looking through entry annotations.
    pub fn setting_error(&self) -> Option<&SettingError> {
        match self {
            Error::Setting(e) => Some(e),
            Error::ChangeEntry { source, .. } => source.setting_error(),
            _ => None,
        }
    }

    /// Returns the index of the failing change entry, if any.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            Error::ChangeEntry { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Database(DatabaseError::NotFound(_)) => true,
            Error::ChangeEntry { source, .. } => source.is_not_found(),
            _ => matches!(self.setting_error(), Some(SettingError::NotFound(_))),
        }
    }
}

/// Domain-level error kinds of the setting engine.
///
/// These are independent of the storage technology: the storage layer
/// translates constraint violations into them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("symbol already exists")]
    SymbolExists,

    #[error("address already exists")]
    AddressExists,

    #[error("asset exchange already exists")]
    AssetExchangeAlreadyExist,

    #[error("trading pair already exists")]
    TradingPairAlreadyExists,

    #[error("trading by already exists")]
    TradingByAlreadyExists,

    #[error("exchange does not exist")]
    ExchangeNotExists,

    #[error("asset does not exist")]
    AssetNotExists,

    #[error("bad trading pair configuration")]
    BadTradingPairConfiguration,

    #[error("base asset is invalid")]
    BaseAssetInvalid,

    #[error("quote asset is invalid")]
    QuoteAssetInvalid,

    #[error("asset is neither base nor quote of the trading pair")]
    TradingByAssetIdInvalid,

    #[error("exchange can not be enabled without trading fees")]
    ExchangeFeeMissing,

    #[error("address is required for a transferable asset")]
    AddressMissing,

    #[error("deposit address is required for a transferable asset")]
    DepositAddressMissing,

    #[error("pwi is required when set rate is enabled")]
    PwiMissing,

    #[error("rebalance quadratic is required when rebalance is enabled")]
    RebalanceQuadraticMissing,

    #[error("at least one asset exchange is required when rebalance is enabled")]
    AssetExchangeMissing,

    #[error("asset target is required when rebalance is enabled")]
    AssetTargetMissing,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("delete violation: {0}")]
    DeleteViolation(String),
}

impl SettingError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SettingError::NotFound(_) => "not_found",
            SettingError::SymbolExists => "symbol_exists",
            SettingError::AddressExists => "address_exists",
            SettingError::AssetExchangeAlreadyExist => "asset_exchange_already_exist",
            SettingError::TradingPairAlreadyExists => "trading_pair_already_exists",
            SettingError::TradingByAlreadyExists => "trading_by_already_exists",
            SettingError::ExchangeNotExists => "exchange_not_exists",
            SettingError::AssetNotExists => "asset_not_exists",
            SettingError::BadTradingPairConfiguration => "bad_trading_pair_configuration",
            SettingError::BaseAssetInvalid => "base_asset_invalid",
            SettingError::QuoteAssetInvalid => "quote_asset_invalid",
            SettingError::TradingByAssetIdInvalid => "trading_by_asset_id_invalid",
            SettingError::ExchangeFeeMissing => "exchange_fee_missing",
            SettingError::AddressMissing => "address_missing",
            SettingError::DepositAddressMissing => "deposit_address_missing",
            SettingError::PwiMissing => "pwi_missing",
            SettingError::RebalanceQuadraticMissing => "rebalance_quadratic_missing",
            SettingError::AssetExchangeMissing => "asset_exchange_missing",
            SettingError::AssetTargetMissing => "asset_target_missing",
            SettingError::InvalidAddress(_) => "invalid_address",
            SettingError::DeleteViolation(_) => "delete_violation",
        }
    }

    /// True for uniqueness conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            SettingError::SymbolExists
                | SettingError::AddressExists
                | SettingError::AssetExchangeAlreadyExist
                | SettingError::TradingPairAlreadyExists
                | SettingError::TradingByAlreadyExists
                | SettingError::DeleteViolation(_)
        )
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and payload parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to decode payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::Payload(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Database(DatabaseError::Internal(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_error_found_through_entry_annotation() {
        let err = Error::from(SettingError::SymbolExists).at_entry(2);
        assert_eq!(err.entry_index(), Some(2));
        assert_eq!(err.setting_error(), Some(&SettingError::SymbolExists));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_through_entry_annotation() {
        let err = Error::from(SettingError::NotFound("trading pair 7".to_string())).at_entry(1);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Change entry 1 failed: trading pair 7 not found");
    }

    #[test]
    fn test_kind_names_are_snake_case() {
        assert_eq!(SettingError::QuoteAssetInvalid.kind(), "quote_asset_invalid");
        assert_eq!(
            SettingError::DeleteViolation("x".to_string()).kind(),
            "delete_violation"
        );
        assert!(SettingError::AddressExists.is_conflict());
        assert!(!SettingError::PwiMissing.is_conflict());
    }
}
