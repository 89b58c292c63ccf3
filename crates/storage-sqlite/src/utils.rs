//! Utility functions for SQLite storage operations.

/// Maximum number of ids bound in one `IN (...)` clause. SQLite caps the
/// parameters of a statement (SQLITE_MAX_VARIABLE_NUMBER, often 999) and a
/// query may bind the list twice.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Chunk a slice into smaller slices for batch SQLite queries.
///
/// Used when hydrating assets, whose old addresses, exchange links and
/// trading pairs are loaded with `eq_any` over the asset ids.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}
