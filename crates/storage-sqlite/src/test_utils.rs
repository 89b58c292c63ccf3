//! Fixtures for repository tests: a migrated throwaway database plus
//! helpers that seed rows directly through a pooled connection.

use diesel::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::schema::{asset_exchanges, assets, exchanges};

/// A syntactically valid address derived from `n`.
pub fn addr(n: u64) -> String {
    format!("0x{:040x}", n)
}

/// Must be called inside a Tokio runtime; the writer actor is spawned on it.
pub fn setup_db() -> (Arc<DbPool>, WriteHandle, TempDir) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let db_path = temp_dir.path().join("reserve.db");
    let db_path = init(db_path.to_str().expect("utf-8 path")).expect("init database");
    let pool = create_pool(&db_path).expect("create pool");
    run_migrations(&pool).expect("run migrations");
    let writer = spawn_writer((*pool).clone());
    (pool, writer, temp_dir)
}

pub fn seed_exchange(pool: &DbPool, name: &str) -> i64 {
    let mut conn = pool.get().expect("connection");
    diesel::insert_into(exchanges::table)
        .values((
            exchanges::name.eq(name),
            exchanges::trading_fee_maker.eq(Some(0.001)),
            exchanges::trading_fee_taker.eq(Some(0.002)),
            exchanges::disable.eq(false),
        ))
        .returning(exchanges::id)
        .get_result(&mut conn)
        .expect("seed exchange")
}

/// Seeds a non-transferable asset without address or exchange links.
pub fn seed_asset(pool: &DbPool, symbol: &str, is_quote: bool) -> i64 {
    let mut conn = pool.get().expect("connection");
    let now = chrono::Utc::now().naive_utc();
    diesel::insert_into(assets::table)
        .values((
            assets::symbol.eq(symbol),
            assets::name.eq(symbol),
            assets::decimals.eq(18_i64),
            assets::is_quote.eq(is_quote),
            assets::created_at.eq(now),
            assets::updated_at.eq(now),
        ))
        .returning(assets::id)
        .get_result(&mut conn)
        .expect("seed asset")
}

/// Links an asset to an exchange under its own symbol.
pub fn seed_listing(pool: &DbPool, asset_id: i64, exchange_id: i64) -> i64 {
    let mut conn = pool.get().expect("connection");
    let symbol: String = assets::table
        .find(asset_id)
        .select(assets::symbol)
        .first(&mut conn)
        .expect("seeded asset");
    diesel::insert_into(asset_exchanges::table)
        .values((
            asset_exchanges::asset_id.eq(asset_id),
            asset_exchanges::exchange_id.eq(exchange_id),
            asset_exchanges::symbol.eq(symbol),
        ))
        .returning(asset_exchanges::id)
        .get_result(&mut conn)
        .expect("seed listing")
}
