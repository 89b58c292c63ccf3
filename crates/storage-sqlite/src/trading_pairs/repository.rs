use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::collections::BTreeMap;
use std::sync::Arc;

use reserve_setting_core::errors::{Result, SettingError};
use reserve_setting_core::trading_pairs::{
    CreateTradingPair, NewTradingBy, NewTradingPair, TradingBy, TradingPair,
    TradingPairRepositoryTrait, TradingPairUpdate,
};

use super::model::{
    NewTradingByDB, NewTradingPairDB, TradingByDB, TradingPairChangesetDB, TradingPairDB,
};
use crate::assets::{find_asset_row, is_listed_on, require_asset_row};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{translate_write_error, IntoCore};
use crate::exchanges::require_exchange;
use crate::schema::{trading_by, trading_pairs};
use crate::utils::chunk_for_sqlite;

pub(crate) fn load_trading_pair(
    conn: &mut SqliteConnection,
    trading_pair_id: i64,
) -> Result<TradingPair> {
    trading_pairs::table
        .find(trading_pair_id)
        .select(TradingPairDB::as_select())
        .first::<TradingPairDB>(conn)
        .optional()
        .into_core()?
        .map(TradingPair::from)
        .ok_or_else(|| SettingError::NotFound(format!("trading pair {}", trading_pair_id)).into())
}

pub(crate) fn list_by_asset_on_exchange(
    conn: &mut SqliteConnection,
    asset_id: i64,
    exchange_id: i64,
) -> Result<Vec<TradingPair>> {
    let rows = trading_pairs::table
        .filter(trading_pairs::exchange_id.eq(exchange_id))
        .filter(
            trading_pairs::base_id
                .eq(asset_id)
                .or(trading_pairs::quote_id.eq(asset_id)),
        )
        .order(trading_pairs::id.asc())
        .select(TradingPairDB::as_select())
        .load::<TradingPairDB>(conn)
        .into_core()?;
    Ok(rows.into_iter().map(TradingPair::from).collect())
}

/// All trading pairs in which any of `asset_ids` is base or quote.
pub(crate) fn list_for_assets(
    conn: &mut SqliteConnection,
    asset_ids: &[i64],
) -> Result<Vec<TradingPair>> {
    let mut by_id = BTreeMap::new();
    for chunk in chunk_for_sqlite(asset_ids) {
        let rows = trading_pairs::table
            .filter(
                trading_pairs::base_id
                    .eq_any(chunk)
                    .or(trading_pairs::quote_id.eq_any(chunk)),
            )
            .select(TradingPairDB::as_select())
            .load::<TradingPairDB>(conn)
            .into_core()?;
        for row in rows {
            by_id.insert(row.id, TradingPair::from(row));
        }
    }
    Ok(by_id.into_values().collect())
}

fn find_trading_by(
    conn: &mut SqliteConnection,
    asset_id: i64,
    trading_pair_id: i64,
) -> Result<Option<TradingBy>> {
    Ok(trading_by::table
        .filter(trading_by::asset_id.eq(asset_id))
        .filter(trading_by::trading_pair_id.eq(trading_pair_id))
        .select(TradingByDB::as_select())
        .first::<TradingByDB>(conn)
        .optional()
        .into_core()?
        .map(TradingBy::from))
}

/// Referential checks for resolved legs: both assets exist and are listed
/// on the exchange, and the quote asset is flagged as a quote.
fn check_trading_pair_legs(
    conn: &mut SqliteConnection,
    exchange_id: i64,
    base_id: i64,
    quote_id: i64,
) -> Result<()> {
    if base_id == quote_id {
        return Err(SettingError::BadTradingPairConfiguration.into());
    }
    if find_asset_row(conn, base_id)?.is_none() {
        return Err(SettingError::BaseAssetInvalid.into());
    }
    match find_asset_row(conn, quote_id)? {
        Some(quote) if quote.is_quote => {}
        _ => return Err(SettingError::QuoteAssetInvalid.into()),
    }
    if !is_listed_on(conn, base_id, exchange_id)? {
        return Err(SettingError::BaseAssetInvalid.into());
    }
    if !is_listed_on(conn, quote_id, exchange_id)? {
        return Err(SettingError::QuoteAssetInvalid.into());
    }
    Ok(())
}

pub(crate) fn insert_trading_pair(
    conn: &mut SqliteConnection,
    exchange_id: i64,
    base_id: i64,
    quote_id: i64,
    pair: &NewTradingPair,
) -> Result<i64> {
    check_trading_pair_legs(conn, exchange_id, base_id, quote_id)?;
    let row = NewTradingPairDB::resolved(exchange_id, base_id, quote_id, pair);
    diesel::insert_into(trading_pairs::table)
        .values(&row)
        .returning(trading_pairs::id)
        .get_result::<i64>(conn)
        .map_err(|e| translate_write_error(e, SettingError::ExchangeNotExists))
}

pub(crate) fn insert_trading_by(
    conn: &mut SqliteConnection,
    asset_id: i64,
    trading_pair_id: i64,
) -> Result<i64> {
    diesel::insert_into(trading_by::table)
        .values(&NewTradingByDB {
            asset_id,
            trading_pair_id,
        })
        .returning(trading_by::id)
        .get_result::<i64>(conn)
        .map_err(|e| translate_write_error(e, SettingError::AssetNotExists))
}

/// Creates a standalone pair and the trading-by association of the asset
/// it is declared for.
pub(crate) fn create_trading_pair(
    conn: &mut SqliteConnection,
    entry: &CreateTradingPair,
) -> Result<i64> {
    require_exchange(conn, entry.exchange_id)?;
    let (base_id, quote_id) = entry.trading_pair.resolve_legs(entry.asset_id)?;
    if entry.asset_id != base_id && entry.asset_id != quote_id {
        return Err(SettingError::TradingByAssetIdInvalid.into());
    }
    let trading_pair_id =
        insert_trading_pair(conn, entry.exchange_id, base_id, quote_id, &entry.trading_pair)?;
    insert_trading_by(conn, entry.asset_id, trading_pair_id)?;
    Ok(trading_pair_id)
}

pub(crate) fn update_trading_pair(
    conn: &mut SqliteConnection,
    update: &TradingPairUpdate,
) -> Result<()> {
    load_trading_pair(conn, update.trading_pair_id)?;
    let changes = TradingPairChangesetDB::from(update);
    if changes.is_empty() {
        return Ok(());
    }
    diesel::update(trading_pairs::table.find(update.trading_pair_id))
        .set(&changes)
        .execute(conn)
        .into_core()?;
    Ok(())
}

/// Deletes the pair together with its trading-by rows.
pub(crate) fn delete_trading_pair(conn: &mut SqliteConnection, trading_pair_id: i64) -> Result<()> {
    diesel::delete(trading_by::table.filter(trading_by::trading_pair_id.eq(trading_pair_id)))
        .execute(conn)
        .into_core()?;
    let deleted = diesel::delete(trading_pairs::table.find(trading_pair_id))
        .execute(conn)
        .into_core()?;
    if deleted == 0 {
        return Err(SettingError::NotFound(format!("trading pair {}", trading_pair_id)).into());
    }
    Ok(())
}

pub(crate) fn create_trading_by(
    conn: &mut SqliteConnection,
    new_trading_by: &NewTradingBy,
) -> Result<i64> {
    let trading_pair = load_trading_pair(conn, new_trading_by.trading_pair_id)?;
    require_asset_row(conn, new_trading_by.asset_id)?;
    if !trading_pair.involves(new_trading_by.asset_id) {
        return Err(SettingError::TradingByAssetIdInvalid.into());
    }
    insert_trading_by(conn, new_trading_by.asset_id, trading_pair.id)
}

pub struct TradingPairRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TradingPairRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TradingPairRepository { pool, writer }
    }
}

#[async_trait]
impl TradingPairRepositoryTrait for TradingPairRepository {
    fn get_by_id(&self, trading_pair_id: i64) -> Result<TradingPair> {
        let mut conn = get_connection(&self.pool)?;
        load_trading_pair(&mut conn, trading_pair_id)
    }

    fn list_by_exchange(&self, exchange_id: i64) -> Result<Vec<TradingPair>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = trading_pairs::table
            .filter(trading_pairs::exchange_id.eq(exchange_id))
            .order(trading_pairs::id.asc())
            .select(TradingPairDB::as_select())
            .load::<TradingPairDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(TradingPair::from).collect())
    }

    fn list_by_asset_on_exchange(
        &self,
        asset_id: i64,
        exchange_id: i64,
    ) -> Result<Vec<TradingPair>> {
        let mut conn = get_connection(&self.pool)?;
        list_by_asset_on_exchange(&mut conn, asset_id, exchange_id)
    }

    fn find_trading_by(&self, asset_id: i64, trading_pair_id: i64) -> Result<Option<TradingBy>> {
        let mut conn = get_connection(&self.pool)?;
        find_trading_by(&mut conn, asset_id, trading_pair_id)
    }

    async fn create(&self, entry: CreateTradingPair) -> Result<i64> {
        self.writer
            .exec(move |conn| create_trading_pair(conn, &entry))
            .await
    }

    async fn update(&self, update: TradingPairUpdate) -> Result<()> {
        self.writer
            .exec(move |conn| update_trading_pair(conn, &update))
            .await
    }

    async fn delete(&self, trading_pair_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn| delete_trading_pair(conn, trading_pair_id))
            .await
    }

    async fn create_trading_by(&self, trading_by: NewTradingBy) -> Result<i64> {
        self.writer
            .exec(move |conn| create_trading_by(conn, &trading_by))
            .await
    }
}
