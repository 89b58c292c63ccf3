use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use reserve_setting_core::errors::{Error, Result, SettingError};
use reserve_setting_core::exchanges::{
    Exchange, ExchangeRepositoryTrait, ExchangeUpdate, NewExchange,
};

use super::model::{ExchangeChangesetDB, ExchangeDB, NewExchangeDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{translate_write_error, IntoCore};
use crate::schema::exchanges;

pub(crate) fn load_exchange(conn: &mut SqliteConnection, exchange_id: i64) -> Result<Exchange> {
    exchanges::table
        .find(exchange_id)
        .select(ExchangeDB::as_select())
        .first::<ExchangeDB>(conn)
        .optional()
        .into_core()?
        .map(Exchange::from)
        .ok_or_else(|| SettingError::NotFound(format!("exchange {}", exchange_id)).into())
}

/// Like [`load_exchange`] but reports a missing row as `ExchangeNotExists`,
/// for callers that reference the exchange from another entity.
pub(crate) fn require_exchange(conn: &mut SqliteConnection, exchange_id: i64) -> Result<Exchange> {
    load_exchange(conn, exchange_id).map_err(|e| {
        if e.is_not_found() {
            Error::from(SettingError::ExchangeNotExists)
        } else {
            e
        }
    })
}

pub(crate) fn create_exchange(conn: &mut SqliteConnection, new_exchange: NewExchange) -> Result<i64> {
    let row: NewExchangeDB = new_exchange.into();
    diesel::insert_into(exchanges::table)
        .values(&row)
        .returning(exchanges::id)
        .get_result::<i64>(conn)
        .map_err(|e| translate_write_error(e, SettingError::ExchangeNotExists))
}

/// Enabling an exchange without both fees trips the `exchange_fee_check`
/// constraint and surfaces as `ExchangeFeeMissing`.
pub(crate) fn update_exchange(conn: &mut SqliteConnection, update: &ExchangeUpdate) -> Result<()> {
    load_exchange(conn, update.exchange_id)?;
    let changes = ExchangeChangesetDB::from(update);
    if changes.is_empty() {
        debug!("Nothing to update on exchange {}", update.exchange_id);
        return Ok(());
    }
    diesel::update(exchanges::table.find(update.exchange_id))
        .set(&changes)
        .execute(conn)
        .map_err(|e| translate_write_error(e, SettingError::ExchangeNotExists))?;
    Ok(())
}

pub struct ExchangeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ExchangeRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ExchangeRepository { pool, writer }
    }
}

#[async_trait]
impl ExchangeRepositoryTrait for ExchangeRepository {
    fn get_by_id(&self, exchange_id: i64) -> Result<Exchange> {
        let mut conn = get_connection(&self.pool)?;
        load_exchange(&mut conn, exchange_id)
    }

    fn list(&self) -> Result<Vec<Exchange>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = exchanges::table
            .order(exchanges::id.asc())
            .select(ExchangeDB::as_select())
            .load::<ExchangeDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Exchange::from).collect())
    }

    async fn create(&self, new_exchange: NewExchange) -> Result<i64> {
        self.writer
            .exec(move |conn| create_exchange(conn, new_exchange))
            .await
    }

    async fn update(&self, update: ExchangeUpdate) -> Result<()> {
        self.writer
            .exec(move |conn| update_exchange(conn, &update))
            .await
    }
}
