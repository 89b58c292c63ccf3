use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use reserve_setting_core::assets::{
    non_empty_address, normalize_address, validate_address, Asset, AssetExchange,
    AssetExchangeUpdate, AssetRepositoryTrait, AssetUpdate, ChangeAssetAddress, NewAsset,
    NewAssetExchange,
};
use reserve_setting_core::errors::{Error, Result, SettingError};

use super::model::{
    AssetChangesetDB, AssetDB, AssetExchangeChangesetDB, AssetExchangeDB, AssetOldAddressDB,
    NewAssetDB, NewAssetExchangeDB, NewAssetOldAddressDB,
};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{translate_write_error, IntoCore};
use crate::exchanges::require_exchange;
use crate::schema::{asset_exchanges, asset_old_addresses, assets};
use crate::trading_pairs::{
    insert_trading_by, insert_trading_pair, list_by_asset_on_exchange, list_for_assets,
};
use crate::utils::chunk_for_sqlite;

pub(crate) fn find_asset_row(conn: &mut SqliteConnection, asset_id: i64) -> Result<Option<AssetDB>> {
    assets::table
        .find(asset_id)
        .select(AssetDB::as_select())
        .first::<AssetDB>(conn)
        .optional()
        .into_core()
}

/// Loads the bare row of an asset referenced from another entity; a missing
/// row is reported as `AssetNotExists`.
pub(crate) fn require_asset_row(conn: &mut SqliteConnection, asset_id: i64) -> Result<AssetDB> {
    find_asset_row(conn, asset_id)?.ok_or_else(|| SettingError::AssetNotExists.into())
}

/// True if the asset has an exchange link on `exchange_id`.
pub(crate) fn is_listed_on(
    conn: &mut SqliteConnection,
    asset_id: i64,
    exchange_id: i64,
) -> Result<bool> {
    let count = asset_exchanges::table
        .filter(asset_exchanges::asset_id.eq(asset_id))
        .filter(asset_exchanges::exchange_id.eq(exchange_id))
        .count()
        .get_result::<i64>(conn)
        .into_core()?;
    Ok(count > 0)
}

/// Loads old addresses, exchange links and trading pairs for `rows` in
/// batches and assembles the domain assets.
fn hydrate(conn: &mut SqliteConnection, rows: Vec<AssetDB>) -> Result<Vec<Asset>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let mut old_addresses: HashMap<i64, Vec<String>> = HashMap::new();
    let mut links: HashMap<i64, Vec<AssetExchangeDB>> = HashMap::new();
    for chunk in chunk_for_sqlite(&ids) {
        let archived = asset_old_addresses::table
            .filter(asset_old_addresses::asset_id.eq_any(chunk))
            .order(asset_old_addresses::id.asc())
            .select(AssetOldAddressDB::as_select())
            .load::<AssetOldAddressDB>(conn)
            .into_core()?;
        for old in archived {
            old_addresses.entry(old.asset_id).or_default().push(old.address);
        }

        let exchange_rows = asset_exchanges::table
            .filter(asset_exchanges::asset_id.eq_any(chunk))
            .order(asset_exchanges::id.asc())
            .select(AssetExchangeDB::as_select())
            .load::<AssetExchangeDB>(conn)
            .into_core()?;
        for link in exchange_rows {
            links.entry(link.asset_id).or_default().push(link);
        }
    }
    let pairs = list_for_assets(conn, &ids)?;

    rows.into_iter()
        .map(|row| {
            let exchanges = links
                .remove(&row.id)
                .unwrap_or_default()
                .into_iter()
                .map(|link| link.into_domain(&pairs))
                .collect();
            let archived = old_addresses.remove(&row.id).unwrap_or_default();
            row.into_domain(archived, exchanges)
        })
        .collect()
}

pub(crate) fn load_asset(conn: &mut SqliteConnection, asset_id: i64) -> Result<Asset> {
    let row = find_asset_row(conn, asset_id)?
        .ok_or_else(|| Error::from(SettingError::NotFound(format!("asset {}", asset_id))))?;
    hydrate(conn, vec![row])?
        .pop()
        .ok_or_else(|| SettingError::NotFound(format!("asset {}", asset_id)).into())
}

fn find_by_symbol(conn: &mut SqliteConnection, symbol: &str) -> Result<Option<Asset>> {
    let row = assets::table
        .filter(assets::symbol.eq(symbol))
        .select(AssetDB::as_select())
        .first::<AssetDB>(conn)
        .optional()
        .into_core()?;
    match row {
        Some(row) => Ok(hydrate(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Checks current and superseded addresses of every asset.
pub(crate) fn is_address_in_use(conn: &mut SqliteConnection, address: &str) -> Result<bool> {
    let address = normalize_address(address);
    let current = assets::table
        .filter(assets::address.eq(&address))
        .count()
        .get_result::<i64>(conn)
        .into_core()?;
    if current > 0 {
        return Ok(true);
    }
    let archived = asset_old_addresses::table
        .filter(asset_old_addresses::address.eq(&address))
        .count()
        .get_result::<i64>(conn)
        .into_core()?;
    Ok(archived > 0)
}

fn load_asset_exchange_row(
    conn: &mut SqliteConnection,
    asset_exchange_id: i64,
) -> Result<AssetExchangeDB> {
    asset_exchanges::table
        .find(asset_exchange_id)
        .select(AssetExchangeDB::as_select())
        .first::<AssetExchangeDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| {
            SettingError::NotFound(format!("asset exchange {}", asset_exchange_id)).into()
        })
}

pub(crate) fn load_asset_exchange(
    conn: &mut SqliteConnection,
    asset_exchange_id: i64,
) -> Result<AssetExchange> {
    let row = load_asset_exchange_row(conn, asset_exchange_id)?;
    let pairs = list_by_asset_on_exchange(conn, row.asset_id, row.exchange_id)?;
    Ok(row.into_domain(&pairs))
}

fn find_asset_exchange(
    conn: &mut SqliteConnection,
    asset_id: i64,
    exchange_id: i64,
) -> Result<Option<AssetExchange>> {
    let row = asset_exchanges::table
        .filter(asset_exchanges::asset_id.eq(asset_id))
        .filter(asset_exchanges::exchange_id.eq(exchange_id))
        .select(AssetExchangeDB::as_select())
        .first::<AssetExchangeDB>(conn)
        .optional()
        .into_core()?;
    match row {
        Some(row) => {
            let pairs = list_by_asset_on_exchange(conn, asset_id, exchange_id)?;
            Ok(Some(row.into_domain(&pairs)))
        }
        None => Ok(None),
    }
}

/// Inserts an exchange link for `asset_id` with its trading pairs. The
/// implicit leg of every pair resolves to `asset_id`, which also receives the
/// trading-by association.
fn insert_asset_exchange(
    conn: &mut SqliteConnection,
    asset_id: i64,
    new_asset_exchange: &NewAssetExchange,
) -> Result<i64> {
    require_exchange(conn, new_asset_exchange.exchange_id)?;
    let row = NewAssetExchangeDB::for_asset(asset_id, new_asset_exchange);
    let asset_exchange_id = diesel::insert_into(asset_exchanges::table)
        .values(&row)
        .returning(asset_exchanges::id)
        .get_result::<i64>(conn)
        .map_err(|e| translate_write_error(e, SettingError::AssetNotExists))?;

    for pair in &new_asset_exchange.trading_pairs {
        let (base_id, quote_id) = pair.resolve_implicit_leg(asset_id)?;
        let trading_pair_id =
            insert_trading_pair(conn, new_asset_exchange.exchange_id, base_id, quote_id, pair)?;
        insert_trading_by(conn, asset_id, trading_pair_id)?;
    }
    Ok(asset_exchange_id)
}

pub(crate) fn create_asset(conn: &mut SqliteConnection, new_asset: &NewAsset) -> Result<i64> {
    new_asset.validate()?;
    if let Some(address) = non_empty_address(&new_asset.address) {
        if is_address_in_use(conn, address)? {
            return Err(SettingError::AddressExists.into());
        }
    }
    let row = NewAssetDB::from_domain(new_asset)?;
    let asset_id = diesel::insert_into(assets::table)
        .values(&row)
        .returning(assets::id)
        .get_result::<i64>(conn)
        .map_err(|e| translate_write_error(e, SettingError::AssetNotExists))?;

    for asset_exchange in &new_asset.exchanges {
        insert_asset_exchange(conn, asset_id, asset_exchange)?;
    }
    debug!("Created asset {} ({})", new_asset.symbol, asset_id);
    Ok(asset_id)
}

/// A new address supersedes the current one, which is archived.
pub(crate) fn update_asset(conn: &mut SqliteConnection, update: &AssetUpdate) -> Result<()> {
    let existing = load_asset(conn, update.asset_id)?;
    update.validate_against(&existing)?;
    let mut superseded = None;
    if let Some(address) = non_empty_address(&update.address) {
        let address = normalize_address(address);
        let current = existing.address.as_deref().map(normalize_address);
        if current.as_deref() != Some(address.as_str()) {
            if is_address_in_use(conn, &address)? {
                return Err(SettingError::AddressExists.into());
            }
            superseded = current;
        }
    }
    let changes = AssetChangesetDB::from_domain(update)?;
    if let Some(current) = superseded {
        archive_address(conn, existing.id, current, changes.updated_at)?;
    }
    diesel::update(assets::table.find(update.asset_id))
        .set(&changes)
        .execute(conn)
        .map_err(|e| translate_write_error(e, SettingError::AssetNotExists))?;
    Ok(())
}

fn archive_address(
    conn: &mut SqliteConnection,
    asset_id: i64,
    address: String,
    now: chrono::NaiveDateTime,
) -> Result<()> {
    debug!("Archiving address {} of asset {}", address, asset_id);
    diesel::insert_into(asset_old_addresses::table)
        .values(&NewAssetOldAddressDB {
            asset_id,
            address,
            created_at: now,
        })
        .execute(conn)
        .map_err(|e| translate_write_error(e, SettingError::AssetNotExists))?;
    Ok(())
}

/// Archives the current address, then stores the new one.
pub(crate) fn change_asset_address(
    conn: &mut SqliteConnection,
    change: &ChangeAssetAddress,
) -> Result<()> {
    let existing = find_asset_row(conn, change.asset_id)?
        .ok_or_else(|| Error::from(SettingError::NotFound(format!("asset {}", change.asset_id))))?;
    validate_address(&change.address)?;
    let address = normalize_address(&change.address);
    if is_address_in_use(conn, &address)? {
        return Err(SettingError::AddressExists.into());
    }

    let now = chrono::Utc::now().naive_utc();
    if let Some(current) = existing.address {
        archive_address(conn, existing.id, current, now)?;
    }
    diesel::update(assets::table.find(existing.id))
        .set((assets::address.eq(Some(address)), assets::updated_at.eq(now)))
        .execute(conn)
        .map_err(|e| translate_write_error(e, SettingError::AssetNotExists))?;
    Ok(())
}

pub(crate) fn create_asset_exchange(
    conn: &mut SqliteConnection,
    new_asset_exchange: &NewAssetExchange,
) -> Result<i64> {
    let asset = require_asset_row(conn, new_asset_exchange.asset_id)?;
    new_asset_exchange.validate_for(asset.transferable, asset.is_quote)?;
    insert_asset_exchange(conn, asset.id, new_asset_exchange)
}

pub(crate) fn update_asset_exchange(
    conn: &mut SqliteConnection,
    update: &AssetExchangeUpdate,
) -> Result<()> {
    let existing = load_asset_exchange(conn, update.asset_exchange_id)?;
    let asset = load_asset(conn, existing.asset_id)?;
    update.validate_against(&existing, &asset)?;
    let changes = AssetExchangeChangesetDB::from(update);
    if changes.is_empty() {
        debug!("Nothing to update on asset exchange {}", update.asset_exchange_id);
        return Ok(());
    }
    diesel::update(asset_exchanges::table.find(update.asset_exchange_id))
        .set(&changes)
        .execute(conn)
        .into_core()?;
    Ok(())
}

/// Refuses to orphan trading pairs: the link can only go once no pair on
/// that exchange involves the asset.
pub(crate) fn delete_asset_exchange(
    conn: &mut SqliteConnection,
    asset_exchange_id: i64,
) -> Result<()> {
    let existing = load_asset_exchange_row(conn, asset_exchange_id)?;
    let dependents = list_by_asset_on_exchange(conn, existing.asset_id, existing.exchange_id)?;
    if !dependents.is_empty() {
        return Err(SettingError::DeleteViolation(format!(
            "asset exchange {} still has {} trading pair(s)",
            asset_exchange_id,
            dependents.len()
        ))
        .into());
    }
    diesel::delete(asset_exchanges::table.find(asset_exchange_id))
        .execute(conn)
        .into_core()?;
    Ok(())
}

/// Repository for managing asset data in the database
pub struct AssetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AssetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AssetRepositoryTrait for AssetRepository {
    fn get_by_id(&self, asset_id: i64) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;
        load_asset(&mut conn, asset_id)
    }

    fn list(&self) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = assets::table
            .order(assets::id.asc())
            .select(AssetDB::as_select())
            .load::<AssetDB>(&mut conn)
            .into_core()?;
        hydrate(&mut conn, rows)
    }

    fn find_by_symbol(&self, symbol: &str) -> Result<Option<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        find_by_symbol(&mut conn, symbol)
    }

    fn is_address_in_use(&self, address: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        is_address_in_use(&mut conn, address)
    }

    fn get_asset_exchange(&self, asset_exchange_id: i64) -> Result<AssetExchange> {
        let mut conn = get_connection(&self.pool)?;
        load_asset_exchange(&mut conn, asset_exchange_id)
    }

    fn find_asset_exchange(
        &self,
        asset_id: i64,
        exchange_id: i64,
    ) -> Result<Option<AssetExchange>> {
        let mut conn = get_connection(&self.pool)?;
        find_asset_exchange(&mut conn, asset_id, exchange_id)
    }

    async fn create(&self, new_asset: NewAsset) -> Result<i64> {
        self.writer
            .exec(move |conn| create_asset(conn, &new_asset))
            .await
    }

    async fn update(&self, update: AssetUpdate) -> Result<()> {
        self.writer
            .exec(move |conn| update_asset(conn, &update))
            .await
    }

    async fn change_address(&self, change: ChangeAssetAddress) -> Result<()> {
        self.writer
            .exec(move |conn| change_asset_address(conn, &change))
            .await
    }

    async fn create_asset_exchange(&self, new_asset_exchange: NewAssetExchange) -> Result<i64> {
        self.writer
            .exec(move |conn| create_asset_exchange(conn, &new_asset_exchange))
            .await
    }

    async fn update_asset_exchange(&self, update: AssetExchangeUpdate) -> Result<()> {
        self.writer
            .exec(move |conn| update_asset_exchange(conn, &update))
            .await
    }

    async fn delete_asset_exchange(&self, asset_exchange_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn| delete_asset_exchange(conn, asset_exchange_id))
            .await
    }
}
