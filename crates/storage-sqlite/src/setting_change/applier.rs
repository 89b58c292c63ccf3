use async_trait::async_trait;
use diesel::SqliteConnection;
use log::{debug, info};

use reserve_setting_core::errors::Result;
use reserve_setting_core::setting_change::{
    SettingChange, SettingChangeApplierTrait, SettingChangeEntry,
};

use crate::assets::{
    change_asset_address, create_asset, create_asset_exchange, delete_asset_exchange,
    update_asset, update_asset_exchange,
};
use crate::db::WriteHandle;
use crate::exchanges::update_exchange;
use crate::pending::{delete_pending_object, get_pending_object};
use crate::trading_pairs::{
    create_trading_by, create_trading_pair, delete_trading_pair, update_trading_pair,
};

fn apply_entry(conn: &mut SqliteConnection, entry: &SettingChangeEntry) -> Result<()> {
    match entry {
        SettingChangeEntry::CreateAsset(new_asset) => create_asset(conn, new_asset).map(|_| ()),
        SettingChangeEntry::UpdateAsset(update) => update_asset(conn, update),
        SettingChangeEntry::CreateAssetExchange(new_asset_exchange) => {
            create_asset_exchange(conn, new_asset_exchange).map(|_| ())
        }
        SettingChangeEntry::UpdateAssetExchange(update) => update_asset_exchange(conn, update),
        SettingChangeEntry::CreateTradingPair(entry) => create_trading_pair(conn, entry).map(|_| ()),
        SettingChangeEntry::UpdateTradingPair(update) => update_trading_pair(conn, update),
        SettingChangeEntry::CreateTradingBy(trading_by) => {
            create_trading_by(conn, trading_by).map(|_| ())
        }
        SettingChangeEntry::ChangeAssetAddr(change) => change_asset_address(conn, change),
        SettingChangeEntry::UpdateExchange(update) => update_exchange(conn, update),
        SettingChangeEntry::DeleteTradingPair { trading_pair_id } => {
            delete_trading_pair(conn, *trading_pair_id)
        }
        SettingChangeEntry::DeleteAssetExchange { asset_exchange_id } => {
            delete_asset_exchange(conn, *asset_exchange_id)
        }
    }
}

/// Applies every entry of the pending change `(kind, id)` in order and then
/// removes it. Must run inside a transaction: an error leaves earlier entries
/// written on the connection.
pub(crate) fn apply_pending_change(conn: &mut SqliteConnection, kind: &str, id: i64) -> Result<usize> {
    let object = get_pending_object(conn, kind, id)?;
    let change = SettingChange::from_payload(&object.payload)?;
    for (index, entry) in change.change_list.iter().enumerate() {
        debug!("Applying {} entry {} of {} {}", entry.change_type(), index, kind, id);
        apply_entry(conn, entry).map_err(|e| e.at_entry(index))?;
    }
    delete_pending_object(conn, kind, id)?;
    Ok(change.change_list.len())
}

/// Confirms staged changes on the writer actor, one immediate transaction per
/// confirmation.
pub struct SettingChangeApplier {
    writer: WriteHandle,
}

impl SettingChangeApplier {
    pub fn new(writer: WriteHandle) -> Self {
        SettingChangeApplier { writer }
    }
}

#[async_trait]
impl SettingChangeApplierTrait for SettingChangeApplier {
    async fn confirm(&self, kind: &str, id: i64) -> Result<()> {
        let owned_kind = kind.to_string();
        let applied = self
            .writer
            .exec(move |conn| apply_pending_change(conn, &owned_kind, id))
            .await?;
        info!("Applied {} entries of {} {}", applied, kind, id);
        Ok(())
    }
}
