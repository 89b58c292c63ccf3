use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use reserve_setting_core::errors::{Result, SettingError};
use reserve_setting_core::pending::{PendingObject, PendingObjectRepositoryTrait};

use super::model::{NewPendingObjectDB, PendingObjectDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::pending_objects;

fn not_found(kind: &str, id: i64) -> SettingError {
    SettingError::NotFound(format!("pending object {} of kind {}", id, kind))
}

/// Inserts a payload under `kind`. A singleton kind keeps at most one object,
/// so earlier ones are removed first.
pub(crate) fn stage_pending_object(
    conn: &mut SqliteConnection,
    kind: &str,
    payload: String,
    singleton: bool,
) -> Result<i64> {
    if singleton {
        let replaced = diesel::delete(pending_objects::table.filter(pending_objects::kind.eq(kind)))
            .execute(conn)
            .into_core()?;
        if replaced > 0 {
            debug!("Replaced {} pending object(s) of kind {}", replaced, kind);
        }
    }
    diesel::insert_into(pending_objects::table)
        .values(&NewPendingObjectDB {
            kind: kind.to_string(),
            payload,
            created_at: chrono::Utc::now().naive_utc(),
        })
        .returning(pending_objects::id)
        .get_result::<i64>(conn)
        .into_core()
}

pub(crate) fn get_pending_object(
    conn: &mut SqliteConnection,
    kind: &str,
    id: i64,
) -> Result<PendingObject> {
    pending_objects::table
        .filter(pending_objects::id.eq(id))
        .filter(pending_objects::kind.eq(kind))
        .select(PendingObjectDB::as_select())
        .first::<PendingObjectDB>(conn)
        .optional()
        .into_core()?
        .map(PendingObject::from)
        .ok_or_else(|| not_found(kind, id).into())
}

pub(crate) fn delete_pending_object(conn: &mut SqliteConnection, kind: &str, id: i64) -> Result<()> {
    let deleted = diesel::delete(
        pending_objects::table
            .filter(pending_objects::id.eq(id))
            .filter(pending_objects::kind.eq(kind)),
    )
    .execute(conn)
    .into_core()?;
    if deleted == 0 {
        return Err(not_found(kind, id).into());
    }
    Ok(())
}

pub struct PendingObjectRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PendingObjectRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PendingObjectRepository { pool, writer }
    }
}

#[async_trait]
impl PendingObjectRepositoryTrait for PendingObjectRepository {
    async fn stage(&self, kind: &str, payload: String, singleton: bool) -> Result<i64> {
        let kind = kind.to_string();
        self.writer
            .exec(move |conn| stage_pending_object(conn, &kind, payload, singleton))
            .await
    }

    fn get(&self, kind: &str, id: i64) -> Result<PendingObject> {
        let mut conn = get_connection(&self.pool)?;
        get_pending_object(&mut conn, kind, id)
    }

    fn list(&self, kind: &str) -> Result<Vec<PendingObject>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = pending_objects::table
            .filter(pending_objects::kind.eq(kind))
            .order(pending_objects::id.asc())
            .select(PendingObjectDB::as_select())
            .load::<PendingObjectDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(PendingObject::from).collect())
    }

    async fn delete(&self, kind: &str, id: i64) -> Result<()> {
        let kind = kind.to_string();
        self.writer
            .exec(move |conn| delete_pending_object(conn, &kind, id))
            .await
    }
}
