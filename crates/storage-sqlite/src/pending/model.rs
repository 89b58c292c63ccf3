//! Database model for pending objects.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use reserve_setting_core::pending::PendingObject;

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::pending_objects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PendingObjectDB {
    pub id: i64,
    pub kind: String,
    pub payload: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::pending_objects)]
pub struct NewPendingObjectDB {
    pub kind: String,
    pub payload: String,
    pub created_at: NaiveDateTime,
}

impl From<PendingObjectDB> for PendingObject {
    fn from(db: PendingObjectDB) -> Self {
        Self {
            id: db.id,
            kind: db.kind,
            payload: db.payload,
            created_at: db.created_at,
        }
    }
}
