use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A staged mutation. The payload is opaque to the store; only the code that
/// knows `kind` decodes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingObject {
    pub id: i64,
    pub kind: String,
    pub payload: String,
    pub created_at: NaiveDateTime,
}
