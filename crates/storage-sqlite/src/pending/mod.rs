//! SQLite storage implementation for pending objects.

mod model;
mod repository;

pub use model::{NewPendingObjectDB, PendingObjectDB};
pub use repository::PendingObjectRepository;
pub(crate) use repository::{delete_pending_object, get_pending_object};
