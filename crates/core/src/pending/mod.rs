//! Pending objects - staged mutations awaiting confirmation.

mod pending_model;
mod pending_traits;

pub use pending_model::PendingObject;
pub use pending_traits::PendingObjectRepositoryTrait;
