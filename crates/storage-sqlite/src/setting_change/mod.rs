//! Transactional application of staged setting changes.

mod applier;

pub use applier::SettingChangeApplier;
