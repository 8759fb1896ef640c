//! Preference records and the sync service above the identity layer.

pub mod record;
pub mod service;
