//! Remote preference/identity store transport.
//!
//! SYSTEM CONTEXT
//! ==============
//! The remote store is a thin record service reached over HTTP. Everything
//! above this module talks to the [`RemoteStore`] trait so tests and headless
//! embeddings can substitute in-memory implementations; [`api::HttpStore`] is
//! the production transport.

pub mod api;
pub mod types;

use crate::identity::fingerprint::DeviceSignals;
use crate::prefs::record::PreferenceRecord;

/// Transport-level failure. Services downstream convert these into degraded
/// outcomes; nothing here reaches the UI tree as an error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("remote store rejected request: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("request timed out after {0}ms")]
    Timeout(u32),
    #[error("remote store is not reachable from this build")]
    Unavailable,
}

/// Remote store operations. Pure I/O; no caching on this layer.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Reachability probe used once per session to decide whether
    /// cross-device sync is attempted at all.
    async fn health(&self) -> bool;

    /// Confirm a cached device id is still known to the store.
    async fn verify_device(&self, device_id: &str) -> Result<bool, StoreError>;

    /// Find a registered device by fingerprint digest.
    async fn find_device_by_fingerprint(
        &self,
        fingerprint_hash: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Register a new device, sending the digest and the raw signals for
    /// server-side matching. Returns the issued device id.
    async fn register_device(
        &self,
        signals: &DeviceSignals,
        fingerprint_hash: &str,
    ) -> Result<String, StoreError>;

    /// Last-seen heartbeat for a resolved device.
    async fn touch_device(&self, device_id: &str) -> Result<(), StoreError>;

    /// Read the preference record for an identity. `None` when the store has
    /// never seen this identity.
    async fn fetch_preferences(
        &self,
        identity: &str,
    ) -> Result<Option<PreferenceRecord>, StoreError>;

    /// Write the merged record for an identity.
    async fn store_preferences(
        &self,
        identity: &str,
        record: &PreferenceRecord,
    ) -> Result<(), StoreError>;

    /// Link a resolved device to an authenticated user's device list.
    async fn bind_device(&self, username: &str, device_id: &str) -> Result<(), StoreError>;
}
