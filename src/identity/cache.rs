//! Versioned local cache for the resolved device identifier.
//!
//! DESIGN
//! ======
//! One namespaced slot holds a JSON record with a schema version, so future
//! layout changes are a version-bump branch instead of another ad hoc key.
//! Two deprecated plain-string keys are still read (never written) to
//! migrate long-lived installs forward.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::util::storage::KeyValueStorage;

/// Current cache slot.
pub const DEVICE_CACHE_KEY: &str = "stockroom_device_v1";

const CACHE_VERSION: u32 = 1;

/// Deprecated slots, read-only, cleared once migrated.
const LEGACY_DEVICE_KEYS: [&str; 2] = ["stockroom_device_id", "deviceId"];

#[derive(Debug, Serialize, Deserialize)]
struct CachedDevice {
    version: u32,
    device_id: String,
}

/// Device-id slot over an injected storage backend. Owns only the
/// identifier, never preference content.
#[derive(Debug)]
pub struct DeviceCache<K> {
    storage: Rc<K>,
}

impl<K: KeyValueStorage> DeviceCache<K> {
    pub fn new(storage: Rc<K>) -> Self {
        Self { storage }
    }

    /// The cached identifier, if the slot holds a well-formed record of the
    /// current version. Garbage and version mismatches read as absent.
    pub fn load(&self) -> Option<String> {
        let raw = self.storage.get(DEVICE_CACHE_KEY)?;
        let record: CachedDevice = serde_json::from_str(&raw).ok()?;
        (record.version == CACHE_VERSION && !record.device_id.is_empty())
            .then_some(record.device_id)
    }

    pub fn store(&self, device_id: &str) {
        let record = CachedDevice {
            version: CACHE_VERSION,
            device_id: device_id.to_owned(),
        };
        if let Ok(raw) = serde_json::to_string(&record) {
            self.storage.set(DEVICE_CACHE_KEY, &raw);
        }
    }

    pub fn clear(&self) {
        self.storage.remove(DEVICE_CACHE_KEY);
    }

    /// First identifier found under a deprecated key.
    pub fn peek_legacy(&self) -> Option<String> {
        LEGACY_DEVICE_KEYS
            .iter()
            .find_map(|key| self.storage.get(key).filter(|value| !value.is_empty()))
    }

    pub fn clear_legacy(&self) {
        for key in LEGACY_DEVICE_KEYS {
            self.storage.remove(key);
        }
    }
}
