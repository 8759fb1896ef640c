//! Wire DTOs for the remote store.
//!
//! Every response is wrapped in a `{success, data, message}` envelope.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

use crate::identity::fingerprint::DeviceSignals;
use crate::prefs::record::{PreferencePatch, PreferenceRecord};

/// Standard response wrapper.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct VerifyDeviceRequest<'a> {
    pub device_id: &'a str,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerifyDeviceData {
    pub exists: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct LookupDeviceRequest<'a> {
    pub fingerprint_hash: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LookupDeviceData {
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Registration carries the digest plus raw signals; the commonly-inspected
/// fields are duplicated at the top level for server-side convenience.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterDeviceRequest<'a> {
    pub fingerprint_hash: &'a str,
    pub fingerprint: &'a DeviceSignals,
    pub user_agent: &'a str,
    pub platform: &'a str,
    pub timezone: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterDeviceData {
    pub device_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct TouchDeviceRequest<'a> {
    pub device_id: &'a str,
}

/// Stored preference document. An empty `preferences` object means the
/// identity has no record yet.
#[derive(Clone, Debug, Deserialize)]
pub struct PreferencesDoc {
    pub username: String,
    #[serde(default)]
    pub preferences: PreferencePatch,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SavePreferencesRequest<'a> {
    pub device_id: &'a str,
    pub preferences: &'a PreferenceRecord,
}

#[derive(Clone, Debug, Serialize)]
pub struct BindDeviceRequest<'a> {
    pub username: &'a str,
    pub device: &'a str,
}
