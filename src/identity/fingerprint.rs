//! Best-effort device fingerprint.
//!
//! DESIGN
//! ======
//! A fingerprint recognizes a returning device whose cached identifier was
//! cleared; it is a low-entropy heuristic and never an authorization input.
//! Signals are serialized in a fixed order and hashed with SHA-256 so the
//! digest is stable across sessions on the same device.

#[cfg(test)]
#[path = "fingerprint_test.rs"]
mod fingerprint_test;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Environment signals contributing to the fingerprint. The raw struct is
/// also sent on registration so the server can inspect individual fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSignals {
    pub user_agent: String,
    pub language: String,
    /// IANA timezone name, e.g. `America/Chicago`.
    pub timezone: String,
    pub screen_width: i32,
    pub screen_height: i32,
    pub color_depth: i32,
    pub platform: String,
    pub cookies_enabled: bool,
    /// Digest of pixels rendered onto an offscreen canvas. Rendering varies
    /// subtly by GPU, driver, and font stack, which makes it a useful weak
    /// signal. Empty when no rendering surface exists.
    pub canvas_hash: String,
}

impl DeviceSignals {
    /// Deterministic serialization used as the digest input. Field order is
    /// part of the wire contract: changing it re-identifies every device.
    pub fn canonical(&self) -> String {
        format!(
            "{}|{}|{}|{}x{}x{}|{}|{}|{}",
            self.user_agent,
            self.language,
            self.timezone,
            self.screen_width,
            self.screen_height,
            self.color_depth,
            self.platform,
            self.cookies_enabled,
            self.canvas_hash,
        )
    }

    /// SHA-256 hex digest of the canonical form.
    pub fn digest(&self) -> String {
        hex_digest(self.canonical().as_bytes())
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect::<String>()
}

/// Platform probe set. Each target supplies whatever signals it can reach;
/// `None` means no probe surface at all (headless build, SSR pass).
pub trait SignalSource {
    fn collect(&self) -> Option<DeviceSignals>;
}
