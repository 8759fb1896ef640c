//! # prefsync
//!
//! Device identity and preference sync core for the Stockroom inventory
//! client. Resolves a durable identity for the current browser (cached id,
//! fingerprint match, or fresh registration), maps it to a preference record
//! on the remote store, and keeps the active color theme consistent across
//! devices, degrading to a fully functional local-only session whenever the
//! store is unreachable.
//!
//! The crate is consumed by the UI layer through [`app::ThemeProvider`] and
//! [`app::use_theme`]; everything below that is trait-injected and runs
//! identically under native tests and in the browser.

pub mod app;
pub mod identity;
pub mod net;
pub mod prefs;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod testkit;

pub use app::{ThemeHandle, ThemeProvider, use_theme};
pub use net::api::StoreConfig;
pub use prefs::record::{PreferencePatch, PreferenceRecord};
pub use state::theme::{ThemePhase, ThemeState};
pub use state::themes::{THEMES, ThemeDefinition};
