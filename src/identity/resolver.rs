//! Device identity resolution.
//!
//! SYSTEM CONTEXT
//! ==============
//! Produces one durable identifier for the current runtime context by
//! consulting, in order: the local cache (remotely verified), a fingerprint
//! lookup, and registration. Every failure path terminates in a locally
//! synthesized identifier, so `resolve` cannot error and the caller always
//! has an identity to key preferences on.

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::identity::cache::DeviceCache;
use crate::identity::fingerprint::SignalSource;
use crate::net::RemoteStore;
use crate::util::runtime::{Clock, Entropy};
use crate::util::storage::KeyValueStorage;

/// How the identifier was obtained. Callers that only need the id use
/// [`Resolution::device_id`]; tests and telemetry branch on the variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Cached id confirmed by the remote store.
    Verified { device_id: String },
    /// No usable cache; an existing registration matched our fingerprint.
    Matched { device_id: String },
    /// First visit: a new identity was registered.
    Registered { device_id: String },
    /// Remote store or probe surface unavailable; locally synthesized id,
    /// valid for theming but not synced across devices.
    Fallback { device_id: String },
}

impl Resolution {
    pub fn device_id(&self) -> &str {
        match self {
            Self::Verified { device_id }
            | Self::Matched { device_id }
            | Self::Registered { device_id }
            | Self::Fallback { device_id } => device_id,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Outcome of the one-time legacy key migration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Migration {
    /// Current slot already populated; nothing checked remotely.
    CurrentPresent,
    /// No deprecated key held a value.
    NoLegacy,
    /// Legacy id verified remotely and adopted under the current key.
    Adopted(String),
    /// Legacy id no longer known remotely; dropped.
    Discarded(String),
    /// Verification failed; legacy key left in place for a later session.
    Deferred,
}

/// Resolver with injected collaborators. One instance per session; repeat
/// calls short-circuit on the memoized outcome.
pub struct IdentityResolver<S, K, R, G> {
    store: Rc<S>,
    cache: DeviceCache<K>,
    runtime: Rc<R>,
    signals: Rc<G>,
    resolved: RefCell<Option<Resolution>>,
    migrated: Cell<bool>,
}

impl<S, K, R, G> IdentityResolver<S, K, R, G>
where
    S: RemoteStore,
    K: KeyValueStorage,
    R: Clock + Entropy,
    G: SignalSource,
{
    pub fn new(store: Rc<S>, storage: Rc<K>, runtime: Rc<R>, signals: Rc<G>) -> Self {
        Self {
            store,
            cache: DeviceCache::new(storage),
            runtime,
            signals,
            resolved: RefCell::new(None),
            migrated: Cell::new(false),
        }
    }

    /// Resolve the device identity. Idempotent and infallible: the first
    /// call does the work, later calls return the same outcome.
    pub async fn resolve(&self) -> Resolution {
        if let Some(previous) = self.resolved.borrow().clone() {
            return previous;
        }
        if !self.migrated.replace(true) {
            self.migrate_legacy().await;
        }
        let outcome = self.resolve_slow().await;
        *self.resolved.borrow_mut() = Some(outcome.clone());
        outcome
    }

    async fn resolve_slow(&self) -> Resolution {
        if let Some(cached) = self.cache.load() {
            match self.store.verify_device(&cached).await {
                Ok(true) => {
                    if let Err(err) = self.store.touch_device(&cached).await {
                        log::debug!("last-seen update for {cached} failed: {err}");
                    }
                    return Resolution::Verified { device_id: cached };
                }
                Ok(false) => {
                    log::info!("cached device id {cached} is no longer registered; re-resolving");
                    self.cache.clear();
                }
                Err(err) => {
                    return self.fallback("device verification failed", &err.to_string());
                }
            }
        }

        let Some(signals) = self.signals.collect() else {
            return self.fallback("device signals unavailable", "no probe surface");
        };
        let fingerprint_hash = signals.digest();

        match self
            .store
            .find_device_by_fingerprint(&fingerprint_hash)
            .await
        {
            Ok(Some(device_id)) => {
                self.cache.store(&device_id);
                if let Err(err) = self.store.touch_device(&device_id).await {
                    log::debug!("last-seen update for {device_id} failed: {err}");
                }
                log::debug!("fingerprint matched existing device {device_id}");
                Resolution::Matched { device_id }
            }
            Ok(None) => match self.store.register_device(&signals, &fingerprint_hash).await {
                Ok(device_id) => {
                    self.cache.store(&device_id);
                    log::debug!("registered new device {device_id}");
                    Resolution::Registered { device_id }
                }
                Err(err) => self.fallback("device registration failed", &err.to_string()),
            },
            Err(err) => self.fallback("fingerprint lookup failed", &err.to_string()),
        }
    }

    /// Synthesize and cache a temporary identity. The session stays fully
    /// functional locally; cross-device sync resumes on a later resolution.
    fn fallback(&self, what: &str, why: &str) -> Resolution {
        let device_id = format!("temp_{}_{}", self.runtime.now_ms(), self.runtime.token());
        log::warn!("{what} ({why}); continuing with local identity {device_id}");
        self.cache.store(&device_id);
        Resolution::Fallback { device_id }
    }

    /// One-time adoption of identifiers stored under deprecated keys.
    /// A populated current slot makes this a no-op with no remote traffic.
    pub async fn migrate_legacy(&self) -> Migration {
        if self.cache.load().is_some() {
            return Migration::CurrentPresent;
        }
        let Some(legacy) = self.cache.peek_legacy() else {
            return Migration::NoLegacy;
        };
        match self.store.verify_device(&legacy).await {
            Ok(true) => {
                self.cache.store(&legacy);
                self.cache.clear_legacy();
                log::info!("adopted legacy device id {legacy}");
                Migration::Adopted(legacy)
            }
            Ok(false) => {
                self.cache.clear_legacy();
                log::info!("legacy device id {legacy} is no longer registered; discarded");
                Migration::Discarded(legacy)
            }
            Err(err) => {
                log::warn!("legacy id verification failed: {err}; keeping key for later");
                Migration::Deferred
            }
        }
    }
}
