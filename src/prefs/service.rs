//! Preference read/merge/write service.
//!
//! SYSTEM CONTEXT
//! ==============
//! Sits between the identity layer and the theme/settings UI. The remote
//! record is authoritative; the service keeps a read-through local copy per
//! identity and reconciles optimistically: local state changes before the
//! network call resolves, and a failed push is kept locally rather than
//! rolled back, so the UI never shows a reverted value.
//!
//! ERROR HANDLING
//! ==============
//! Reads and writes cannot error. Degradations are reported through
//! [`LoadSource`] and [`PersistOutcome`] so callers and tests can tell a
//! synced operation from a local-only one.

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::net::{RemoteStore, StoreError};
use crate::prefs::record::{PreferencePatch, PreferenceRecord};
use crate::util::runtime::Clock;

/// Whether this session attempts cross-device sync at all. Decided once by
/// the bootstrap health probe and never re-checked within a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    #[default]
    Connected,
    LocalOnly,
}

/// Where a loaded record came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /// Fetched from the remote store.
    Remote,
    /// Identity had no record; defaults were stamped and persisted so every
    /// device derives the same initial record.
    Seeded,
    /// Remote read failed; last known local copy (or defaults) served.
    Fallback,
    /// Local-only session; no remote read attempted.
    Local,
}

/// Result of a write. The local copy is updated in every case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistOutcome {
    Synced,
    /// Local-only session; nothing pushed.
    LocalOnly,
    /// Another write for this identity is in flight; this value rides along
    /// on its follow-up push (last write wins).
    Queued,
    /// Push failed; the local value is intentionally kept.
    RemoteFailed(StoreError),
}

/// Preference service with injected store and clock.
pub struct PreferencesService<S, R> {
    store: Rc<S>,
    runtime: Rc<R>,
    mode: Cell<SyncMode>,
    known: RefCell<HashMap<String, PreferenceRecord>>,
    writing: RefCell<HashSet<String>>,
    pending: RefCell<HashMap<String, PreferenceRecord>>,
}

impl<S, R> PreferencesService<S, R>
where
    S: RemoteStore,
    R: Clock,
{
    pub fn new(store: Rc<S>, runtime: Rc<R>) -> Self {
        Self {
            store,
            runtime,
            mode: Cell::new(SyncMode::Connected),
            known: RefCell::new(HashMap::new()),
            writing: RefCell::new(HashSet::new()),
            pending: RefCell::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode.get()
    }

    /// Session bootstrap: probe the store once and pick the sync mode.
    pub async fn connect(&self) -> SyncMode {
        let mode = if self.store.health().await {
            SyncMode::Connected
        } else {
            log::warn!("preference store unreachable; session is local-only");
            SyncMode::LocalOnly
        };
        self.mode.set(mode);
        mode
    }

    /// The current local copy for `identity`, if any.
    pub fn known(&self, identity: &str) -> Option<PreferenceRecord> {
        self.known.borrow().get(identity).cloned()
    }

    /// Read the record for `identity`. Infallible: failures degrade to the
    /// local copy or the documented defaults.
    pub async fn load(&self, identity: &str) -> (PreferenceRecord, LoadSource) {
        if self.mode.get() == SyncMode::LocalOnly {
            return (self.known(identity).unwrap_or_default(), LoadSource::Local);
        }
        match self.store.fetch_preferences(identity).await {
            Ok(Some(record)) => {
                self.known
                    .borrow_mut()
                    .insert(identity.to_owned(), record.clone());
                (record, LoadSource::Remote)
            }
            Ok(None) => {
                let now = self.runtime.now_ms();
                let record = PreferenceRecord {
                    updated_at: now,
                    last_active: now,
                    ..PreferenceRecord::default()
                };
                // Persist the defaults so a second device reads this record
                // instead of deriving its own.
                if let Err(err) = self.store.store_preferences(identity, &record).await {
                    log::warn!("could not seed defaults for {identity}: {err}");
                }
                self.known
                    .borrow_mut()
                    .insert(identity.to_owned(), record.clone());
                (record, LoadSource::Seeded)
            }
            Err(err) => {
                log::warn!("preference read failed for {identity}: {err}; serving local copy");
                (
                    self.known(identity).unwrap_or_default(),
                    LoadSource::Fallback,
                )
            }
        }
    }

    /// Merge `patch` into the local copy and push the merged record.
    /// The local update is applied before any network I/O and survives a
    /// failed push.
    pub async fn save(&self, identity: &str, patch: &PreferencePatch) -> PersistOutcome {
        let record = {
            let mut known = self.known.borrow_mut();
            let entry = known.entry(identity.to_owned()).or_default();
            entry.apply(patch);
            let now = self.runtime.now_ms();
            entry.updated_at = now;
            entry.last_active = now;
            entry.clone()
        };

        if self.mode.get() == SyncMode::LocalOnly {
            return PersistOutcome::LocalOnly;
        }
        if self.writing.borrow().contains(identity) {
            self.pending.borrow_mut().insert(identity.to_owned(), record);
            return PersistOutcome::Queued;
        }

        self.writing.borrow_mut().insert(identity.to_owned());
        let mut outcome = PersistOutcome::Synced;
        let mut next = Some(record);
        while let Some(current) = next {
            outcome = match self.store.store_preferences(identity, &current).await {
                Ok(()) => PersistOutcome::Synced,
                Err(err) => {
                    log::warn!("preference write failed for {identity}: {err}; keeping local value");
                    PersistOutcome::RemoteFailed(err)
                }
            };
            next = self.pending.borrow_mut().remove(identity);
        }
        self.writing.borrow_mut().remove(identity);
        outcome
    }

    /// Sugar for the single most common update.
    pub async fn update_theme(&self, identity: &str, theme_id: &str) -> PersistOutcome {
        self.save(identity, &PreferencePatch::theme(theme_id)).await
    }
}
