//! Theme session state and controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! The sole application-facing consumer of the identity and preference
//! layers. Initialization resolves who the caller is and applies their
//! stored theme; the setter applies changes to the rendering surface
//! immediately and persists in the background. There is no error state:
//! every failure degrades to a local-only session that still themes.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::identity::fingerprint::SignalSource;
use crate::identity::resolver::IdentityResolver;
use crate::net::RemoteStore;
use crate::prefs::service::{PersistOutcome, PreferencesService, SyncMode};
use crate::state::themes::{self, ThemeDefinition};
use crate::util::runtime::{Clock, Entropy};
use crate::util::storage::KeyValueStorage;

/// Local fallback slot: the last applied theme id, used before resolution
/// completes and for sessions with no identity at all.
pub const LOCAL_THEME_KEY: &str = "stockroom_theme";

/// Initialization lifecycle. Dependent UI can gate on [`ThemeState::ready`]
/// to avoid flashing the wrong theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemePhase {
    #[default]
    Uninitialized,
    Resolving,
    Ready,
}

/// Snapshot of the applied theme session.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeState {
    pub phase: ThemePhase,
    pub theme: &'static ThemeDefinition,
    pub mode: SyncMode,
    /// Logical key preferences are stored under: the username when
    /// authenticated, else the resolved device id. `None` until resolution
    /// completes or in local-only sessions.
    pub identity: Option<String>,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            phase: ThemePhase::Uninitialized,
            theme: themes::default_theme(),
            mode: SyncMode::Connected,
            identity: None,
        }
    }
}

impl ThemeState {
    pub fn is_dark(&self) -> bool {
        self.theme.dark
    }

    pub fn ready(&self) -> bool {
        self.phase == ThemePhase::Ready
    }
}

/// Session controller composing the resolver and preference service.
/// Constructed once per session by the composition root.
pub struct ThemeController<S, K, R, G> {
    store: Rc<S>,
    resolver: IdentityResolver<S, K, R, G>,
    prefs: PreferencesService<S, R>,
    storage: Rc<K>,
    username: Option<String>,
    state: RefCell<ThemeState>,
}

impl<S, K, R, G> ThemeController<S, K, R, G>
where
    S: RemoteStore,
    K: KeyValueStorage,
    R: Clock + Entropy,
    G: SignalSource,
{
    pub fn new(
        store: Rc<S>,
        storage: Rc<K>,
        runtime: Rc<R>,
        signals: Rc<G>,
        username: Option<String>,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(
                store.clone(),
                storage.clone(),
                runtime.clone(),
                signals,
            ),
            prefs: PreferencesService::new(store.clone(), runtime),
            store,
            storage,
            username,
            state: RefCell::new(ThemeState::default()),
        }
    }

    pub fn snapshot(&self) -> ThemeState {
        self.state.borrow().clone()
    }

    /// The underlying service, for settings screens beyond the theme.
    pub fn preferences(&self) -> &PreferencesService<S, R> {
        &self.prefs
    }

    /// Resolve identity, load the stored theme, and apply it. Safe to call
    /// repeatedly; only the first call does work. The surface is themed
    /// before this returns regardless of any remote outcome.
    pub async fn initialize(&self) {
        if self.state.borrow().phase != ThemePhase::Uninitialized {
            return;
        }
        self.state.borrow_mut().phase = ThemePhase::Resolving;

        let mode = self.prefs.connect().await;
        if mode == SyncMode::LocalOnly {
            let theme = self.local_theme();
            self.apply(theme, mode, None);
            return;
        }

        let resolution = self.resolver.resolve().await;
        let device_id = resolution.device_id().to_owned();
        let identity = match &self.username {
            Some(name) => {
                if !resolution.is_fallback() {
                    if let Err(err) = self.store.bind_device(name, &device_id).await {
                        log::debug!("device link for {name} failed: {err}");
                    }
                }
                name.clone()
            }
            None => device_id,
        };

        let (record, source) = self.prefs.load(&identity).await;
        log::debug!("theme session for {identity} loaded from {source:?}");
        let theme = themes::find(&record.theme).unwrap_or_else(|| {
            log::warn!("unknown stored theme {:?}; using default", record.theme);
            themes::default_theme()
        });
        self.apply(theme, mode, Some(identity));
    }

    /// Apply a theme by id. Returns `None` for ids outside the registry
    /// (nothing changes); otherwise the state, rendering surface, and local
    /// fallback slot update synchronously and the persistence outcome is
    /// reported after the background push settles. The applied value is kept
    /// even when persistence fails.
    pub async fn set_theme(&self, theme_id: &str) -> Option<PersistOutcome> {
        let Some(theme) = themes::find(theme_id) else {
            log::warn!("ignoring unknown theme id {theme_id:?}");
            return None;
        };

        let (mode, identity) = {
            let mut state = self.state.borrow_mut();
            state.theme = theme;
            (state.mode, state.identity.clone())
        };
        self.storage.set(LOCAL_THEME_KEY, theme.id);
        apply_document_theme(theme);

        let outcome = match (mode, identity) {
            (SyncMode::Connected, Some(identity)) => {
                self.prefs.update_theme(&identity, theme_id).await
            }
            _ => PersistOutcome::LocalOnly,
        };
        Some(outcome)
    }

    /// Theme for sessions that never reach the remote store: the local slot,
    /// else the system color-scheme preference, else the default.
    fn local_theme(&self) -> &'static ThemeDefinition {
        if let Some(id) = self.storage.get(LOCAL_THEME_KEY) {
            if let Some(theme) = themes::find(&id) {
                return theme;
            }
        }
        if prefers_light() {
            themes::find("light").unwrap_or_else(themes::default_theme)
        } else {
            themes::default_theme()
        }
    }

    fn apply(&self, theme: &'static ThemeDefinition, mode: SyncMode, identity: Option<String>) {
        {
            let mut state = self.state.borrow_mut();
            state.theme = theme;
            state.mode = mode;
            state.identity = identity;
            state.phase = ThemePhase::Ready;
        }
        self.storage.set(LOCAL_THEME_KEY, theme.id);
        apply_document_theme(theme);
    }
}

/// Write the theme id onto `<html data-theme=...>`. The stylesheet keys all
/// palette variables off this attribute.
pub fn apply_document_theme(theme: &ThemeDefinition) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
            if let Some(el) = doc.document_element() {
                let _ = el.set_attribute("data-theme", theme.id);
            }
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = theme;
    }
}

/// System-level light preference via `prefers-color-scheme`.
fn prefers_light() -> bool {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()
            .and_then(|w| w.match_media("(prefers-color-scheme: light)").ok().flatten())
            .is_some_and(|mq| mq.matches())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        false
    }
}
