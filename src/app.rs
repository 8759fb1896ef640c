//! Leptos context glue and browser composition root.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ThemeProvider` wires the browser collaborators (HTTP store, localStorage,
//! system clock, environment probes) into one [`ThemeController`] per
//! session and exposes it to the component tree as a [`ThemeHandle`].
//! Components read the state signal and dispatch changes; all async work is
//! spawned off the render path so the tree always has a valid theme.

use std::rc::Rc;

use leptos::prelude::*;

use crate::net::api::{HttpStore, StoreConfig};
use crate::state::theme::{ThemeController, ThemeState};
use crate::util::probes::BrowserSignals;
use crate::util::runtime::SystemRuntime;
use crate::util::storage::BrowserStorage;

/// Controller wired with the browser implementations of every collaborator.
pub type BrowserThemeController =
    ThemeController<HttpStore, BrowserStorage, SystemRuntime, BrowserSignals>;

/// Build the production controller. `username` keys preferences by account
/// when the session is authenticated; `None` scopes them to the device.
pub fn browser_theme_controller(
    username: Option<String>,
    config: StoreConfig,
) -> Rc<BrowserThemeController> {
    Rc::new(ThemeController::new(
        Rc::new(HttpStore::new(config)),
        Rc::new(BrowserStorage),
        Rc::new(SystemRuntime),
        Rc::new(BrowserSignals),
        username,
    ))
}

/// Context handle for theme-aware components.
#[derive(Clone, Copy)]
pub struct ThemeHandle {
    state: RwSignal<ThemeState>,
    controller: StoredValue<Rc<BrowserThemeController>, LocalStorage>,
}

impl ThemeHandle {
    /// Reactive snapshot of the theme session.
    pub fn state(&self) -> ThemeState {
        self.state.get()
    }

    pub fn signal(&self) -> RwSignal<ThemeState> {
        self.state
    }

    pub fn is_dark(&self) -> bool {
        self.state.get().is_dark()
    }

    /// True once resolution has finished; gate theme-sensitive UI on this to
    /// avoid flashing the wrong palette.
    pub fn ready(&self) -> bool {
        self.state.get().ready()
    }

    /// Apply and persist a theme. The surface updates before the network
    /// write settles; persistence failures only log.
    pub fn set_theme(&self, theme_id: &str) {
        let theme_id = theme_id.to_owned();
        let state = self.state;
        let controller = self.controller;
        leptos::task::spawn_local(async move {
            let controller = controller.get_value();
            controller.set_theme(&theme_id).await;
            state.set(controller.snapshot());
        });
    }
}

/// Provides [`ThemeHandle`] to the tree and kicks off resolution on mount.
#[component]
pub fn ThemeProvider(
    /// Account name for authenticated sessions.
    #[prop(optional)]
    username: Option<String>,
    children: Children,
) -> impl IntoView {
    let state = RwSignal::new(ThemeState::default());
    let controller = StoredValue::new_local(browser_theme_controller(
        username,
        StoreConfig::default(),
    ));
    provide_context(ThemeHandle { state, controller });

    Effect::new(move || {
        leptos::task::spawn_local(async move {
            let controller = controller.get_value();
            controller.initialize().await;
            state.set(controller.snapshot());
        });
    });

    children()
}

/// Access the theme context. Panics outside a [`ThemeProvider`], matching
/// the failure mode of a missing provider during development.
pub fn use_theme() -> ThemeHandle {
    expect_context::<ThemeHandle>()
}

/// Route `log` output to the browser console. Call once from the hydrate
/// entry point.
pub fn init_browser_logging() {
    #[cfg(feature = "hydrate")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Debug);
    }
}
