//! Shared fakes for service-layer tests: an in-memory remote store, a fixed
//! clock/entropy source, and a scriptable probe set.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::identity::fingerprint::{DeviceSignals, SignalSource};
use crate::net::{RemoteStore, StoreError};
use crate::prefs::record::PreferenceRecord;
use crate::util::runtime::{Clock, Entropy};

/// In-memory remote store with failure switches and a call log.
pub(crate) struct FakeStore {
    pub healthy: Cell<bool>,
    pub fail_all: Cell<bool>,
    pub fail_writes: Cell<bool>,
    /// device id -> fingerprint digest
    pub devices: RefCell<HashMap<String, String>>,
    pub prefs: RefCell<HashMap<String, PreferenceRecord>>,
    /// Next id issued by `register_device`; auto-generated when unset.
    pub next_device_id: RefCell<Option<String>>,
    pub bindings: RefCell<Vec<(String, String)>>,
    call_log: RefCell<Vec<&'static str>>,
}

impl FakeStore {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            healthy: Cell::new(true),
            fail_all: Cell::new(false),
            fail_writes: Cell::new(false),
            devices: RefCell::new(HashMap::new()),
            prefs: RefCell::new(HashMap::new()),
            next_device_id: RefCell::new(None),
            bindings: RefCell::new(Vec::new()),
            call_log: RefCell::new(Vec::new()),
        })
    }

    pub fn insert_device(&self, device_id: &str, fingerprint_hash: &str) {
        self.devices
            .borrow_mut()
            .insert(device_id.to_owned(), fingerprint_hash.to_owned());
    }

    /// How many times `op` was invoked.
    pub fn calls(&self, op: &'static str) -> usize {
        self.call_log.borrow().iter().filter(|name| **name == op).count()
    }

    pub fn total_calls(&self) -> usize {
        self.call_log.borrow().len()
    }

    fn log(&self, op: &'static str) {
        self.call_log.borrow_mut().push(op);
    }

    fn offline(&self) -> StoreError {
        StoreError::Network("connection refused".to_owned())
    }
}

impl RemoteStore for FakeStore {
    async fn health(&self) -> bool {
        self.log("health");
        self.healthy.get() && !self.fail_all.get()
    }

    async fn verify_device(&self, device_id: &str) -> Result<bool, StoreError> {
        self.log("verify");
        if self.fail_all.get() {
            return Err(self.offline());
        }
        Ok(self.devices.borrow().contains_key(device_id))
    }

    async fn find_device_by_fingerprint(
        &self,
        fingerprint_hash: &str,
    ) -> Result<Option<String>, StoreError> {
        self.log("lookup");
        if self.fail_all.get() {
            return Err(self.offline());
        }
        Ok(self
            .devices
            .borrow()
            .iter()
            .find(|(_, hash)| hash.as_str() == fingerprint_hash)
            .map(|(id, _)| id.clone()))
    }

    async fn register_device(
        &self,
        _signals: &DeviceSignals,
        fingerprint_hash: &str,
    ) -> Result<String, StoreError> {
        self.log("register");
        if self.fail_all.get() {
            return Err(self.offline());
        }
        let device_id = self
            .next_device_id
            .borrow_mut()
            .take()
            .unwrap_or_else(|| format!("dev_{}", self.devices.borrow().len() + 1));
        self.insert_device(&device_id, fingerprint_hash);
        Ok(device_id)
    }

    async fn touch_device(&self, _device_id: &str) -> Result<(), StoreError> {
        self.log("touch");
        if self.fail_all.get() {
            return Err(self.offline());
        }
        Ok(())
    }

    async fn fetch_preferences(
        &self,
        identity: &str,
    ) -> Result<Option<PreferenceRecord>, StoreError> {
        self.log("fetch_prefs");
        if self.fail_all.get() {
            return Err(self.offline());
        }
        Ok(self.prefs.borrow().get(identity).cloned())
    }

    async fn store_preferences(
        &self,
        identity: &str,
        record: &PreferenceRecord,
    ) -> Result<(), StoreError> {
        self.log("store_prefs");
        if self.fail_all.get() || self.fail_writes.get() {
            return Err(self.offline());
        }
        self.prefs
            .borrow_mut()
            .insert(identity.to_owned(), record.clone());
        Ok(())
    }

    async fn bind_device(&self, username: &str, device_id: &str) -> Result<(), StoreError> {
        self.log("bind");
        if self.fail_all.get() {
            return Err(self.offline());
        }
        self.bindings
            .borrow_mut()
            .push((username.to_owned(), device_id.to_owned()));
        Ok(())
    }
}

/// Deterministic clock and token source.
pub(crate) struct FixedRuntime {
    pub now: Cell<u64>,
    token: String,
}

impl FixedRuntime {
    pub fn new(now: u64, token: &str) -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(now),
            token: token.to_owned(),
        })
    }
}

impl Clock for FixedRuntime {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

impl Entropy for FixedRuntime {
    fn token(&self) -> String {
        self.token.clone()
    }
}

/// Probe set returning a fixed signal sample, or nothing at all.
pub(crate) struct FakeSignals {
    signals: Option<DeviceSignals>,
}

impl FakeSignals {
    pub fn available() -> Rc<Self> {
        Rc::new(Self {
            signals: Some(sample_signals()),
        })
    }

    pub fn unavailable() -> Rc<Self> {
        Rc::new(Self { signals: None })
    }
}

impl SignalSource for FakeSignals {
    fn collect(&self) -> Option<DeviceSignals> {
        self.signals.clone()
    }
}

pub(crate) fn sample_signals() -> DeviceSignals {
    DeviceSignals {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64)".to_owned(),
        language: "en-US".to_owned(),
        timezone: "America/Chicago".to_owned(),
        screen_width: 1920,
        screen_height: 1080,
        color_depth: 24,
        platform: "Linux x86_64".to_owned(),
        cookies_enabled: true,
        canvas_hash: "c0ffee".to_owned(),
    }
}
