use std::rc::Rc;

use futures::executor::block_on;

use super::*;
use crate::identity::cache::DeviceCache;
use crate::testkit::{FakeSignals, FakeStore, FixedRuntime, sample_signals};
use crate::util::storage::MemoryStorage;

type TestResolver = IdentityResolver<FakeStore, MemoryStorage, FixedRuntime, FakeSignals>;

fn resolver(store: &Rc<FakeStore>, storage: &Rc<MemoryStorage>) -> TestResolver {
    IdentityResolver::new(
        store.clone(),
        storage.clone(),
        FixedRuntime::new(1_700_000_000_000, "abc123"),
        FakeSignals::available(),
    )
}

fn cached_id(storage: &Rc<MemoryStorage>) -> Option<String> {
    DeviceCache::new(storage.clone()).load()
}

fn seed_cache(storage: &Rc<MemoryStorage>, device_id: &str) {
    DeviceCache::new(storage.clone()).store(device_id);
}

// =============================================================
// Resolution paths
// =============================================================

#[test]
fn new_device_registers_and_caches() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    *store.next_device_id.borrow_mut() = Some("dev_123".to_owned());

    let outcome = block_on(resolver(&store, &storage).resolve());

    assert_eq!(
        outcome,
        Resolution::Registered {
            device_id: "dev_123".to_owned()
        }
    );
    assert_eq!(cached_id(&storage), Some("dev_123".to_owned()));
    assert_eq!(store.calls("lookup"), 1);
    assert_eq!(store.calls("register"), 1);
}

#[test]
fn returning_device_verifies_cache_without_registering() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    store.insert_device("dev_123", "whatever");
    seed_cache(&storage, "dev_123");

    let outcome = block_on(resolver(&store, &storage).resolve());

    assert_eq!(outcome.device_id(), "dev_123");
    assert!(matches!(outcome, Resolution::Verified { .. }));
    assert_eq!(store.calls("register"), 0);
    assert_eq!(store.calls("lookup"), 0);
}

#[test]
fn repeated_resolution_returns_the_same_id_with_one_verification() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    store.insert_device("dev_123", "whatever");
    seed_cache(&storage, "dev_123");
    let resolver = resolver(&store, &storage);

    let first = block_on(resolver.resolve());
    let second = block_on(resolver.resolve());

    assert_eq!(first.device_id(), second.device_id());
    assert_eq!(store.calls("verify"), 1);
}

#[test]
fn fingerprint_match_recovers_a_cleared_cache() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    store.insert_device("dev_777", &sample_signals().digest());

    let outcome = block_on(resolver(&store, &storage).resolve());

    assert_eq!(
        outcome,
        Resolution::Matched {
            device_id: "dev_777".to_owned()
        }
    );
    assert_eq!(cached_id(&storage), Some("dev_777".to_owned()));
    assert_eq!(store.calls("register"), 0);
}

#[test]
fn stale_cache_is_cleared_then_resolved_by_fingerprint() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    store.insert_device("dev_new", &sample_signals().digest());
    seed_cache(&storage, "dev_gone");

    let outcome = block_on(resolver(&store, &storage).resolve());

    assert_eq!(outcome.device_id(), "dev_new");
    assert_eq!(cached_id(&storage), Some("dev_new".to_owned()));
}

// =============================================================
// Fallback behavior
// =============================================================

#[test]
fn total_outage_yields_a_temporary_identity() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    store.fail_all.set(true);

    let outcome = block_on(resolver(&store, &storage).resolve());

    assert_eq!(outcome.device_id(), "temp_1700000000000_abc123");
    assert!(outcome.is_fallback());
    assert_eq!(cached_id(&storage).as_deref(), Some(outcome.device_id()));
}

#[test]
fn temporary_id_matches_expected_shape() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    store.fail_all.set(true);

    let outcome = block_on(resolver(&store, &storage).resolve());
    let id = outcome.device_id();

    let mut parts = id.splitn(3, '_');
    assert_eq!(parts.next(), Some("temp"));
    assert!(parts.next().unwrap().chars().all(|c| c.is_ascii_digit()));
    assert!(
        parts
            .next()
            .unwrap()
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    );
}

#[test]
fn verification_outage_falls_back_even_with_a_cache() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    seed_cache(&storage, "dev_123");
    store.fail_all.set(true);

    let outcome = block_on(resolver(&store, &storage).resolve());

    assert!(outcome.is_fallback());
    assert!(cached_id(&storage).unwrap().starts_with("temp_"));
}

#[test]
fn missing_probe_surface_falls_back_without_remote_lookup() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    let resolver: TestResolver = IdentityResolver::new(
        store.clone(),
        storage.clone(),
        FixedRuntime::new(42, "zzz"),
        FakeSignals::unavailable(),
    );

    let outcome = block_on(resolver.resolve());

    assert!(outcome.is_fallback());
    assert_eq!(store.calls("lookup"), 0);
    assert_eq!(store.calls("register"), 0);
}

// =============================================================
// Legacy migration
// =============================================================

#[test]
fn migration_is_a_no_op_when_current_slot_is_populated() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    seed_cache(&storage, "dev_current");
    storage.set("stockroom_device_id", "dev_legacy");

    let outcome = block_on(resolver(&store, &storage).migrate_legacy());

    assert_eq!(outcome, Migration::CurrentPresent);
    assert_eq!(store.total_calls(), 0);
    assert_eq!(cached_id(&storage), Some("dev_current".to_owned()));
}

#[test]
fn migration_adopts_a_verified_legacy_id() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    store.insert_device("dev_old", "whatever");
    storage.set("stockroom_device_id", "dev_old");

    let outcome = block_on(resolver(&store, &storage).migrate_legacy());

    assert_eq!(outcome, Migration::Adopted("dev_old".to_owned()));
    assert_eq!(cached_id(&storage), Some("dev_old".to_owned()));
    assert_eq!(storage.get("stockroom_device_id"), None);
}

#[test]
fn migration_discards_an_unknown_legacy_id() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    storage.set("deviceId", "dev_gone");

    let outcome = block_on(resolver(&store, &storage).migrate_legacy());

    assert_eq!(outcome, Migration::Discarded("dev_gone".to_owned()));
    assert_eq!(cached_id(&storage), None);
    assert_eq!(storage.get("deviceId"), None);
}

#[test]
fn migration_defers_when_verification_fails() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    storage.set("stockroom_device_id", "dev_old");
    store.fail_all.set(true);

    let outcome = block_on(resolver(&store, &storage).migrate_legacy());

    assert_eq!(outcome, Migration::Deferred);
    assert_eq!(storage.get("stockroom_device_id"), Some("dev_old".to_owned()));
}

#[test]
fn resolve_adopts_legacy_ids_before_resolving() {
    let store = FakeStore::new();
    let storage = Rc::new(MemoryStorage::new());
    store.insert_device("dev_old", "whatever");
    storage.set("stockroom_device_id", "dev_old");

    let outcome = block_on(resolver(&store, &storage).resolve());

    assert_eq!(outcome.device_id(), "dev_old");
    assert!(matches!(outcome, Resolution::Verified { .. }));
    assert_eq!(store.calls("register"), 0);
}
