#![cfg(not(feature = "hydrate"))]

use futures::executor::block_on;

use super::*;

// =============================================================
// Endpoint builders
// =============================================================

#[test]
fn endpoints_share_the_configured_base() {
    assert_eq!(health_endpoint("/api"), "/api/health");
    assert_eq!(verify_endpoint("/api"), "/api/devices/verify");
    assert_eq!(lookup_endpoint("/api"), "/api/devices/lookup");
    assert_eq!(register_endpoint("/api"), "/api/devices");
    assert_eq!(seen_endpoint("/api"), "/api/devices/seen");
    assert_eq!(login_endpoint("/api"), "/api/users/login");
}

#[test]
fn preferences_endpoint_embeds_identity() {
    assert_eq!(
        preferences_endpoint("/api", "alice"),
        "/api/preferences/user/alice"
    );
    assert_eq!(
        preferences_endpoint("http://localhost:8000/api", "dev_123"),
        "http://localhost:8000/api/preferences/user/dev_123"
    );
}

// =============================================================
// Envelope unwrapping
// =============================================================

#[test]
fn unwrap_envelope_returns_payload_on_success() {
    let env = ApiEnvelope {
        success: true,
        data: Some(7_u32),
        message: None,
    };
    assert_eq!(unwrap_envelope(env).unwrap(), 7);
}

#[test]
fn unwrap_envelope_rejects_failure_with_message() {
    let env: ApiEnvelope<u32> = ApiEnvelope {
        success: false,
        data: None,
        message: Some("bad key".to_owned()),
    };
    assert_eq!(
        unwrap_envelope(env),
        Err(StoreError::Rejected("bad key".to_owned()))
    );
}

#[test]
fn unwrap_envelope_flags_missing_data() {
    let env: ApiEnvelope<u32> = ApiEnvelope {
        success: true,
        data: None,
        message: None,
    };
    assert!(matches!(unwrap_envelope(env), Err(StoreError::Decode(_))));
}

// =============================================================
// Non-browser stubs
// =============================================================

#[test]
fn store_config_defaults() {
    let config = StoreConfig::default();
    assert_eq!(config.base_url, "/api");
    assert_eq!(config.timeout_ms, 4_000);
}

#[test]
fn stubs_report_unreachable_outside_the_browser() {
    let store = HttpStore::new(StoreConfig::default());
    assert!(!block_on(store.health()));
    assert_eq!(block_on(store.verify_device("d")), Err(StoreError::Unavailable));
    assert_eq!(
        block_on(store.find_device_by_fingerprint("hash")),
        Err(StoreError::Unavailable)
    );
    assert_eq!(block_on(store.touch_device("d")), Err(StoreError::Unavailable));
    assert_eq!(
        block_on(store.fetch_preferences("alice")),
        Err(StoreError::Unavailable)
    );
}
