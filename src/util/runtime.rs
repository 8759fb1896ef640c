//! Wall clock and randomness sources.
//!
//! Injected rather than called directly so resolution and write stamping are
//! reproducible under test. [`SystemRuntime`] is the production source on
//! both render targets.

#[cfg(test)]
#[path = "runtime_test.rs"]
mod runtime_test;

/// Milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Short opaque tokens for locally synthesized identifiers.
pub trait Entropy {
    fn token(&self) -> String;
}

/// Production clock and token source.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRuntime;

impl Clock for SystemRuntime {
    fn now_ms(&self) -> u64 {
        #[cfg(feature = "hydrate")]
        {
            js_sys::Date::now() as u64
        }
        #[cfg(not(feature = "hydrate"))]
        {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or(0)
        }
    }
}

impl Entropy for SystemRuntime {
    fn token(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}
