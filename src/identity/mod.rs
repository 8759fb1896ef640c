//! Device identity: local cache, fingerprint, and the resolution algorithm.
//!
//! DESIGN
//! ======
//! Identity is resolved once per session and then memoized. The cache holds
//! only the identifier; the fingerprint recognizes returning devices whose
//! cache was cleared; the resolver orchestrates both against the remote
//! store and degrades to a synthesized identifier when everything fails.

pub mod cache;
pub mod fingerprint;
pub mod resolver;
