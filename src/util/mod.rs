//! Platform abstractions injected into the identity and preference services.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything with an environment dependency (durable storage, wall clock,
//! randomness, device probes) lives behind a small trait here so the service
//! layer stays deterministic under test and portable across render targets.

pub mod probes;
pub mod runtime;
pub mod storage;
