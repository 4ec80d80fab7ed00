// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - breaker: per-domain circuit breaker registry
// - transport: how requests are sent (reqwest in production, fakes in tests)
// - probe: checks a single link
// - pool: worker pool, dispatcher and result aggregation
//
// This file (mod.rs) is the module root - it re-exports the public API so
// callers can write `checker::check_links()`.
// =============================================================================

mod breaker;
mod pool;
mod probe;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use breaker::{breaker_state, BreakerRegistry, BreakerState};
pub use pool::check_links;
pub use probe::{domain_of, probe, ProbeResult, PROBE_USER_AGENT};
pub use transport::{HttpTransport, ProbeRequest, ProbeResponse, Transport};
