// src/checker/breaker.rs
// =============================================================================
// Per-domain circuit breaker.
//
// When a domain keeps failing there is no point hammering it with every link
// that points there. The registry counts failures per domain and, once a
// domain has failed `max_failures` times, blocks it for `retry_delay`. After
// that a trial probe is let through (half-open); enough successes close the
// breaker again, another failure re-arms the delay.
//
// The state is never stored. It is derived from the counters every time by
// `breaker_state`, which is a pure function and easy to test on its own:
//
//   Closed    failures < max_failures
//   Open      tripped, last attempt less than retry_delay ago
//   HalfOpen  tripped, no last attempt or retry_delay has passed
//
// One RwLock guards the whole map. Every call is a single short critical
// section (a map lookup and a few integer updates).
//
// Rust concepts:
// - RwLock<HashMap>: many readers (allow/state) or one writer (record_*)
// - Lock poisoning: a panicking holder poisons the lock; we take the data anyway
// - Option<Instant>: "never attempted" without a sentinel value
// =============================================================================

use crate::config::BreakerConfig;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

// Logical breaker state of one domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// All probes allowed
    Closed,
    /// Probes blocked until retry_delay has passed
    Open,
    /// Trial probes allowed to test recovery
    HalfOpen,
}

impl BreakerState {
    pub fn allows_probe(self) -> bool {
        !matches!(self, BreakerState::Open)
    }

    pub fn name(self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

// Counters kept for one domain
//
// Created on the first failure and never removed; a full recovery only
// zeroes the counters and forgets last_attempt.
#[derive(Debug, Clone, Default)]
struct DomainEntry {
    failure_count: u32,
    success_count: u32,
    last_attempt: Option<Instant>,
}

// Derives the breaker state from a domain's counters at instant `now`
pub fn breaker_state(
    failure_count: u32,
    last_attempt: Option<Instant>,
    now: Instant,
    config: &BreakerConfig,
) -> BreakerState {
    if failure_count < max_failures(config) {
        return BreakerState::Closed;
    }

    // Tripped: blocked until retry_delay has passed since the last attempt.
    // saturating_duration_since guards against `now` being earlier than `at`.
    match last_attempt {
        Some(at) if now.saturating_duration_since(at) < config.retry_delay => BreakerState::Open,
        _ => BreakerState::HalfOpen,
    }
}

// A zero threshold would trip every domain before its first probe
fn max_failures(config: &BreakerConfig) -> u32 {
    config.max_failures.max(1)
}

// Failure/success accounting for every domain seen in one batch
#[derive(Debug)]
pub struct BreakerRegistry {
    config: BreakerConfig,
    entries: RwLock<HashMap<String, DomainEntry>>,
}

impl BreakerRegistry {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns true if a probe to `domain` may go out right now.
    pub fn allow(&self, domain: &str) -> bool {
        self.allow_at(domain, Instant::now())
    }

    /// Records a failed probe: the delay is (re)armed from now.
    pub fn record_failure(&self, domain: &str) {
        self.record_failure_at(domain, Instant::now());
    }

    /// Records a successful probe. Ignored while the breaker is closed.
    pub fn record_success(&self, domain: &str) {
        // A writer lock even for the early returns: the check and the update
        // must see the same counters
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // No entry means the domain never failed, nothing to recover from
        let Some(entry) = entries.get_mut(domain) else {
            return;
        };
        // Successes only count towards recovery of a tripped breaker
        if entry.failure_count < max_failures(&self.config) {
            return;
        }

        entry.success_count += 1;
        if entry.success_count >= self.config.success_threshold {
            // Full reset: the domain is treated as if it had never failed
            entry.failure_count = 0;
            entry.success_count = 0;
            entry.last_attempt = None;
            tracing::info!(
                domain,
                state = BreakerState::Closed.name(),
                "circuit breaker closed, domain recovered"
            );
        }
    }

    /// Snapshot of the derived state of `domain`.
    pub fn state(&self, domain: &str) -> BreakerState {
        self.state_at(domain, Instant::now())
    }

    pub(crate) fn allow_at(&self, domain: &str, now: Instant) -> bool {
        self.state_at(domain, now).allows_probe()
    }

    pub(crate) fn state_at(&self, domain: &str, now: Instant) -> BreakerState {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Unknown domains have never failed
        match entries.get(domain) {
            Some(entry) => breaker_state(entry.failure_count, entry.last_attempt, now, &self.config),
            None => BreakerState::Closed,
        }
    }

    pub(crate) fn record_failure_at(&self, domain: &str, now: Instant) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Entries are created lazily, on the first failure
        let entry = entries.entry(domain.to_string()).or_default();
        entry.failure_count += 1;
        // Any failure breaks a recovery streak and restarts the delay
        entry.success_count = 0;
        entry.last_attempt = Some(now);

        // Log the trip once, not on every failure after it
        if entry.failure_count == max_failures(&self.config) {
            tracing::info!(
                domain,
                state = BreakerState::Open.name(),
                failures = entry.failure_count,
                retry_delay = ?self.config.retry_delay,
                "circuit breaker tripped"
            );
        }
    }

    #[cfg(test)]
    fn counts(&self, domain: &str) -> Option<(u32, u32, Option<Instant>)> {
        let entries = self.entries.read().unwrap();
        entries
            .get(domain)
            .map(|e| (e.failure_count, e.success_count, e.last_attempt))
    }
}
