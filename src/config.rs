// src/config.rs
// =============================================================================
// Configuration for a link-checking batch.
//
// CheckConfig is what callers hand to `check_links`. BreakerConfig tunes the
// per-domain circuit breaker. Both have sensible defaults and small builder
// methods, so a caller only sets what it cares about:
//
//   let config = CheckConfig::default()
//       .with_timeout(Duration::from_secs(2))
//       .with_max_workers(4);
//
// The CLI fills these from flags / environment variables (see cli.rs).
// =============================================================================

use crate::checker::Transport;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_WORKERS: usize = 10;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

pub const DEFAULT_MAX_FAILURES: u32 = 5;
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

// Circuit breaker tuning, shared by every domain in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures that trip a domain's breaker
    pub max_failures: u32,
    /// Successes after tripping that fully reset the breaker
    pub success_threshold: u32,
    /// How long a tripped domain stays blocked before a trial probe
    pub retry_delay: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: DEFAULT_MAX_FAILURES,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl BreakerConfig {
    pub fn with_max_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures;
        self
    }

    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

// Settings for one `check_links` call
#[derive(Clone)]
pub struct CheckConfig {
    /// Upper bound for each probe, including any redirects
    pub timeout: Duration,
    /// Worker count; 0 means DEFAULT_MAX_WORKERS
    pub max_workers: usize,
    /// Redirect hops allowed before the probe fails
    pub max_redirects: usize,
    /// Replaces the real HTTP client (used by tests)
    pub transport: Option<Arc<dyn Transport>>,
    pub breaker: BreakerConfig,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_workers: DEFAULT_MAX_WORKERS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            transport: None,
            breaker: BreakerConfig::default(),
        }
    }
}

impl CheckConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_breaker(mut self, breaker: BreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }

    // Number of workers actually spawned
    pub fn worker_count(&self) -> usize {
        if self.max_workers == 0 {
            DEFAULT_MAX_WORKERS
        } else {
            self.max_workers
        }
    }
}

// Manual Debug: the transport is a trait object without a Debug bound
impl fmt::Debug for CheckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckConfig")
            .field("timeout", &self.timeout)
            .field("max_workers", &self.max_workers)
            .field("max_redirects", &self.max_redirects)
            .field("transport", &self.transport.as_ref().map(|_| "custom"))
            .field("breaker", &self.breaker)
            .finish()
    }
}
