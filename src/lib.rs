// src/lib.rs
// =============================================================================
// link-sentry: concurrent link reachability checking with per-domain
// circuit breaking.
//
// The one operation most callers need:
//
//   let errors = link_sentry::check_links(&links, &CheckConfig::default()).await;
//
// It probes every link with a HEAD request on a fixed pool of workers and
// returns the links that failed. Domains that keep failing are cut off by a
// circuit breaker instead of being probed over and over.
//
// Modules:
// - checker: breaker, probe, transport and worker pool
// - page: fetching a page and extracting its links
// - config: CheckConfig / BreakerConfig
// - models: Link, LinkError, PageReport
// - error: typed errors behind LinkError's text
// =============================================================================

pub mod checker;
pub mod config;
pub mod error;
pub mod models;
pub mod page;

pub use checker::{check_links, BreakerRegistry, BreakerState, HttpTransport, Transport};
pub use config::{BreakerConfig, CheckConfig};
pub use error::{ProbeError, TransportError};
pub use models::{Link, LinkError, LinkType, PageReport};
