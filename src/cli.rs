// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every tuning option can also come from an environment variable (the `env`
// attribute), so the same binary can be configured from a shell or from a
// container environment. Flags win over variables, variables over defaults.
// =============================================================================

use clap::{Args, Parser, Subcommand, ValueEnum};
use link_sentry::page::PageOptions;
use link_sentry::{BreakerConfig, CheckConfig};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "link-sentry",
    version,
    about = "Checks links concurrently and reports the ones that are unreachable",
    long_about = "link-sentry probes every link with a HEAD request on a fixed worker pool. \
                  Domains that keep failing are cut off by a per-domain circuit breaker \
                  instead of being probed over and over."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a list of URLs directly
    ///
    /// Example: link-sentry check https://example.com https://rust-lang.org
    Check {
        /// URLs to check (absolute http/https)
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        options: CheckOptions,
    },

    /// Fetch a page and check every link on it
    ///
    /// Example: link-sentry page https://example.com --workers 20
    Page {
        /// Page URL to analyze
        url: String,

        /// Timeout for downloading the page itself, in milliseconds
        #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
        request_timeout_ms: u64,

        /// Maximum page size to read, in bytes
        #[arg(long, env = "MAX_RESPONSE_SIZE", default_value_t = 10 * 1024 * 1024)]
        max_response_size: usize,

        #[command(flatten)]
        options: CheckOptions,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

// Options shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct CheckOptions {
    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Per-link timeout in milliseconds (0 makes every probe fail)
    #[arg(long, env = "LINK_CHECK_TIMEOUT_MS", default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// Number of concurrent workers (0 = default of 10)
    #[arg(long, env = "MAX_WORKERS", default_value_t = 10)]
    pub workers: usize,

    /// Redirect limit: a link needing this many hops or more counts as broken
    #[arg(long, env = "MAX_REDIRECTS", default_value_t = 10)]
    pub max_redirects: usize,

    /// Failures that trip a domain's circuit breaker
    #[arg(long, env = "MAX_FAILURES", default_value_t = 5)]
    pub max_failures: u32,

    /// Successes needed to close a tripped breaker
    #[arg(long, env = "BREAKER_SUCCESS_THRESHOLD", default_value_t = 3)]
    pub success_threshold: u32,

    /// How long a tripped domain is blocked, in milliseconds
    #[arg(long, env = "BREAKER_RETRY_DELAY_MS", default_value_t = 2_000)]
    pub retry_delay_ms: u64,
}

impl CheckOptions {
    pub fn check_config(&self) -> CheckConfig {
        let breaker = BreakerConfig::default()
            .with_max_failures(self.max_failures)
            .with_success_threshold(self.success_threshold)
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms));

        CheckConfig::default()
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_max_workers(self.workers)
            .with_max_redirects(self.max_redirects)
            .with_breaker(breaker)
    }
}

pub fn page_options(request_timeout_ms: u64, max_response_size: usize) -> PageOptions {
    PageOptions {
        request_timeout: Duration::from_millis(request_timeout_ms),
        max_response_size,
    }
}
