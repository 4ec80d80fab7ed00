// src/error.rs
// =============================================================================
// Error types for the checker library.
//
// Nothing here ever escapes `check_links`: every error is turned into the
// human-readable text of a LinkError. The Display strings are therefore what
// end users see in the "inaccessible links" list.
//
// The CLI and page fetching use anyhow instead, since they only need to
// report errors, not match on them.
// =============================================================================

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

// A request could not be completed at the transport level
//
// Transports (the real reqwest one or a test fake) return these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },

    #[error("connection failed: {0}")]
    Connect(String),

    /// Anything else, carrying the transport's own message verbatim
    #[error("{0}")]
    Other(String),
}

// Why a single probe failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered, but with a 4xx/5xx status
    #[error("HTTP {}: {}", .0.as_u16(), .0.canonical_reason().unwrap_or("Unknown Status"))]
    Status(StatusCode),

    /// The worker could not build its HTTP client
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

impl ProbeError {
    // Status code to report, 0 when there was no HTTP response
    pub fn status_code(&self) -> u16 {
        match self {
            ProbeError::Status(status) => status.as_u16(),
            _ => 0,
        }
    }
}
