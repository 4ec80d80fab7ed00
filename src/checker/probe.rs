// src/checker/probe.rs
// =============================================================================
// Checks a single link with one HEAD request.
//
// HTTP status codes:
// - 200-399: reachable (redirects we did not follow still prove the link
//   points somewhere)
// - 400-599: broken, reported with the status code and its reason phrase
//
// Anything that prevents getting a status at all (bad URL, DNS failure,
// refused connection, timeout, redirect loop) is reported with status 0.
//
// Each probe runs under its own timeout, so one slow server never holds up
// the others longer than `timeout`.
//
// Rust concepts:
// - &dyn Transport: the probe does not care which sender it gets
// - tokio::time::timeout: wraps a future, Err(Elapsed) if it takes too long
// - From/Into: `e.into()` turns a TransportError into a ProbeError
// =============================================================================

use crate::checker::transport::{ProbeRequest, Transport};
use crate::error::{ProbeError, TransportError};
use crate::models::LinkError;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use std::time::Duration;
use url::Url;

// Sent with every probe so site owners can tell who is knocking
pub const PROBE_USER_AGENT: &str = concat!("link-sentry/", env!("CARGO_PKG_VERSION"));

// Outcome of one probe, handed from a worker to the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub url: String,
    /// 0 when no HTTP response was received
    pub status_code: u16,
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn failed(url: &str, error: ProbeError) -> Self {
        Self {
            url: url.to_string(),
            status_code: error.status_code(),
            error: Some(error),
        }
    }

    // The failure record returned to callers, None for a reachable link
    pub fn into_link_error(self) -> Option<LinkError> {
        let error = self.error?;
        Some(LinkError {
            url: self.url,
            status_code: self.status_code,
            error: error.to_string(),
        })
    }
}

// Host component used as the circuit breaker key
//
// Keeps an explicit port ("example.com:8080") so different services on one
// host get separate breakers. Returns an empty string for unparseable URLs.
pub fn domain_of(link_url: &str) -> String {
    let Ok(url) = Url::parse(link_url) else {
        return String::new();
    };

    // port() is None for the scheme's default port, so
    // "http://a.com:80" and "http://a.com" share one key
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

// Probes one link through `transport`, giving up after `timeout`
pub async fn probe(transport: &dyn Transport, link_url: &str, timeout: Duration) -> ProbeResult {
    let url = match Url::parse(link_url) {
        Ok(url) => url,
        Err(e) => return ProbeResult::failed(link_url, ProbeError::InvalidUrl(e.to_string())),
    };

    // A zero timeout could never succeed, so don't even send the request
    if timeout.is_zero() {
        return ProbeResult::failed(link_url, TransportError::Timeout(timeout).into());
    }

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(PROBE_USER_AGENT));
    let request = ProbeRequest {
        method: Method::HEAD,
        url,
        headers,
    };

    // Outer Result: did we finish in time? Inner Result: did the send work?
    let response = match tokio::time::timeout(timeout, transport.send(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return ProbeResult::failed(link_url, e.into()),
        Err(_) => return ProbeResult::failed(link_url, TransportError::Timeout(timeout).into()),
    };

    // 1xx-3xx all count as reachable, only 4xx and 5xx are broken
    let status = response.status;
    if status.as_u16() >= 400 {
        return ProbeResult::failed(link_url, ProbeError::Status(status));
    }

    ProbeResult {
        url: link_url.to_string(),
        status_code: status.as_u16(),
        error: None,
    }
}
