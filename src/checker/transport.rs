// src/checker/transport.rs
// =============================================================================
// The request-sending seam of the checker.
//
// A probe never talks to reqwest directly. It builds a ProbeRequest and hands
// it to a Transport, which answers with a status code or a TransportError.
//
// - HttpTransport is the production implementation (a reqwest Client)
// - Tests implement Transport themselves to simulate failing domains,
//   slow servers, etc. without opening sockets
//
// Rust concepts:
// - Traits as interfaces, used through Arc<dyn Transport>
// - async_trait: async methods on a trait object
// =============================================================================

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use std::error::Error as StdError;
use std::time::Duration;
use url::Url;

// One outgoing request
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

// What a transport reports back; the body is never read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: StatusCode,
}

impl ProbeResponse {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }
}

// Sends probe requests
//
// Implementations must be shareable across worker tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ProbeRequest) -> Result<ProbeResponse, TransportError>;
}

// Real network transport backed by a reqwest Client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
    max_redirects: usize,
}

impl HttpTransport {
    // Builds a client with the probe timeout and redirect limit baked in
    //
    // Policy::limited(n) gives up when it is asked to follow the n-th redirect,
    // so a chain of n hops already fails and n - 1 hops still succeed.
    // With n = 0 any redirect fails.
    pub fn new(timeout: Duration, max_redirects: usize) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(max_redirects))
            .build()?;

        Ok(Self {
            client,
            timeout,
            max_redirects,
        })
    }

    fn classify_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if error.is_redirect() {
            TransportError::TooManyRedirects {
                limit: self.max_redirects,
            }
        } else if error.is_connect() {
            TransportError::Connect(error_chain(&error))
        } else {
            TransportError::Other(error_chain(&error))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ProbeRequest) -> Result<ProbeResponse, TransportError> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        Ok(ProbeResponse::new(response.status()))
    }
}

// reqwest's top-level message ("error sending request for url ...") hides the
// interesting part (DNS failure, refused connection...), so walk the sources.
fn error_chain(error: &dyn StdError) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
