// src/checker/testing.rs
// =============================================================================
// Test helpers for the checker: fake transports and a tiny local HTTP server.
//
// FakeTransport answers from a routing closure and remembers every request,
// so tests can count how many probes actually reached a given host.
//
// GaugeTransport holds every request for a moment and records the highest
// number of requests it ever had in flight at once.
//
// serve() starts a bare-bones HTTP/1.1 responder on 127.0.0.1 for the few
// tests that go through the real reqwest client.
// =============================================================================

use crate::checker::transport::{ProbeRequest, ProbeResponse, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Status(u16),
    Error(&'static str),
    /// Sleeps, then answers 200
    Delay(Duration),
}

type Route = Box<dyn Fn(&Url) -> Reply + Send + Sync>;

pub(crate) struct FakeTransport {
    route: Route,
    requests: Mutex<Vec<ProbeRequest>>,
}

impl FakeTransport {
    // Same reply for every request
    pub(crate) fn new(reply: Reply) -> Self {
        Self::routed(move |_| reply.clone())
    }

    // Reply chosen per request URL
    pub(crate) fn routed(route: impl Fn(&Url) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            route: Box::new(route),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ProbeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn calls_to(&self, host: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.host_str() == Some(host))
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ProbeRequest) -> Result<ProbeResponse, TransportError> {
        let reply = (self.route)(&request.url);
        self.requests.lock().unwrap().push(request);

        match reply {
            Reply::Status(code) => Ok(ProbeResponse::new(StatusCode::from_u16(code).unwrap())),
            Reply::Error(msg) => Err(TransportError::Other(msg.to_string())),
            Reply::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(ProbeResponse::new(StatusCode::OK))
            }
        }
    }
}

// Answers 200 after `hold`, tracking concurrent requests
pub(crate) struct GaugeTransport {
    hold: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl GaugeTransport {
    pub(crate) fn new(hold: Duration) -> Self {
        Self {
            hold,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    // Highest number of send() calls that were running at the same time
    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for GaugeTransport {
    async fn send(&self, _request: ProbeRequest) -> Result<ProbeResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.hold).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(ProbeResponse::new(StatusCode::OK))
    }
}

// Response handed out by the local test server
pub(crate) struct Canned {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl Canned {
    pub(crate) fn status(status: StatusCode) -> Self {
        Self {
            status,
            location: None,
            body: String::new(),
        }
    }

    pub(crate) fn redirect(status: StatusCode, location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::status(status)
        }
    }

    pub(crate) fn html(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::status(StatusCode::OK)
        }
    }
}

// Starts a local HTTP server and returns its base URL ("http://127.0.0.1:port/")
//
// `handler` maps a request path to a canned response. Every connection gets
// exactly one response and is then closed. HEAD requests get no body.
pub(crate) async fn serve<F>(handler: F) -> String
where
    F: Fn(&str) -> Canned + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = std::sync::Arc::new(handler);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let handler = handler.clone();

            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&buf);
                let mut words = head.split_whitespace();
                let is_head = words.next() == Some("HEAD");
                let path = words.next().unwrap_or("/").to_string();
                let canned = handler(&path);

                let mut response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                    canned.status.as_u16(),
                    canned.status.canonical_reason().unwrap_or("Unknown"),
                    canned.body.len()
                );
                if let Some(location) = canned.location {
                    response.push_str(&format!("Location: {location}\r\n"));
                }
                response.push_str("\r\n");
                if !is_head {
                    response.push_str(&canned.body);
                }

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}/")
}
