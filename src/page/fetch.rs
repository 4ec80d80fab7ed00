// src/page/fetch.rs
// =============================================================================
// Downloads the page whose links we are going to check.
//
// - GET with the same User-Agent the probes use
// - only HTTP 200 is accepted
// - the body is read chunk by chunk and cut off at `max_bytes`, so a huge
//   (or endless) response cannot eat all our memory
// =============================================================================

use crate::checker::PROBE_USER_AGENT;
use anyhow::{bail, Context, Result};
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

// Fetches `url` and returns its (possibly truncated) body as text
pub async fn fetch_page(url: &Url, timeout: Duration, max_bytes: usize) -> Result<String> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")?;

    let mut response = client
        .get(url.clone())
        .header(USER_AGENT, PROBE_USER_AGENT)
        .send()
        .await
        .with_context(|| format!("failed to fetch {url}"))?;

    let status = response.status();
    if status != StatusCode::OK {
        bail!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        );
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("failed to read body of {url}"))?
    {
        let room = max_bytes.saturating_sub(body.len());
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            tracing::warn!(%url, max_bytes, "page body truncated");
            break;
        }
        body.extend_from_slice(&chunk);
    }

    // A cut in the middle of a UTF-8 sequence only loses that character
    Ok(String::from_utf8_lossy(&body).into_owned())
}
