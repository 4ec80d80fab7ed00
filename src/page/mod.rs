// src/page/mod.rs
// =============================================================================
// Page analysis: fetch a page, describe its markup, pull out its links,
// check them.
//
// Submodules:
// - fetch: downloads the page with a size cap
// - html: HTML version, title, heading counts, login form detection
// - links: extracts, deduplicates and classifies <a href> links
//
// analyze_page() ties them to the checker and produces a PageReport.
// Screening the target URL for private addresses is up to the caller.
// =============================================================================

mod fetch;
mod html;
mod links;

pub use fetch::fetch_page;
pub use html::{describe_page, PageDetails};
pub use links::extract_links;

use crate::checker::check_links;
use crate::config::CheckConfig;
use crate::models::{LinkType, PageReport};
use anyhow::{anyhow, bail, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

// Limits for downloading the analyzed page itself
#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    pub request_timeout: Duration,
    pub max_response_size: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        }
    }
}

// Parses the target URL, accepting only absolute http/https URLs
pub fn parse_target(target: &str) -> Result<Url> {
    let url = Url::parse(target.trim()).map_err(|e| anyhow!("invalid URL '{}': {}", target, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("unsupported scheme '{}': only http and https are allowed", url.scheme());
    }
    if url.host_str().is_none() {
        bail!("URL has no host: {}", target);
    }
    Ok(url)
}

// Fetches `target`, extracts its links and checks them
pub async fn analyze_page(
    target: &str,
    options: &PageOptions,
    config: &CheckConfig,
) -> Result<PageReport> {
    let url = parse_target(target)?;
    let html = fetch_page(&url, options.request_timeout, options.max_response_size).await?;

    let details = describe_page(&html);
    let links = extract_links(&html, &url);
    let internal_links = links.iter().filter(|l| l.kind == LinkType::Internal).count();
    let external_links = links.iter().filter(|l| l.kind == LinkType::External).count();

    tracing::info!(
        %url,
        html_version = %details.html_version,
        internal_links,
        external_links,
        has_login_form = details.has_login_form,
        "analyzed page markup"
    );

    let inaccessible_links = check_links(&links, config).await;

    Ok(PageReport {
        url: url.to_string(),
        html_version: details.html_version,
        title: details.title,
        headings: details.headings,
        internal_links,
        external_links,
        inaccessible_links,
        has_login_form: details.has_login_form,
    })
}
