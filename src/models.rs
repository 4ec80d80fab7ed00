// src/models.rs
// =============================================================================
// Plain data types shared by the checker, the page analyzer and the CLI.
//
// - Link: a URL found on a page plus its classification
// - LinkError: the reported failure for one link
// - PageReport: everything the `page` subcommand prints
//
// All of these derive Serialize so the CLI can emit them with --json.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

// Where a link points relative to the page it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Same host (and port) as the analyzed page
    Internal,
    /// Any other host
    External,
    /// Not an absolute http/https URL, so it cannot be placed
    Invalid,
}

// A link to check
//
// Links arrive already absolute, deduplicated and classified. The checker
// never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: LinkType,
}

impl Link {
    pub fn new(url: impl Into<String>, kind: LinkType) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// A link with no page context (e.g. passed on the CLI)
    ///
    /// Without a page there is nothing to be internal to, so a usable URL is
    /// external. Anything that is not absolute http/https is tagged invalid;
    /// the checker still reports it.
    pub fn standalone(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = match Url::parse(&url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
                LinkType::External
            }
            _ => LinkType::Invalid,
        };
        Self::new(url, kind)
    }
}

// A link that could not be accessed
//
// status_code is 0 when no HTTP response was received at all (DNS failure,
// refused connection, timeout, redirect loop...). It is left out of the JSON
// output in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkError {
    pub url: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub status_code: u16,
    pub error: String,
}

fn is_zero(code: &u16) -> bool {
    *code == 0
}

// Result of analyzing one page: what the markup says, link counts and the
// links that failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    pub url: String,
    /// "HTML5", "HTML 4.01 Strict", "XHTML 1.0 Transitional", ...
    pub html_version: String,
    /// "No title" when the page has none
    pub title: String,
    /// Count per level, "h1" to "h6", always all six keys
    pub headings: BTreeMap<String, usize>,
    pub internal_links: usize,
    pub external_links: usize,
    pub inaccessible_links: Vec<LinkError>,
    pub has_login_form: bool,
}
