// src/page/links.rs
// =============================================================================
// Extracts and classifies the links of an HTML page.
//
// We use the `scraper` crate to find every <a href> in the document and the
// `url` crate to resolve each href against the page URL.
//
// What comes out is ready for the checker:
// - absolute http/https URLs only
// - no duplicates (first occurrence wins, document order is kept)
// - each link tagged internal (same host as the page) or external
//
// Rust concepts:
// - let-else: skip an element early without nesting (`let Some(x) = .. else`)
// - Option and `?`: resolve_href bails out with None at the first bad step
// - HashSet::insert returns false for a value already seen
// =============================================================================

use crate::models::{Link, LinkType};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

// Extracts all checkable links from `html`
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='https://other.com'>x</a>"
//   page_url = "https://example.com"
//   result = [internal https://example.com/docs, external https://other.com/]
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Link> {
    let document = Html::parse_document(html);

    // Constant selector, known to be valid
    let selector = Selector::parse("a[href]").unwrap();

    // `seen` answers "already have it?", `links` keeps the order
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    // select() walks the document in source order
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_href(page_url, href) else {
            continue;
        };

        // Compare serialized URLs, so "/x" and "https://example.com/x" match
        let url = resolved.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }

        let kind = classify(&resolved, page_url);
        links.push(Link::new(url, kind));
    }

    links
}

// Resolves an href to an absolute http/https URL
//
// Returns None for fragments, script/mail/phone links, unparseable hrefs and
// anything that does not end up as http or https.
fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    // join() handles "/abs", "../up", "child" and full URLs alike
    let resolved = base.join(href).ok()?;

    // Whatever join produced, only web links can be probed
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

// Same host and port as the page means internal
//
// Only called on resolved http/https URLs, which always have a host.
// port() is None for the scheme's default port, so ":443" on an https page
// still compares equal.
fn classify(link: &Url, page: &Url) -> LinkType {
    if link.host_str() == page.host_str() && link.port() == page.port() {
        LinkType::Internal
    } else {
        LinkType::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    #[test]
    fn test_absolute_external_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_links(html, &page());
        assert_eq!(
            links,
            vec![Link::new("https://www.rust-lang.org/", LinkType::External)]
        );
    }

    #[test]
    fn test_relative_links_are_internal() {
        let html = r#"
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <a href="  child  ">Child</a>
        "#;
        let links = extract_links(html, &page());
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "https://example.com/docs",
                "https://example.com/about",
                "https://example.com/page/child",
            ]
        );
        assert!(links.iter().all(|l| l.kind == LinkType::Internal));
    }

    #[test]
    fn test_skips_non_http_links() {
        let html = r##"
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+123">Call</a>
            <a href="javascript:void(0)">JS</a>
            <a href="#top">Top</a>
            <a href="ftp://files.example.com/x">FTP</a>
            <a href="">Empty</a>
        "##;
        assert!(extract_links(html, &page()).is_empty());
    }

    #[test]
    fn test_deduplicates_in_document_order() {
        let html = r#"
            <a href="https://b.com/">B</a>
            <a href="/x">X</a>
            <a href="https://b.com/">B again</a>
            <a href="https://example.com/x">X again</a>
        "#;
        let links = extract_links(html, &page());
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://b.com/", "https://example.com/x"]);
    }

    #[test]
    fn test_default_port_is_still_internal() {
        let html = r#"<a href="https://example.com:443/x">X</a>"#;
        let links = extract_links(html, &page());
        assert_eq!(
            links,
            vec![Link::new("https://example.com/x", LinkType::Internal)]
        );
    }

    #[test]
    fn test_other_port_is_external() {
        let html = r#"<a href="https://example.com:8443/admin">Admin</a>"#;
        let links = extract_links(html, &page());
        assert_eq!(links[0].kind, LinkType::External);
    }
}
