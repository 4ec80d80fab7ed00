// src/page/html.rs
// =============================================================================
// Describes an HTML page beyond its links.
//
// From the parsed document we read:
// - the HTML version, from the DOCTYPE (HTML5 when there is none)
// - the <title> text
// - how many headings of each level (h1-h6) the page has
// - whether a form asks for a password (a login form)
//
// Like links.rs this uses `scraper`, which parses with html5ever and lets us
// query the DOM with CSS selectors.
//
// Rust concepts:
// - BTreeMap: keeps the heading levels sorted in the JSON output
// - find_map: first item for which a closure returns Some
// - Selector::parse(...).unwrap() on constant selectors that cannot fail
// =============================================================================

use scraper::{Html, Selector};
use std::collections::BTreeMap;

// Reported when a page has no title or an empty one
pub const NO_TITLE: &str = "No title";

const HEADING_LEVELS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

// Everything we report about a page's markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDetails {
    pub html_version: String,
    pub title: String,
    pub headings: BTreeMap<String, usize>,
    pub has_login_form: bool,
}

// Parses `html` once and collects all page details
//
// Parsing never fails: html5ever repairs broken markup the way browsers do.
pub fn describe_page(html: &str) -> PageDetails {
    let document = Html::parse_document(html);

    PageDetails {
        html_version: detect_html_version(&document),
        title: extract_title(&document),
        headings: count_headings(&document),
        has_login_form: has_login_form(&document),
    }
}

// Names the HTML version declared by the DOCTYPE
//
// Example:
//   <!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN"
//     "http://www.w3.org/TR/html4/strict.dtd">    => "HTML 4.01 Strict"
//
// A missing or unrecognized DOCTYPE is reported as HTML5, which is what
// browsers assume for modern pages.
pub fn detect_html_version(document: &Html) -> String {
    // The DOCTYPE is a direct child of the document node, before <html>
    let doctype = document
        .tree
        .root()
        .children()
        .find_map(|node| node.value().as_doctype());

    let Some(doctype) = doctype else {
        return "HTML5".to_string();
    };

    // Strict/transitional can show up in either id, so look at both
    let ids = format!("{} {}", doctype.public_id(), doctype.system_id()).to_lowercase();

    let version = if ids.contains("xhtml 1.0") && ids.contains("strict") {
        "XHTML 1.0 Strict"
    } else if ids.contains("xhtml 1.0") && ids.contains("transitional") {
        "XHTML 1.0 Transitional"
    } else if ids.contains("html 4.01") && ids.contains("strict") {
        "HTML 4.01 Strict"
    } else if ids.contains("html 4.01") && ids.contains("transitional") {
        "HTML 4.01 Transitional"
    } else {
        "HTML5"
    };

    version.to_string()
}

// Returns the trimmed text of the first <title>, or NO_TITLE
pub fn extract_title(document: &Html) -> String {
    let selector = Selector::parse("title").unwrap();

    let title = document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .unwrap_or_default();

    let title = title.trim();
    if title.is_empty() {
        NO_TITLE.to_string()
    } else {
        title.to_string()
    }
}

// Counts headings per level; every level from h1 to h6 is always present
pub fn count_headings(document: &Html) -> BTreeMap<String, usize> {
    let mut headings: BTreeMap<String, usize> = HEADING_LEVELS
        .iter()
        .map(|level| (level.to_string(), 0))
        .collect();

    // One pass over the document instead of one query per level
    let selector = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    for element in document.select(&selector) {
        // html5ever lowercases tag names, so "H2" is counted as "h2"
        if let Some(count) = headings.get_mut(element.value().name()) {
            *count += 1;
        }
    }

    headings
}

// A login form is any <form> that contains a password input
pub fn has_login_form(document: &Html) -> bool {
    let selector = Selector::parse(r#"form input[type="password"]"#).unwrap();
    document.select(&selector).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_of(html: &str) -> String {
        detect_html_version(&Html::parse_document(html))
    }

    fn title_of(html: &str) -> String {
        extract_title(&Html::parse_document(html))
    }

    fn login_form_in(html: &str) -> bool {
        has_login_form(&Html::parse_document(html))
    }

    #[test]
    fn test_detect_html5() {
        assert_eq!(
            version_of("<!DOCTYPE html><html><head></head><body></body></html>"),
            "HTML5"
        );
    }

    #[test]
    fn test_detect_html401() {
        let strict = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd"><html></html>"#;
        assert_eq!(version_of(strict), "HTML 4.01 Strict");

        let transitional = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd"><html></html>"#;
        assert_eq!(version_of(transitional), "HTML 4.01 Transitional");
    }

    #[test]
    fn test_detect_xhtml10() {
        let strict = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"><html></html>"#;
        assert_eq!(version_of(strict), "XHTML 1.0 Strict");

        let transitional = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd"><html></html>"#;
        assert_eq!(version_of(transitional), "XHTML 1.0 Transitional");
    }

    #[test]
    fn test_missing_doctype_defaults_to_html5() {
        assert_eq!(version_of("<html><head></head><body></body></html>"), "HTML5");
    }

    #[test]
    fn test_body_text_does_not_change_version() {
        // Only the DOCTYPE counts, not words that happen to be on the page
        let html = "<!DOCTYPE html><html><body><p>HTML 4.01 strict mode</p></body></html>";
        assert_eq!(version_of(html), "HTML5");
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            title_of("<html><head><title>Test Page</title></head></html>"),
            "Test Page"
        );
        assert_eq!(
            title_of("<html><head><title>  Spaced Title  </title></head></html>"),
            "Spaced Title"
        );
    }

    #[test]
    fn test_missing_or_empty_title() {
        assert_eq!(title_of("<html><head></head></html>"), NO_TITLE);
        assert_eq!(title_of("<html><head><title></title></head></html>"), NO_TITLE);
        assert_eq!(title_of("<html><head><title>   </title></head></html>"), NO_TITLE);
    }

    #[test]
    fn test_count_headings() {
        let html = r#"
            <html><body>
                <h1>Title</h1>
                <h2>Section 1</h2>
                <H2>Section 2</H2>
                <h3>Subsection</h3>
            </body></html>
        "#;
        let headings = count_headings(&Html::parse_document(html));

        let expected: BTreeMap<String, usize> = [
            ("h1", 1),
            ("h2", 2),
            ("h3", 1),
            ("h4", 0),
            ("h5", 0),
            ("h6", 0),
        ]
        .into_iter()
        .map(|(level, count)| (level.to_string(), count))
        .collect();
        assert_eq!(headings, expected);
    }

    #[test]
    fn test_no_headings_still_lists_every_level() {
        let headings =
            count_headings(&Html::parse_document("<html><body><p>No headings here</p></body></html>"));
        assert_eq!(headings.len(), 6);
        assert!(headings.values().all(|&count| count == 0));
    }

    #[test]
    fn test_login_form_detection() {
        let login = r#"
            <form action="/login" method="post">
                <input type="text" name="username">
                <input type="password" name="password">
                <button type="submit">Login</button>
            </form>
        "#;
        assert!(login_form_in(login));

        let search = r#"
            <form action="/search" method="get">
                <input type="text" name="q">
                <button type="submit">Search</button>
            </form>
        "#;
        assert!(!login_form_in(search));

        assert!(!login_form_in("<html><body><p>No forms here</p></body></html>"));
    }

    #[test]
    fn test_login_form_among_several_forms() {
        let html = r#"
            <form action="/search"><input type="text" name="q"></form>
            <form action="/login"><input type="password" name="pass"></form>
        "#;
        assert!(login_form_in(html));
    }

    #[test]
    fn test_password_input_outside_form_is_not_a_login_form() {
        assert!(!login_form_in(r#"<input type="password" name="pin">"#));
    }

    #[test]
    fn test_describe_page() {
        let details = describe_page(
            r#"<!DOCTYPE html><html><head><title>Home</title></head>
               <body><h1>Welcome</h1><form><input type="password"></form></body></html>"#,
        );

        assert_eq!(details.html_version, "HTML5");
        assert_eq!(details.title, "Home");
        assert_eq!(details.headings["h1"], 1);
        assert!(details.has_login_form);
    }
}
