// src/extract/html.rs
// =============================================================================
// This module pulls outbound links out of an HTML page.
//
// We use the `scraper` crate to parse the document and select every <a>
// element with an href, and the `url` crate to resolve relative hrefs
// against the page's own URL.
//
// Only http:// and https:// links are kept, since those are the only ones
// the crawler can visit.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

use super::Link;

// Extracts all followable links from HTML content, in document order
//
// Parameters:
//   html: the HTML content to parse
//   base: the URL the page was served from (after redirects), used to
//         resolve relative links
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   base = "https://example.com/page"
//   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, base: &Url) -> Vec<Link> {
    let document = Html::parse_document(html);

    // The selector is a constant, so parsing it cannot fail at runtime
    let selector = Selector::parse("a[href]").expect("'a[href]' is a valid CSS selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
        .collect()
}

// Resolves a possibly-relative href to an absolute URL
//
// Returns None for in-page anchors, special protocols and hrefs that
// don't form a valid URL.
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    // Url::join handles both absolute and relative hrefs
    base.join(href).ok()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does "a[href]" select?
//    - Every <a> tag that has an href attribute, like querySelectorAll
//
// 2. Why filter_map?
//    - It maps and drops the None results in one step
//    - Here: elements without href, then hrefs that don't resolve
//
// 3. Why compare url.scheme() instead of the string prefix?
//    - After Url::join the scheme is lowercase and parsed, so "HTTPS://x"
//      and "https://x" are treated the same
// -----------------------------------------------------------------------------
