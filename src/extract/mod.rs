// src/extract/mod.rs
// =============================================================================
// This module defines the Extractor capability the crawler depends on.
//
// Submodules:
// - http: An Extractor that fetches pages over HTTP(S) with reqwest
// - html: Pulls outbound links out of an HTML document
//
// The crawler core only knows about the `Extractor` trait and the
// `ExtractionFailure` error. Anything that can turn a link into more links
// (a real HTTP client, an in-memory graph in tests) can drive a crawl.
// =============================================================================

mod html;
mod http;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use self::html::extract_html_links;
pub use self::http::HttpExtractor;

/// An opaque URL-like identifier. No normalization happens beyond what the
/// extractor returns.
pub type Link = String;

/// The one recoverable failure of the crawl: a page could not be fetched or
/// read. Workers log it and treat the page as a dead end.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("invalid link {link}: {source}")]
    InvalidLink {
        link: Link,
        #[source]
        source: url::ParseError,
    },

    #[error("getting {link}: {source}")]
    Request {
        link: Link,
        #[source]
        source: reqwest::Error,
    },

    #[error("getting {link}: {status}")]
    Status { link: Link, status: StatusCode },

    #[error("getting {link}: not an HTML page ({content_type})")]
    NotHtml { link: Link, content_type: String },

    #[error("getting {link}: page is larger than {limit} bytes")]
    TooLarge { link: Link, limit: u64 },

    // A bug in the extractor, caught at the worker so the crawl can go on
    #[error("extracting {link}: extractor panicked")]
    Panicked { link: Link },
}

/// Fetches a link and returns the outbound links it points to, in document
/// order.
///
/// Implementations may be slow and may fail; the crawler layers no retry,
/// caching or rate limiting on top of them.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, link: &str) -> Result<Vec<Link>, ExtractionFailure>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_message() {
        let failure = ExtractionFailure::Status {
            link: "https://example.com/gone".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(
            failure.to_string(),
            "getting https://example.com/gone: 404 Not Found"
        );
    }

    #[test]
    fn test_invalid_link_keeps_source() {
        let source = url::Url::parse("not a url").unwrap_err();
        let failure = ExtractionFailure::InvalidLink {
            link: "not a url".to_string(),
            source,
        };
        assert!(std::error::Error::source(&failure).is_some());
        assert!(failure.to_string().starts_with("invalid link not a url"));
    }
}
