// src/extract/http.rs
// =============================================================================
// This module implements the Extractor over HTTP(S).
//
// How it works:
// 1. GET the link with a shared reqwest client (per-request timeout)
// 2. Anything other than 200 OK is an extraction failure
// 3. So is a response that says it isn't HTML, or a body past the size
//    limit (checked while streaming, so a huge download is cut short)
// 4. Parse the body as HTML and collect its links, resolved against the
//    URL the response actually came from (redirects included)
//
// The client is built once and cloned cheaply; reqwest pools connections
// behind it.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use url::Url;

use super::{extract_html_links, ExtractionFailure, Extractor, Link};

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

// 10 MiB is far beyond any real HTML page
pub const MAX_PAGE_BYTES: u64 = 10 * 1024 * 1024;

/// An Extractor that fetches pages with reqwest and parses them with scraper.
#[derive(Debug, Clone)]
pub struct HttpExtractor {
    client: Client,
    max_page_bytes: u64,
}

impl HttpExtractor {
    /// Builds an extractor whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Self::with_page_limit(timeout, MAX_PAGE_BYTES)
    }

    /// Like `new`, but pages over `max_page_bytes` are rejected.
    pub fn with_page_limit(timeout: Duration, max_page_bytes: u64) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            max_page_bytes,
        })
    }

    fn too_large(&self, link: &str) -> ExtractionFailure {
        ExtractionFailure::TooLarge {
            link: link.to_string(),
            limit: self.max_page_bytes,
        }
    }
}

// A missing Content-Type is given the benefit of the doubt
fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        Some(value) => value.to_ascii_lowercase().contains("html"),
        None => true,
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, link: &str) -> Result<Vec<Link>, ExtractionFailure> {
        let url = Url::parse(link).map_err(|source| ExtractionFailure::InvalidLink {
            link: link.to_string(),
            source,
        })?;

        let request_failed = |source| ExtractionFailure::Request {
            link: link.to_string(),
            source,
        };

        let mut response = self.client.get(url).send().await.map_err(request_failed)?;

        if response.status() != StatusCode::OK {
            return Err(ExtractionFailure::Status {
                link: link.to_string(),
                status: response.status(),
            });
        }

        // Skip images, archives and the like before downloading anything
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        if !is_html(content_type) {
            return Err(ExtractionFailure::NotHtml {
                link: link.to_string(),
                content_type: content_type.unwrap_or_default().to_string(),
            });
        }

        if response.content_length().is_some_and(|len| len > self.max_page_bytes) {
            return Err(self.too_large(link));
        }

        // Relative links resolve against where we ended up, not where we started
        let base = response.url().clone();

        // Content-Length can be missing or wrong, so count while reading
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(request_failed)? {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > self.max_page_bytes {
                return Err(self.too_large(link));
            }
        }
        let html = String::from_utf8_lossy(&body);

        Ok(extract_html_links(&html, &base))
    }
}
