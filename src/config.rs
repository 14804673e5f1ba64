// src/config.rs
// =============================================================================
// Crawl configuration and its validation.
//
// A CrawlConfig is built from the command line in main.rs, but the crawler
// only ever sees this struct, so tests construct it directly.
// =============================================================================

use thiserror::Error;
use url::Url;

use crate::cli::Cli;
use crate::extract::Link;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one start link is required")]
    NoStartLinks,

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("invalid start link '{link}': {reason}")]
    InvalidStartLink { link: Link, reason: String },
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Seed links, visited at depth 0
    pub start_links: Vec<Link>,
    /// Links more than this many hops from a seed are never visited
    pub max_depth: usize,
    /// Size of the worker pool
    pub max_workers: usize,
    /// Print each link to stdout when its extraction begins
    pub echo_visits: bool,
}

impl CrawlConfig {
    pub fn new(start_links: Vec<Link>, max_depth: usize, max_workers: usize) -> Self {
        Self {
            start_links,
            max_depth,
            max_workers,
            echo_visits: false,
        }
    }

    pub fn echo_visits(mut self, echo: bool) -> Self {
        self.echo_visits = echo;
        self
    }

    /// Checks the invariants the crawler relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_links.is_empty() {
            return Err(ConfigError::NoStartLinks);
        }
        if self.max_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}

impl TryFrom<&Cli> for CrawlConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        // Links typed by a user are checked up front; links found while
        // crawling are left to the extractor
        let start = Url::parse(&cli.start).map_err(|e| ConfigError::InvalidStartLink {
            link: cli.start.clone(),
            reason: e.to_string(),
        })?;

        // Store the serialized form: it is what the HTML extractor produces
        // for the same page, so a self-link is recognised as already seen
        let config = CrawlConfig::new(vec![start.to_string()], cli.depth, cli.workers)
            .echo_visits(!cli.json);
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_from_cli() {
        let cli = Cli::parse_from(["link-crawler"]);
        let config = CrawlConfig::try_from(&cli).unwrap();

        assert_eq!(config.start_links, vec!["https://google.com/"]);
        assert_eq!(config.max_workers, 10);
        assert_eq!(config.max_depth, 1);
        assert!(config.echo_visits);
    }

    #[test]
    fn test_start_link_matches_resolved_self_link() {
        let cli = Cli::parse_from(["link-crawler", "--start", "https://Example.com"]);
        let config = CrawlConfig::try_from(&cli).unwrap();

        // What extract_html_links yields for <a href="/"> on that page
        let base = Url::parse("https://example.com/").unwrap();
        let self_link = crate::extract::extract_html_links(r#"<a href="/">home</a>"#, &base);

        assert_eq!(config.start_links, self_link);
    }

    #[test]
    fn test_json_disables_echo() {
        let cli = Cli::parse_from(["link-crawler", "--json"]);
        let config = CrawlConfig::try_from(&cli).unwrap();
        assert!(!config.echo_visits);
    }

    #[test]
    fn test_rejects_zero_workers() {
        let cli = Cli::parse_from(["link-crawler", "-n", "0"]);
        assert_eq!(CrawlConfig::try_from(&cli).unwrap_err(), ConfigError::NoWorkers);
    }

    #[test]
    fn test_rejects_relative_start_link() {
        let cli = Cli::parse_from(["link-crawler", "--start", "/docs"]);
        assert!(matches!(
            CrawlConfig::try_from(&cli),
            Err(ConfigError::InvalidStartLink { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_seed() {
        let config = CrawlConfig::new(Vec::new(), 1, 4);
        assert_eq!(config.validate(), Err(ConfigError::NoStartLinks));
    }
}
