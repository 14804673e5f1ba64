// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is a plain struct and clap
// generates the parsing, --help and --version from the attributes.
// =============================================================================

use clap::Parser;

// The whole command line of the crawler
//
// Flags mirror the classic crawler demo: --start, -n and -d, plus a
// request timeout and a JSON report mode.
#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "Crawl the web breadth-first from a start link with a fixed pool of workers",
    long_about = "link-crawler visits every page reachable from a start link within a maximum \
                  number of hops, visiting each page once and printing it as it is fetched."
)]
pub struct Cli {
    /// Link to start crawling from
    #[arg(long, default_value = "https://google.com")]
    pub start: String,

    /// Maximum number of concurrent workers
    #[arg(short = 'n', long, default_value_t = 10)]
    pub workers: usize,

    /// Maximum crawl depth
    ///
    /// Depth 0 = just the start link
    /// Depth 1 = the start link + every page it links to
    /// etc.
    #[arg(short = 'd', long, default_value_t = 1)]
    pub depth: usize,

    /// Seconds to wait for a single page before giving up on it
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Print the crawl report as JSON instead of echoing each visited link
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["link-crawler", "--start", "https://example.com", "-n", "3", "-d", "2"]);
        assert_eq!(cli.start, "https://example.com");
        assert_eq!(cli.workers, 3);
        assert_eq!(cli.depth, 2);
        assert_eq!(cli.timeout, 10);
        assert!(!cli.json);
    }

    #[test]
    fn test_rejects_negative_depth() {
        assert!(Cli::try_parse_from(["link-crawler", "-d", "-1"]).is_err());
    }
}
