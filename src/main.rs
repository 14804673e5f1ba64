// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout only carries crawl output)
// 3. Build the crawl configuration and the HTTP extractor
// 4. Run the crawl and print the report
// 5. Exit with proper code (0 = crawl completed, 2 = setup error)
//
// Pages that fail to load do not change the exit code: they are logged and
// show up as failed visits in the report.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod extract;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};

use cli::Cli;
use config::CrawlConfig;
use crawl::{CrawlReport, Crawler};
use extract::HttpExtractor;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // The handle flushes and stops the logger when dropped, so keep it
    // alive for the whole crawl
    let _logger = set_up_logging()?;

    let config = CrawlConfig::try_from(&cli)?;
    let extractor = HttpExtractor::new(Duration::from_secs(cli.timeout))
        .context("failed to build HTTP client")?;

    let crawler = Crawler::new(config, Arc::new(extractor))?;
    let report = crawler.run().await;

    print_report(&report, cli.json)?;

    Ok(0)
}

// Logs go to stderr. RUST_LOG overrides the default level, e.g.
// RUST_LOG=link_crawler=debug to watch every dispatch.
fn set_up_logging() -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str("link_crawler=info")
        .context("invalid log specification")?
        .start()
        .context("failed to start logger")?;

    Ok(handle)
}

// Prints the report either as JSON or as a short summary
fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_summary(report);
    }
    Ok(())
}

// Visited links were already printed by the workers as they went, so only
// the totals are left
fn print_summary(report: &CrawlReport) {
    let failed = report.failed_count();
    let total = report.visits.len();

    println!();
    println!("📊 Summary:");
    println!("   ✅ Visited: {}", total - failed);
    println!("   ❌ Failed: {}", failed);
    println!("   📋 Total: {}", total);
}
