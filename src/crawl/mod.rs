// src/crawl/mod.rs
// =============================================================================
// This module is the crawler core.
//
// Features:
// - Breadth-first crawling from one or more start links
// - A fixed-size pool of concurrent workers
// - Each link visited at most once per run
// - Configurable depth limit, with a clean shutdown of the pool afterwards
//
// The core never fetches anything itself: it hands links to an Extractor
// and only reasons about which links come back.
// =============================================================================

mod barrier;
mod coordinator;
mod pool;
mod report;

pub use coordinator::Crawler;
pub use report::CrawlReport;
