// src/crawl/report.rs
// =============================================================================
// The record of a finished crawl: every visited link, the depth it was
// visited at, and what came of it.
//
// The report is serializable so `--json` can print it as-is.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::pool::WorkResult;
use crate::extract::Link;

/// What happened when a link was visited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VisitOutcome {
    /// The page was read and returned this many outbound links
    Extracted { found: usize },
    /// The page could not be fetched or read
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub link: Link,
    pub depth: usize,
    #[serde(flatten)]
    pub outcome: VisitOutcome,
}

impl Visit {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, VisitOutcome::Extracted { .. })
    }
}

/// Visits in the order their results reached the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub visits: Vec<Visit>,
}

impl CrawlReport {
    /// Records a worker's result and hands back the links it found.
    /// A failed extraction counts as a page with no links.
    pub(crate) fn record(&mut self, result: WorkResult) -> Vec<Link> {
        let WorkResult {
            depth,
            link,
            outcome,
        } = result;

        let (outcome, found) = match outcome {
            Ok(links) => (VisitOutcome::Extracted { found: links.len() }, links),
            Err(e) => (VisitOutcome::Failed { error: e.to_string() }, Vec::new()),
        };

        self.visits.push(Visit {
            link,
            depth,
            outcome,
        });
        found
    }

    pub fn failed_count(&self) -> usize {
        self.visits.iter().filter(|v| !v.is_ok()).count()
    }
}
