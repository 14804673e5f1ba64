// src/crawl/coordinator.rs
// =============================================================================
// This module drives the breadth-first crawl.
//
// How it works:
// 1. The start links form depth 0; each one is marked seen
// 2. For every depth, the frontier links are handed to the worker pool
//    while results are collected in the same loop
// 3. Links found at depth d that were never seen before become the
//    frontier of depth d + 1
// 4. Once the results of the last depth are in (their links are dropped),
//    the link channel is closed and the workers are joined
//
// The coordinator owns the seen set outright. Workers never touch it; they
// only report what they found, so no lock is needed around it.
//
// Rust concepts:
// - tokio::select!: wait on "room to send" and "a result arrived" at once
// - HashSet::insert returns false for duplicates, which doubles as the
//   "already seen" check
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::barrier::DepthBarrier;
use super::pool::{stdout_echo, Dispatch, VisitEcho, WorkResult, WorkerPool};
use super::report::CrawlReport;
use crate::config::{ConfigError, CrawlConfig};
use crate::extract::{Extractor, Link};

pub struct Crawler {
    config: CrawlConfig,
    extractor: Arc<dyn Extractor>,
    echo: Option<VisitEcho>,
    seen: HashSet<Link>,
}

impl Crawler {
    pub fn new(config: CrawlConfig, extractor: Arc<dyn Extractor>) -> Result<Self, ConfigError> {
        config.validate()?;

        // Echoing goes to stdout unless a different sink is set
        let echo = config.echo_visits.then(stdout_echo);

        Ok(Self {
            config,
            extractor,
            echo,
            seen: HashSet::new(),
        })
    }

    /// Sends each visited link to `echo` instead of stdout.
    pub fn with_echo(mut self, echo: VisitEcho) -> Self {
        self.echo = Some(echo);
        self
    }

    /// Crawls up to `max_depth` hops from the start links and returns the
    /// visits. Extraction failures end up in the report, never here as
    /// errors.
    pub async fn run(mut self) -> CrawlReport {
        let (pool, link_tx, mut result_rx) = WorkerPool::spawn(
            self.config.max_workers,
            self.extractor.clone(),
            self.echo.clone(),
        );

        log::info!(
            "crawling {} start link(s) to depth {} with {} worker(s)",
            self.config.start_links.len(),
            self.config.max_depth,
            self.config.max_workers
        );

        let mut report = CrawlReport::default();

        // The seed is the depth-0 batch; duplicate seeds collapse here
        let mut frontier = self.mark_unseen(self.config.start_links.clone());

        for depth in 0..=self.config.max_depth {
            if frontier.is_empty() {
                log::info!("nothing new to visit at depth {}, stopping early", depth);
                break;
            }

            log::info!("depth {}: visiting {} link(s)", depth, frontier.len());
            frontier = self
                .crawl_depth(depth, frontier, &link_tx, &mut result_rx, &mut report)
                .await;
        }

        // Closing the link channel lets every idle worker exit
        drop(link_tx);
        pool.shutdown().await;

        log::info!(
            "crawl finished: {} visited, {} failed",
            report.visits.len(),
            report.failed_count()
        );
        report
    }

    /// Visits every link of one depth and returns the links first seen
    /// among their results. At the last depth nothing is returned.
    async fn crawl_depth(
        &mut self,
        depth: usize,
        frontier: Vec<Link>,
        link_tx: &mpsc::Sender<Dispatch>,
        result_rx: &mut mpsc::Receiver<WorkResult>,
        report: &mut CrawlReport,
    ) -> Vec<Link> {
        let keep_discoveries = depth < self.config.max_depth;
        let mut barrier = DepthBarrier::new(depth, frontier.len());
        let mut pending: VecDeque<Link> = frontier.into();
        let mut next = Vec::new();

        // Dispatching and receiving share one loop: with both channels
        // bounded, waiting on only one side could leave workers blocked
        // on a full result channel while we wait for room on the link one.
        while !pending.is_empty() || !barrier.is_complete() {
            tokio::select! {
                permit = link_tx.reserve(), if !pending.is_empty() => {
                    let Ok(permit) = permit else {
                        log::error!("worker pool stopped with {} link(s) undispatched", pending.len());
                        break;
                    };
                    // Room on the link channel: hand the next link to a worker
                    if let Some(link) = pending.pop_front() {
                        log::debug!("dispatching {} at depth {}", link, depth);
                        permit.send(Dispatch { depth, link });
                    }
                }
                received = result_rx.recv() => {
                    let Some(result) = received else {
                        log::error!("worker pool stopped with {} result(s) outstanding", barrier.outstanding());
                        break;
                    };

                    if result.depth != barrier.depth() {
                        log::warn!(
                            "ignoring result for {} from depth {} while at depth {}",
                            result.link,
                            result.depth,
                            barrier.depth()
                        );
                    } else {
                        // One result per dispatched link, failed or not
                        barrier.arrive();
                        let batch = report.record(result);
                        if keep_discoveries {
                            next.extend(self.mark_unseen(batch));
                        }
                    }
                }
            }
        }

        next
    }

    /// Marks each link as seen and keeps the ones that weren't already,
    /// in their original order.
    fn mark_unseen(&mut self, batch: Vec<Link>) -> Vec<Link> {
        batch
            .into_iter()
            .filter(|link| self.seen.insert(link.clone()))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why no "drain" depth?
//    - Every dispatched link produces exactly one result, so once the
//      barrier of the last depth completes, no worker is left holding one
//    - Closing the link channel then stops the workers for good
//
// 2. Why reserve() instead of send() in select!?
//    - If the other branch wins, a pending send() future is dropped along
//      with the link it was carrying
//    - reserve() only claims a slot; the link leaves `pending` once we
//      actually have the slot
//
// 3. Ordering
//    - Results arrive in whatever order workers finish, so the order of
//      the next frontier is not the discovery order across pages
// -----------------------------------------------------------------------------
