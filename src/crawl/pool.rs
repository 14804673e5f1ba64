// src/crawl/pool.rs
// =============================================================================
// A fixed-size pool of worker tasks that run the Extractor.
//
// How it works:
// 1. The coordinator sends `Dispatch` messages on a bounded link channel
// 2. Each worker takes one link at a time, extracts it, and sends a
//    `WorkResult` back on a bounded result channel
// 3. Failures (and panics inside the extractor) are logged and still
//    reported, so the coordinator can count every dispatched link as done
// 4. Dropping the link sender closes the channel; every worker then exits
//    and `shutdown` joins them
//
// Both channels hold at most one message per worker. Sends wait for room
// instead of spawning a task per result.
//
// Rust concepts:
// - Arc<Mutex<Receiver>>: tokio's mpsc has one consumer, so the workers
//   share it behind an async mutex
// - catch_unwind: turns a panic inside a future into an Err we can handle
// =============================================================================

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt; // gives us .catch_unwind() on futures
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::extract::{ExtractionFailure, Extractor, Link};

/// Called with each link right before its extraction starts.
pub type VisitEcho = Arc<dyn Fn(&str) + Send + Sync>;

/// Echoes visited links to stdout, one per line.
pub fn stdout_echo() -> VisitEcho {
    Arc::new(|link: &str| println!("{}", link))
}

/// A link to visit, tagged with the depth it was discovered at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub depth: usize,
    pub link: Link,
}

/// What one worker produced for one link.
#[derive(Debug)]
pub struct WorkResult {
    pub depth: usize,
    pub link: Link,
    pub outcome: Result<Vec<Link>, ExtractionFailure>,
}

pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `size` workers and returns the pool together with the sending
    /// half of the link channel and the receiving half of the result channel.
    ///
    /// `size` must be at least 1.
    pub fn spawn(
        size: usize,
        extractor: Arc<dyn Extractor>,
        echo: Option<VisitEcho>,
    ) -> (Self, mpsc::Sender<Dispatch>, mpsc::Receiver<WorkResult>) {
        let (link_tx, link_rx) = mpsc::channel(size);
        let (result_tx, result_rx) = mpsc::channel(size);

        let link_rx = Arc::new(Mutex::new(link_rx));

        let workers = (0..size)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    link_rx.clone(),
                    result_tx.clone(),
                    extractor.clone(),
                    echo.clone(),
                ))
            })
            .collect();

        (Self { workers }, link_tx, result_rx)
    }

    /// Waits for every worker to exit.
    ///
    /// Workers only exit once the link channel is closed, so the link sender
    /// must be dropped before calling this.
    pub async fn shutdown(self) {
        for (id, joined) in join_all(self.workers).await.into_iter().enumerate() {
            if let Err(e) = joined {
                log::error!("worker {} did not exit cleanly: {}", id, e);
            }
        }
        log::debug!("worker pool shut down");
    }
}

async fn worker(
    id: usize,
    links: Arc<Mutex<mpsc::Receiver<Dispatch>>>,
    results: mpsc::Sender<WorkResult>,
    extractor: Arc<dyn Extractor>,
    echo: Option<VisitEcho>,
) {
    log::debug!("worker {} started", id);

    loop {
        // The lock is released as soon as a link (or the close) arrives
        let next = links.lock().await.recv().await;
        let Some(Dispatch { depth, link }) = next else {
            break;
        };

        // Echo before extracting, so a slow page still shows up right away
        if let Some(echo) = &echo {
            echo(&link);
        }

        // A panicking extractor must not take the worker down with it:
        // the coordinator is waiting for exactly one result per link
        let outcome = match AssertUnwindSafe(extractor.extract(&link))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ExtractionFailure::Panicked { link: link.clone() }),
        };

        if let Err(e) = &outcome {
            log::warn!("{}", e);
        }

        let result = WorkResult {
            depth,
            link,
            outcome,
        };
        if results.send(result).await.is_err() {
            log::debug!("worker {}: result channel closed", id);
            break;
        }
    }

    log::debug!("worker {} stopped", id);
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why bounded channels?
//    - An unbounded result channel lets fast workers pile up results faster
//      than the coordinator reads them
//    - With capacity = worker count, a worker simply waits on send when the
//      coordinator falls behind (backpressure)
//
// 2. Why AssertUnwindSafe?
//    - catch_unwind requires the future to be UnwindSafe
//    - The extractor is behind an Arc and we never look at its state again
//      after a panic, so asserting it is fine here
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixtures::GraphExtractor;
    use std::time::Duration;

    #[tokio::test]
    async fn test_every_dispatch_gets_one_result() {
        let graph = Arc::new(GraphExtractor::new().edge("a", &["b", "c"]).broken("x"));
        let (pool, link_tx, mut result_rx) = WorkerPool::spawn(2, graph.clone(), None);

        for link in ["a", "x", "z"] {
            link_tx
                .send(Dispatch {
                    depth: 3,
                    link: link.to_string(),
                })
                .await
                .unwrap();
        }
        drop(link_tx);

        let mut results = Vec::new();
        for _ in 0..3 {
            results.push(result_rx.recv().await.unwrap());
        }
        results.sort_by(|a, b| a.link.cmp(&b.link));

        assert!(results.iter().all(|r| r.depth == 3));
        assert_eq!(results[0].outcome.as_ref().unwrap(), &vec!["b", "c"]);
        assert!(results[1].outcome.as_ref().is_err());
        assert!(results[2].outcome.as_ref().unwrap().is_empty());

        pool.shutdown().await;
        assert!(result_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_result() {
        let graph = Arc::new(GraphExtractor::new().panics_on("boom").edge("ok", &["next"]));
        let (pool, link_tx, mut result_rx) = WorkerPool::spawn(1, graph.clone(), None);

        for link in ["boom", "ok"] {
            link_tx
                .send(Dispatch {
                    depth: 0,
                    link: link.to_string(),
                })
                .await
                .unwrap();
        }
        drop(link_tx);

        // The single worker survives the panic and handles the next link
        let first = result_rx.recv().await.unwrap();
        assert!(matches!(
            first.outcome,
            Err(ExtractionFailure::Panicked { ref link }) if link == "boom"
        ));
        let second = result_rx.recv().await.unwrap();
        assert_eq!(second.outcome.unwrap(), vec!["next"]);

        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_echo_runs_before_each_extraction() {
        let graph = Arc::new(GraphExtractor::new());
        let echoed = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = echoed.clone();
        let echo: VisitEcho = Arc::new(move |link: &str| {
            sink.lock().unwrap().push(link.to_string());
        });

        let (pool, link_tx, mut result_rx) = WorkerPool::spawn(1, graph.clone(), Some(echo));
        for link in ["p1", "p2", "p3"] {
            link_tx
                .send(Dispatch {
                    depth: 0,
                    link: link.to_string(),
                })
                .await
                .unwrap();
        }
        for _ in 0..3 {
            result_rx.recv().await.unwrap();
        }
        drop(link_tx);
        pool.shutdown().await;

        assert_eq!(*echoed.lock().unwrap(), vec!["p1", "p2", "p3"]);
        assert_eq!(graph.calls(), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_shutdown_with_idle_workers() {
        let graph = Arc::new(GraphExtractor::new());
        let (pool, link_tx, _result_rx) = WorkerPool::spawn(4, graph, None);
        drop(link_tx);

        tokio::time::timeout(Duration::from_secs(1), pool.shutdown())
            .await
            .expect("idle workers should exit once the link channel closes");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_workers_run_concurrently() {
        let graph = Arc::new(GraphExtractor::new().with_delay(Duration::from_millis(200)));
        let (pool, link_tx, mut result_rx) = WorkerPool::spawn(4, graph.clone(), None);

        let started = tokio::time::Instant::now();
        for i in 0..4 {
            link_tx
                .send(Dispatch {
                    depth: 0,
                    link: format!("page-{i}"),
                })
                .await
                .unwrap();
        }
        for _ in 0..4 {
            result_rx.recv().await.unwrap();
        }

        // Four 200ms extractions on four workers overlap
        assert!(started.elapsed() < Duration::from_millis(700));
        assert_eq!(graph.calls().len(), 4);

        drop(link_tx);
        pool.shutdown().await;
    }
}
