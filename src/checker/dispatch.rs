// src/checker/dispatch.rs
// =============================================================================
// Runs the direct/proxy fallback for every link with a bounded worker pool.
//
// Key functionality:
// - Up to `concurrency` links are probed at once (buffer_unordered)
// - Each link runs in its own spawned task, so a panic stays contained
// - Links that need the API tier are sent down a channel for the drain
//
// When `dispatch` returns, every worker has finished and every sender has
// been dropped, so the receiver it hands back sees a complete queue.
//
// Rust concepts:
// - Streams: buffer_unordered keeps a fixed number of futures in flight
// - tokio::spawn and JoinHandle: a panicking task becomes an Err, not a crash
// - Channels: mpsc senders are cloned per task, the receiver is returned
// - Generic closures: Fn(LinkRecord) -> Fut lets tests swap the worker
// =============================================================================

use super::fallback::{run_tiers, Stage};
use super::probe::Prober;
use crate::links::{Latency, LinkRecord};
use futures::stream::{self, StreamExt};
use log::error;
use std::future::Future;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// A record as it left the worker pool
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchEntry {
    pub record: LinkRecord,
    /// `None` while the record waits for the API tier
    pub latency: Option<Latency>,
}

/// Everything the pool produced
#[derive(Debug)]
pub struct Dispatched {
    /// One entry per input record, in completion order
    pub entries: Vec<DispatchEntry>,
    /// Records that failed direct and proxy access; all senders are closed
    pub api_queue: UnboundedReceiver<LinkRecord>,
}

/// Probes every record through the direct and proxy tiers
pub async fn dispatch(prober: &Prober, records: Vec<LinkRecord>) -> Dispatched {
    let concurrency = prober.config().concurrency;
    let prober = prober.clone();

    dispatch_with(records, concurrency, move |record| {
        let prober = prober.clone();
        async move { run_tiers(&prober, &record).await }
    })
    .await
}

// The pool itself, independent of how a single record is handled
pub(crate) async fn dispatch_with<F, Fut>(
    records: Vec<LinkRecord>,
    concurrency: usize,
    worker: F,
) -> Dispatched
where
    F: Fn(LinkRecord) -> Fut,
    Fut: Future<Output = Stage> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let tasks = records.into_iter().map(|record| {
        let tx = tx.clone();
        let handle = tokio::spawn(worker(record.clone()));
        async move {
            let stage = match handle.await {
                Ok(stage) => stage,
                Err(e) => {
                    // A crashed worker counts as a failed tier
                    error!("Worker for {} failed: {}", record.link, e);
                    Stage::EnqueuedApi
                }
            };

            let latency = match stage {
                Stage::Resolved(latency) => Some(latency),
                _ => {
                    if tx.send(record.clone()).is_err() {
                        error!("API queue closed before {} could be queued", record.link);
                    }
                    None
                }
            };

            DispatchEntry { record, latency }
        }
    });

    let entries: Vec<DispatchEntry> = stream::iter(tasks)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    // Last sender gone: the drain can't observe a half-filled queue
    drop(tx);

    Dispatched {
        entries,
        api_queue: rx,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why spawn a task AND use buffer_unordered?
//    - buffer_unordered limits how many links are in flight at once
//    - tokio::spawn runs each link as its own task on the runtime
//    - If a spawned task panics, handle.await returns Err(JoinError)
//    - Without spawn, one panic would take down the whole stream
//
// 2. What is an unbounded channel?
//    - A queue between async tasks: tx.send() on one side, rx.recv() on the other
//    - "Unbounded" means send() never waits; fine here since at most one
//      message per link is ever sent
//    - Every clone of tx is a sender; the channel closes when all are dropped
//
// 3. Why drop(tx) explicitly?
//    - Each task got a clone of tx and dropped it when it finished
//    - The original tx is still alive in this function
//    - Dropping it means rx.recv() returns None once the queue is empty,
//      which is how the drain knows it's done
//
// 4. What does `where F: Fn(LinkRecord) -> Fut` mean?
//    - dispatch_with accepts any function that turns a record into a future
//    - Fut: Send + 'static is required because tokio::spawn may move the
//      future to another thread and it must not borrow local data
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn records(n: usize) -> Vec<LinkRecord> {
        (0..n)
            .map(|id| LinkRecord {
                id,
                name: format!("Friend {}", id),
                link: format!("https://friend{}.example/", id),
                avatar: "".into(),
            })
            .collect()
    }

    async fn drain_ids(mut rx: UnboundedReceiver<LinkRecord>) -> Vec<usize> {
        let mut ids = Vec::new();
        while let Some(record) = rx.recv().await {
            ids.push(record.id);
        }
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_every_record_comes_back_once() {
        let dispatched = dispatch_with(records(25), 10, |record| async move {
            if record.id % 3 == 0 {
                Stage::EnqueuedApi
            } else {
                Stage::Resolved(Latency::Reachable(0.1))
            }
        })
        .await;

        let mut ids: Vec<usize> = dispatched.entries.iter().map(|e| e.record.id).collect();
        ids.sort();
        assert_eq!(ids, (0..25).collect::<Vec<_>>());

        let pending = dispatched
            .entries
            .iter()
            .filter(|e| e.latency.is_none())
            .count();
        let queued = drain_ids(dispatched.api_queue).await;
        assert_eq!(queued.len(), pending);
        assert!(queued.iter().all(|id| id % 3 == 0));
    }

    #[tokio::test]
    async fn test_pool_size_is_respected() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let worker = {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            move |_record: LinkRecord| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Stage::Resolved(Latency::Reachable(0.02))
                }
            }
        };

        let dispatched = dispatch_with(records(30), 4, worker).await;
        assert_eq!(dispatched.entries.len(), 30);
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_panicking_worker_is_queued_for_api() {
        let dispatched = dispatch_with(records(3), 2, |record| async move {
            if record.id == 1 {
                panic!("probe blew up");
            }
            Stage::Resolved(Latency::Reachable(0.3))
        })
        .await;

        assert_eq!(dispatched.entries.len(), 3);
        assert_eq!(drain_ids(dispatched.api_queue).await, vec![1]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let dispatched =
            dispatch_with(Vec::new(), 10, |_record| async { Stage::EnqueuedApi }).await;
        assert!(dispatched.entries.is_empty());
        assert!(drain_ids(dispatched.api_queue).await.is_empty());
    }
}
