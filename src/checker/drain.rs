// src/checker/drain.rs
// =============================================================================
// Sequential, paced processing of the API queue.
//
// The lookup API is metered and rate limited, so unlike the direct and proxy
// tiers it is called one link at a time, with at least `api_pacing` between
// the start of one call and the start of the next.
//
// This only runs after the worker pool is done; by then the channel's senders
// are all dropped and `recv()` returning `None` really means "queue empty".
//
// Rust concepts:
// - tokio::time::Instant and sleep_until: waiting for a deadline, not a delay
// - HashMap: results keyed by record id
// =============================================================================

use super::probe::{Prober, Tier};
use crate::links::{Latency, LinkRecord};
use log::{info, warn};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};

/// Resolves every queued record through the API tier.
///
/// Returns the final latency of each record, keyed by record id.
pub async fn drain(
    prober: &Prober,
    mut queue: UnboundedReceiver<LinkRecord>,
) -> HashMap<usize, Latency> {
    let mut results = HashMap::new();

    // The key can't appear mid-run, so one check covers the whole queue
    if prober.config().api_key.is_none() {
        while let Some(record) = queue.recv().await {
            results.insert(record.id, Latency::Unreachable);
        }
        if !results.is_empty() {
            warn!(
                "No API key provided, {} link(s) marked unreachable without an API check",
                results.len()
            );
        }
        return results;
    }

    let pacing = prober.config().api_pacing;
    let mut next_call: Option<Instant> = None;

    while let Some(record) = queue.recv().await {
        if let Some(at) = next_call {
            sleep_until(at).await;
        }
        next_call = Some(Instant::now() + pacing);

        let latency = match prober.probe(&record.link, Tier::Api).await {
            Ok(secs) => {
                info!("Reached {} via API access in {}s", record.link, secs);
                Latency::Reachable(secs)
            }
            Err(e) => {
                warn!("API access failed for {}: {}", record.link, e);
                Latency::Unreachable
            }
        };
        results.insert(record.id, latency);
    }

    results
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why sleep_until instead of sleep?
//    - sleep(pacing) after each call would add the call's own duration on top
//    - sleep_until(deadline) waits only for whatever is left of the interval
//    - A slow API call therefore doesn't slow the queue down further
//
// 2. Why is this loop sequential?
//    - The API is rate limited; one call at a time keeps us under the limit
//    - The direct and proxy tiers already ran in parallel before this
// -----------------------------------------------------------------------------
