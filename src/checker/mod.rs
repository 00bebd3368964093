// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - probe: One attempt at one tier (direct, proxy, API)
// - fallback: Per-link sequencing of the direct and proxy tiers
// - dispatch: Bounded worker pool over all links
// - drain: Sequential, paced API calls for whatever the pool couldn't reach
// - error: Why a single attempt failed
//
// This file (mod.rs) ties the pieces together: dispatch, then drain, then
// merge the two by record id.
//
// Rust concepts:
// - Modules: Organizing code into separate files
// - #[serde(flatten)]: a record's fields and its latency share one JSON object
// =============================================================================

mod dispatch;
mod drain;
mod error;
mod fallback;
mod probe;

pub use probe::Prober;

use dispatch::{dispatch, DispatchEntry, Dispatched};
use drain::drain;

use crate::links::{Latency, LinkRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A link with its final latency, as written to the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedLink {
    #[serde(flatten)]
    pub record: LinkRecord,
    pub latency: Latency,
}

impl CheckedLink {
    pub fn is_ok(&self) -> bool {
        self.latency.is_reachable()
    }
}

/// Checks every record and returns one result per record.
///
/// Results follow the order in which the worker pool finished them, not the
/// input order.
pub async fn check_all(prober: &Prober, records: Vec<LinkRecord>) -> Vec<CheckedLink> {
    let Dispatched { entries, api_queue } = dispatch(prober, records).await;

    // The pool has fully finished here, so the queue is complete
    let api_results = drain(prober, api_queue).await;

    merge(entries, api_results)
}

// Fills in the entries the pool left pending with what the API drain found
fn merge(entries: Vec<DispatchEntry>, api_results: HashMap<usize, Latency>) -> Vec<CheckedLink> {
    entries
        .into_iter()
        .map(|entry| {
            let latency = entry.latency.unwrap_or_else(|| {
                api_results
                    .get(&entry.record.id)
                    .copied()
                    .unwrap_or(Latency::Unreachable)
            });
            CheckedLink {
                record: entry.record,
                latency,
            }
        })
        .collect()
}
