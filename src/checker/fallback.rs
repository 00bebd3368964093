// src/checker/fallback.rs
// =============================================================================
// Per-link tier sequencing.
//
//   Direct --ok--> Resolved
//     | fail
//     v
//   Proxy  --ok--> Resolved
//     | fail / no proxy configured
//     v
//   EnqueuedApi   (handed to the API drain; this path ends here)
//
// Direct access is free, the proxy costs a relay hop and the API is metered,
// so each tier is only tried once the cheaper one has failed.
// =============================================================================

use super::probe::{Prober, Tier};
use crate::links::{Latency, LinkRecord};
use log::{debug, info, warn};
use url::Url;

/// Where a link is in its fallback sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    Direct,
    Proxy,
    EnqueuedApi,
    Resolved(Latency),
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::EnqueuedApi | Stage::Resolved(_))
    }
}

/// Drives one record through the direct and proxy tiers.
///
/// Returns either `Resolved` or `EnqueuedApi`; queueing itself is left to the
/// caller, which owns the channel.
pub async fn run_tiers(prober: &Prober, record: &LinkRecord) -> Stage {
    // A link that isn't an http(s) URL can't be reached by any tier
    if !is_probeable(&record.link) {
        warn!("Skipping {}: {:?} is not an http(s) URL", record.name, record.link);
        return Stage::Resolved(Latency::Unreachable);
    }

    let mut stage = Stage::Direct;
    while !stage.is_terminal() {
        stage = match stage {
            Stage::Direct => attempt(prober, record, Tier::Direct, Stage::Proxy).await,
            Stage::Proxy if prober.config().proxy_url.is_none() => {
                debug!("No proxy configured, skipping proxy tier for {}", record.link);
                Stage::EnqueuedApi
            }
            Stage::Proxy => attempt(prober, record, Tier::Proxy, Stage::EnqueuedApi).await,
            terminal => terminal,
        };
    }
    stage
}

// One tier attempt: resolve on success, otherwise move to `on_failure`
async fn attempt(prober: &Prober, record: &LinkRecord, tier: Tier, on_failure: Stage) -> Stage {
    match prober.probe(&record.link, tier).await {
        Ok(latency) => {
            info!("Reached {} via {} access in {}s", record.link, tier, latency);
            Stage::Resolved(Latency::Reachable(latency))
        }
        Err(e) => {
            warn!("{} access failed for {}: {}", tier, record.link, e);
            on_failure
        }
    }
}

fn is_probeable(link: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
