// src/checker/probe.rs
// =============================================================================
// This module performs one probing attempt against one link.
//
// There are three tiers, tried in this order by the fallback logic:
// - Direct: GET the link itself and time it
// - Proxy:  GET the link through a relay prefix and time it
// - Api:    ask a metered lookup API; it reports its own execution time
//
// A probe never returns an "error" to its caller in the exceptional sense:
// timeouts, refused connections, bad certificates and non-200 answers all
// come back as a `ProbeError` describing why the tier failed.
//
// Rust concepts:
// - Enums with Display: Tier prints itself in log lines
// - Type aliases: ProbeOutcome names a Result we use everywhere
// - Arc<T>: one Config shared by every clone of the HTTP wrapper below
// - The ? operator with From: reqwest errors turn into ProbeError on the fly
// =============================================================================

use super::error::ProbeError;
use crate::config::Config;
use crate::links::round_latency;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Which strategy a probe uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Direct,
    Proxy,
    Api,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Direct => "direct",
            Tier::Proxy => "proxy",
            Tier::Api => "API",
        };
        f.write_str(name)
    }
}

/// Latency in seconds (rounded to two decimals), or why the tier failed
pub type ProbeOutcome = std::result::Result<f64, ProbeError>;

// Body of the lookup API response; extra fields are ignored
#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: Option<i64>,
    exec_time: Option<f64>,
}

/// Issues single probes. Cheap to clone: the HTTP client and config are shared.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    config: Arc<Config>,
}

impl Prober {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        // Certificate validation stays on; an invalid cert is a failed tier
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Prober { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one attempt of `tier` against `target`
    pub async fn probe(&self, target: &str, tier: Tier) -> ProbeOutcome {
        match tier {
            Tier::Direct => self.timed_get(target).await,
            Tier::Proxy => match self.config.proxy_link(target) {
                Some(proxied) => self.timed_get(&proxied).await,
                None => Err(ProbeError::NotConfigured("proxy")),
            },
            Tier::Api => self.query_api(target).await,
        }
    }

    // Times a GET from send until the whole body has arrived
    async fn timed_get(&self, url: &str) -> ProbeOutcome {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ProbeError::HttpStatus(status.as_u16()));
        }

        response.bytes().await?;
        Ok(round_latency(start.elapsed().as_secs_f64()))
    }

    // The API does the real request on its side, so its exec_time is the latency
    async fn query_api(&self, target: &str) -> ProbeOutcome {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProbeError::NotConfigured("API key"))?;

        // The transport status is ignored; only the payload's code counts
        let body = self
            .client
            .get(&self.config.api_endpoint)
            .query(&[("key", key), ("url", target)])
            .send()
            .await?
            .bytes()
            .await?;

        let payload: ApiResponse = serde_json::from_slice(&body)
            .map_err(|e| ProbeError::MalformedResponse(e.to_string()))?;

        match (payload.code, payload.exec_time) {
            (Some(200), Some(secs)) if secs.is_finite() && secs >= 0.0 => Ok(round_latency(secs)),
            (Some(200), exec_time) => Err(ProbeError::MalformedResponse(format!(
                "unusable exec_time {:?}",
                exec_time
            ))),
            (code, _) => Err(ProbeError::Application {
                code: code.unwrap_or(-1),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. How does `?` turn a reqwest::Error into a ProbeError?
//    - `?` calls From::from on the error before returning it
//    - error.rs implements From<reqwest::Error> for ProbeError
//    - So `send().await?` works even though the function returns ProbeOutcome
//
// 2. Why match on a tuple in query_api?
//    - (payload.code, payload.exec_time) checks both fields at once
//    - Guards (`if secs.is_finite() ...`) add conditions to a pattern
//    - Arms are tried top to bottom; the last one catches every other code
//
// 3. Why Arc<Config> and not &Config?
//    - Clones of this struct go into spawned tasks, which must own their data
//    - Arc is a shared pointer: cloning it only bumps a reference count
// -----------------------------------------------------------------------------
