// src/config.rs
// =============================================================================
// Runtime configuration, built exactly once at startup.
//
// The checker never reads the process environment itself. Everything it needs
// (API key, proxy prefix, timeouts, pool size) lives in `Config`, which is
// handed to the probing code behind an `Arc`.
// =============================================================================

use crate::cli::{Cli, DEFAULT_API_ENDPOINT, DEFAULT_SOURCE_URL};
use std::path::PathBuf;
use std::time::Duration;

/// Browser-like identification; some sites answer bots with 403
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    /// Key for the lookup API; `None` means the API tier always fails
    pub api_key: Option<String>,
    /// Relay prefix; `None` means the proxy tier is skipped
    pub proxy_url: Option<String>,
    pub api_endpoint: String,
    pub source_url: String,
    pub output: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
    pub api_pacing: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            proxy_url: None,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            output: PathBuf::from("./result.json"),
            concurrency: 10,
            timeout: Duration::from_secs(15),
            api_pacing: Duration::from_millis(200),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            api_key: non_blank(cli.api_key),
            proxy_url: non_blank(cli.proxy_url),
            api_endpoint: cli.api_endpoint,
            source_url: cli.source_url,
            output: cli.output,
            // A pool of zero workers would never make progress
            concurrency: cli.concurrency.max(1),
            timeout: Duration::from_secs(cli.timeout),
            api_pacing: Duration::from_millis(cli.api_pacing_ms),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Builds the relayed URL for a target, or `None` when no proxy is set.
    ///
    /// The target is appended as-is; relays that need it encoded should be
    /// configured with a prefix that accepts raw URLs.
    pub fn proxy_link(&self, target: &str) -> Option<String> {
        self.proxy_url
            .as_ref()
            .map(|prefix| format!("{}{}", prefix, target))
    }
}

// `PROXY_URL=` in a .env file should behave like an unset variable
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
