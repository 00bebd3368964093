// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The tool is meant to run unattended (cron, CI), so every option has a
// sensible default and can also be supplied through an environment variable.
// Running `friend-link-probe` with no flags at all is the normal case.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - Option<T>: For settings that may be missing entirely
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

/// Where the friend list lives unless told otherwise
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/qianmo0021/link/aaea6b8a9bd920cc71e153bad46c620fbe6dd67c/flink_count.json";

/// The metered lookup API used as the last tier
pub const DEFAULT_API_ENDPOINT: &str = "https://api.nsmao.net/api/web/query";

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// #[arg(env = "...")] makes clap read the variable when the flag is absent
#[derive(Parser, Debug)]
#[command(
    name = "friend-link-probe",
    version,
    about = "Check friend-site links and write a latency report",
    long_about = "friend-link-probe fetches a friend-link list and checks every entry, first directly, \
                  then through an optional relay proxy, and finally through a metered lookup API. \
                  The result is written as JSON with one latency per link."
)]
pub struct Cli {
    /// API key for the lookup service (the last fallback tier)
    ///
    /// Without a key, links that fail direct and proxy access are reported as unreachable
    #[arg(long, env = "LIJIANGAPI_TOKEN", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Relay prefix; the target URL is appended to it verbatim
    ///
    /// Example: https://relay.example/fetch?url=
    #[arg(long, env = "PROXY_URL")]
    pub proxy_url: Option<String>,

    /// URL of the JSON document holding `link_list`
    #[arg(long, env = "FRIEND_LINKS_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Lookup API endpoint (the key and target are added as query parameters)
    #[arg(long, env = "FRIEND_LINKS_API_ENDPOINT", default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    /// Where to write the JSON report
    #[arg(long, short, env = "FRIEND_LINKS_OUTPUT", default_value = "./result.json")]
    pub output: PathBuf,

    /// How many links to probe at the same time
    #[arg(long, env = "FRIEND_LINKS_CONCURRENCY", default_value_t = 10)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "FRIEND_LINKS_TIMEOUT", default_value_t = 15)]
    pub timeout: u64,

    /// Minimum spacing between two lookup API calls, in milliseconds
    #[arg(long, env = "FRIEND_LINKS_API_PACING_MS", default_value_t = 200)]
    pub api_pacing_ms: u64,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
