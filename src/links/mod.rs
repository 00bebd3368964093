// src/links/mod.rs
// =============================================================================
// This module owns the friend-link data: what one entry looks like, how its
// latency is represented, and how the list is fetched.
//
// Submodules:
// - fetch: Downloads and parses the `link_list` JSON document
// =============================================================================

mod fetch;

pub use fetch::fetch_link_list;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Latency written for links that no tier could reach
pub const UNREACHABLE: f64 = -1.0;

/// One friend-site entry
///
/// `name`, `link` and `avatar` are copied to the report untouched. The avatar
/// is kept as raw JSON, so `null` or a non-string value survives the trip;
/// only a missing key becomes `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Position in the source list; used to match results back to inputs
    #[serde(skip)]
    pub id: usize,
    pub name: String,
    pub link: String,
    #[serde(default = "missing_avatar")]
    pub avatar: Value,
}

fn missing_avatar() -> Value {
    Value::String(String::new())
}

/// Final latency of a link
///
/// Serializes as the number of seconds, or `-1` for an unreachable link.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "f64")]
pub enum Latency {
    Reachable(f64),
    Unreachable,
}

// Written by hand so the sentinel comes out as `-1` rather than `-1.0`
impl Serialize for Latency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Latency::Reachable(secs) => serializer.serialize_f64(*secs),
            Latency::Unreachable => serializer.serialize_i64(-1),
        }
    }
}

impl Latency {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Latency::Reachable(_))
    }
}

impl From<Latency> for f64 {
    fn from(latency: Latency) -> f64 {
        match latency {
            Latency::Reachable(secs) => secs,
            Latency::Unreachable => UNREACHABLE,
        }
    }
}

impl From<f64> for Latency {
    fn from(secs: f64) -> Latency {
        if secs >= 0.0 {
            Latency::Reachable(secs)
        } else {
            Latency::Unreachable
        }
    }
}

/// Rounds elapsed seconds to two decimals, the precision used in the report
pub fn round_latency(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
