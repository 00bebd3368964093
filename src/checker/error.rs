// src/checker/error.rs
// =============================================================================
// Why a single probe attempt failed.
//
// None of these are fatal. A `ProbeError` only tells the fallback logic that
// a tier did not work, and the message ends up in the log.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed")]
    Connect,

    #[error("TLS certificate error")]
    Tls,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("API returned code {code}")]
    Application { code: i64 },

    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    /// The tier has nothing to work with (no proxy prefix, no API key)
    #[error("{0} not configured")]
    NotConfigured(&'static str),
}

impl From<reqwest::Error> for ProbeError {
    // reqwest errors can happen for many reasons; keep the ones worth telling apart
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProbeError::Timeout
        } else if is_certificate_error(&error) {
            ProbeError::Tls
        } else if error.is_connect() {
            ProbeError::Connect
        } else {
            ProbeError::Transport(error.to_string())
        }
    }
}

// Only the causes are inspected; the top-level message contains the URL
fn is_certificate_error(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let text = cause.to_string().to_lowercase();
        if text.contains("certificate") || text.contains("ssl") {
            return true;
        }
        source = cause.source();
    }
    false
}
