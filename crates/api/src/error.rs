//! Transport error type.

use reqwest::Method;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response: immediately for caller errors, after the retry
    /// budget for 429 and 5xx.
    #[error("{method} {path} failed with HTTP {status} after {attempts} attempt(s): {body}")]
    Status {
        method: Method,
        path: String,
        status: u16,
        body: String,
        attempts: u32,
    },

    /// No response at all (connection refused, timeout...).
    #[error("{method} {path} failed after {attempts} attempt(s): {source}")]
    Request {
        method: Method,
        path: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response body from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination cursor `{cursor}` repeated while listing {path}")]
    StalledCursor { path: String, cursor: String },

    #[error("cannot build request URL for {path}: {reason}")]
    InvalidUrl { path: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// HTTP status of the final response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the transport would have retried this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Request { source, .. } => source.is_timeout() || source.is_connect(),
            _ => false,
        }
    }
}
