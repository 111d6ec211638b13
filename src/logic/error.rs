//! Error Taxonomy
//!
//! All failures are handled where they occur and logged; none of them
//! crash or block the rest of the monitor.

use thiserror::Error;

/// Failure of an HTTP pull against the backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Failure on the live event stream
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("websocket connect failed: {0}")]
    Connect(String),

    #[error("websocket protocol error: {0}")]
    Protocol(String),
}
