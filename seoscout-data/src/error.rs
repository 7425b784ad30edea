//! Retrieval error taxonomy
//!
//! Upstream unavailability and malformed responses are deliberately close
//! cousins: callers treat both as "no data from this path".

use thiserror::Error;

/// Errors from a single retrieval path
#[derive(Debug, Error)]
pub enum DataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected request ({code}): {message}")]
    Status { code: u32, message: String },

    #[error("unexpected response shape: {0}")]
    Malformed(String),

    #[error("bridge error: {0}")]
    Bridge(String),

    #[error("bridge call timed out after {0}s")]
    BridgeTimeout(u64),

    #[error("credentials not configured")]
    NotConfigured,
}
