//! Error types for snapshot fetching.

use thiserror::Error;

/// Errors that can occur while fetching or decoding a snapshot.
///
/// None of these propagate to public callers: a failed fetch is logged,
/// the pass is aborted, and the previous registry state is retained. Retry
/// is the caller's periodic-invocation responsibility.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (transport-level).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status.
    #[error("Snapshot endpoint returned status {0}")]
    Status(u16),

    /// The response body was not the expected JSON shape.
    #[error("Failed to parse snapshot response: {0}")]
    Json(String),
}
