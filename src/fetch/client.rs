//! Snapshot client trait and HTTP implementation.
//!
//! The [`SnapshotClient`] trait abstracts the transport so the feature can
//! be driven by a scripted client in tests. The [`HttpSnapshotClient`]
//! implementation performs a plain `GET` with no-cache semantics via a
//! reusable `reqwest::Client`.

use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::Value;

use super::error::FetchError;
use crate::snapshot::SnapshotPayload;

/// Trait for fetching one snapshot of train records.
pub trait SnapshotClient: Send + Sync {
    /// Fetches and decodes the current snapshot.
    fn fetch_snapshot(&self) -> BoxFuture<'_, Result<SnapshotPayload, FetchError>>;
}

/// HTTP snapshot client.
///
/// Uses a reusable `reqwest::Client` with connection pooling and a
/// configured timeout.
pub struct HttpSnapshotClient {
    /// Reusable HTTP client.
    http: reqwest::Client,

    /// URL of the snapshot feed.
    endpoint: String,
}

impl HttpSnapshotClient {
    /// Creates a client for the given endpoint.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SnapshotClient for HttpSnapshotClient {
    fn fetch_snapshot(&self) -> BoxFuture<'_, Result<SnapshotPayload, FetchError>> {
        Box::pin(async move {
            let response = self
                .http
                .get(&self.endpoint)
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .send()
                .await
                .map_err(|e| FetchError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| FetchError::Http(e.to_string()))?;

            let value: Value =
                serde_json::from_slice(&bytes).map_err(|e| FetchError::Json(e.to_string()))?;

            match value {
                Value::Object(groups) => {
                    tracing::debug!(groups = groups.len(), "Train snapshot fetched");
                    Ok(groups)
                }
                _ => Err(FetchError::Json(
                    "expected a JSON object at the top level".to_string(),
                )),
            }
        })
    }
}
