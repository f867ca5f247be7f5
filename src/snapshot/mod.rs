//! Snapshot model and reconciliation.
//!
//! A snapshot is one fetched batch of train records: a JSON object mapping
//! arbitrary group labels to arrays of records. Groups carry no meaning and
//! are flattened. [`record`] handles tolerant per-record field extraction;
//! [`reconciler`] merges a whole snapshot into the registry with
//! replace-by-diff semantics (absence means removal, not staleness).

mod record;
mod reconciler;

pub use record::{RawTrainRecord, ID_FIELDS};
pub use reconciler::{reconcile_snapshot, ReconcileOutcome};

/// One fetched snapshot: arbitrary group labels to arrays of raw records.
pub type SnapshotPayload = serde_json::Map<String, serde_json::Value>;
