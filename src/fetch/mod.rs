//! Snapshot fetching.
//!
//! [`client`] abstracts the HTTP transport behind the [`SnapshotClient`]
//! trait with a `reqwest` implementation; [`coordinator`] owns the
//! single-flight discipline - at most one fetch-and-reconcile operation in
//! flight, with concurrent requesters sharing the same operation.

mod client;
mod coordinator;
mod error;

pub use client::{HttpSnapshotClient, SnapshotClient};
pub use coordinator::{FetchSlot, SharedFetch};
pub use error::FetchError;

pub use crate::snapshot::SnapshotPayload;
