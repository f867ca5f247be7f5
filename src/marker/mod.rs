//! Marker lifecycle management.
//!
//! Creates, updates, repositions, and destroys the primary marker and the
//! optional route-name label marker for each tracked train, delegating
//! icon rendering and map attachment to the capability surfaces in
//! [`crate::map`]. Every operation here is safe to run on every visibility
//! pass: attachment is idempotent and no stale handles accumulate.

mod labels;
mod lifecycle;
mod metrics;

pub use labels::{label_key, LabelMarker, LabelStore};
pub use lifecycle::{
    clear_all_markers, detach_all_markers, detach_marker, discard_train, sync_label, sync_marker,
};
pub use metrics::MarkerMetrics;
