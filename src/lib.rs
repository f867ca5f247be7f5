//! TrainLayer - live train markers for host-owned map overlays
//!
//! This library keeps a set of map markers synchronized with a periodically
//! fetched JSON feed of train positions. It owns the reconciliation and
//! lifecycle engine; drawing, the map widget, and authorization policy stay
//! with the host behind narrow capability traits.
//!
//! # High-Level API
//!
//! The [`feature`] module provides the facade most hosts need:
//!
//! ```ignore
//! use trainlayer::config::FeatureConfig;
//! use trainlayer::feature::{FeatureCollaborators, TrainsFeature};
//!
//! let config = FeatureConfig {
//!     endpoint: "https://example.org/trains.json".to_string(),
//!     ..FeatureConfig::default()
//! };
//! let feature = TrainsFeature::new(config, collaborators);
//!
//! // Show the layer; the first show triggers a fetch.
//! feature.set_visible(true).await;
//! ```

pub mod color;
pub mod config;
pub mod coord;
pub mod feature;
pub mod fetch;
pub mod heading;
pub mod logging;
pub mod map;
pub mod marker;
pub mod registry;
pub mod snapshot;

/// Version of the TrainLayer library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
