//! Entity registry - persistent per-train tracked state.
//!
//! The registry is the single source of truth for which trains exist: after
//! every successful reconciliation its id set equals the id set of the most
//! recent snapshot. A train may well persist without an attached marker
//! (off-screen, or the layer is hidden); detachment never implies deletion.
//!
//! The registry is a pure data structure. Marker and label teardown for
//! removed entries happens in the [`crate::marker`] lifecycle helpers, which
//! receive the removed entries from [`TrainRegistry::remove`] /
//! [`TrainRegistry::remove_all`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::color::contrast_glyph_color;
use crate::config::FeatureConfig;
use crate::coord::LatLng;
use crate::map::{MarkerHandle, MarkerStyle};

/// Tracked state for one train, keyed by its stable external id.
#[derive(Clone)]
pub struct TrackedTrain {
    /// Stable identifier from the feed.
    pub id: String,

    /// Whitespace-normalized display id, used only as an external
    /// icon-cache key.
    pub marker_id: String,

    /// Previously observed fixes, newest last, bounded; used only to
    /// derive a heading.
    pub position_history: Vec<LatLng>,

    /// Last known or estimated heading in degrees.
    pub heading_deg: f64,

    /// Last known fix, absent when the source row had no valid position.
    pub last_position: Option<LatLng>,

    /// Marker body color.
    pub fill_color: String,

    /// Glyph color, contrasting with the fill when not supplied.
    pub glyph_color: String,

    /// Assistive-technology description.
    pub accessible_label: String,

    /// Freshness flags, reset to false on every merge.
    pub is_stale: bool,
    pub is_stopped: bool,

    /// Wall-clock time of the last successful merge.
    pub last_update: Option<DateTime<Utc>>,

    /// Route name shown in the optional label marker, trimmed.
    pub route_name: String,

    /// Currently constructed on-map marker, absent when never rendered.
    pub marker: Option<Arc<dyn MarkerHandle>>,
}

impl TrackedTrain {
    /// Creates a fresh entry with configured defaults.
    pub fn new(id: &str, config: &FeatureConfig) -> Self {
        let fill_color = config.default_fill_color.clone();
        let glyph_color = contrast_glyph_color(&fill_color).to_string();
        Self {
            id: id.to_string(),
            marker_id: derive_marker_id(id),
            position_history: Vec::new(),
            heading_deg: config.default_heading_deg,
            last_position: None,
            fill_color,
            glyph_color,
            accessible_label: format!("Train {}", id),
            is_stale: false,
            is_stopped: false,
            last_update: None,
            route_name: String::new(),
            marker: None,
        }
    }

    /// Snapshot of renderable state at a given marker size.
    pub fn style(&self, size_px: f64) -> MarkerStyle {
        MarkerStyle {
            fill_color: self.fill_color.clone(),
            glyph_color: self.glyph_color.clone(),
            heading_deg: self.heading_deg,
            size_px,
            accessible_label: self.accessible_label.clone(),
            is_stale: self.is_stale,
            is_stopped: self.is_stopped,
        }
    }

    /// Whether this train currently has a marker attached to the map.
    pub fn marker_attached(&self) -> bool {
        self.marker.as_ref().is_some_and(|m| m.is_attached())
    }
}

impl fmt::Debug for TrackedTrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedTrain")
            .field("id", &self.id)
            .field("marker_id", &self.marker_id)
            .field("heading_deg", &self.heading_deg)
            .field("last_position", &self.last_position)
            .field("fill_color", &self.fill_color)
            .field("route_name", &self.route_name)
            .field("has_marker", &self.marker.is_some())
            .finish_non_exhaustive()
    }
}

/// Derives the display id: `train-` plus the id with whitespace runs
/// collapsed to single dashes.
pub fn derive_marker_id(id: &str) -> String {
    let collapsed: Vec<&str> = id.split_whitespace().collect();
    format!("train-{}", collapsed.join("-"))
}

/// Id-keyed registry of tracked trains.
#[derive(Debug, Default)]
pub struct TrainRegistry {
    entries: HashMap<String, TrackedTrain>,
}

impl TrainRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create-or-get: returns the existing entry for `id`, or inserts a
    /// fresh one with configured defaults. Never resets existing fields.
    pub fn upsert(&mut self, id: &str, config: &FeatureConfig) -> &mut TrackedTrain {
        self.entries
            .entry(id.to_string())
            .or_insert_with(|| TrackedTrain::new(id, config))
    }

    /// Removes an entry, returning it for handle teardown.
    ///
    /// Removing an absent id is a no-op returning `None`.
    pub fn remove(&mut self, id: &str) -> Option<TrackedTrain> {
        self.entries.remove(id)
    }

    /// Drains every entry, returning them for handle teardown.
    pub fn remove_all(&mut self) -> Vec<TrackedTrain> {
        self.entries.drain().map(|(_, train)| train).collect()
    }

    /// Snapshot of the current id set.
    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&TrackedTrain> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TrackedTrain> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterates over all tracked trains.
    pub fn values(&self) -> impl Iterator<Item = &TrackedTrain> {
        self.entries.values()
    }

    /// Iterates mutably over all tracked trains.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut TrackedTrain> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
