//! Zoom-derived marker sizing.

use crate::config::{FeatureConfig, DEFAULT_MARKER_MAX_SCALE, DEFAULT_MARKER_MIN_SCALE};

/// Marker sizing for the current zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerMetrics {
    /// Marker size in pixels.
    pub size_px: f64,

    /// Scale factor relative to the base size, also used by label
    /// rendering.
    pub scale: f64,
}

impl MarkerMetrics {
    /// Computes metrics for a zoom level.
    ///
    /// Markers halve in size for every two zoom levels below the base and
    /// grow correspondingly above it, clamped so extreme zooms stay
    /// readable.
    pub fn for_zoom(config: &FeatureConfig, zoom: f64) -> Self {
        let scale = 2.0_f64
            .powf((zoom - config.marker_base_zoom) / 2.0)
            .clamp(DEFAULT_MARKER_MIN_SCALE, DEFAULT_MARKER_MAX_SCALE);
        Self {
            size_px: config.marker_base_size_px * scale,
            scale,
        }
    }
}
