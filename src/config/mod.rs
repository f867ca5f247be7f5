//! Feature configuration.
//!
//! All tunables live in one [`FeatureConfig`] passed at construction time;
//! nothing in the engine reads ambient globals.

mod defaults;

pub use defaults::{
    DEFAULT_FILL_COLOR, DEFAULT_HEADING_DEG, DEFAULT_HISTORY_WINDOW, DEFAULT_HTTP_TIMEOUT,
    DEFAULT_MARKER_BASE_SIZE_PX, DEFAULT_MARKER_BASE_ZOOM, DEFAULT_MARKER_MAX_SCALE,
    DEFAULT_MARKER_MIN_SCALE, DEFAULT_POSITION_EPSILON_DEG,
};

use std::time::Duration;

/// Configuration for the trains feature.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    /// URL of the JSON snapshot feed.
    pub endpoint: String,

    /// Optional station code filter; records not serving this station are
    /// skipped entirely. `None` or empty admits every record.
    pub station_code: Option<String>,

    /// Fill color applied before the feed supplies one.
    pub default_fill_color: String,

    /// Heading applied before any history exists.
    pub default_heading_deg: f64,

    /// Maximum retained position fixes per train (oldest discarded first).
    pub history_window: usize,

    /// Minimum per-component separation (degrees) for two fixes to count
    /// as distinct when deriving a heading.
    pub position_epsilon_deg: f64,

    /// Zoom level at which markers render at their base size.
    pub marker_base_zoom: f64,

    /// Marker size in pixels at the base zoom.
    pub marker_base_size_px: f64,

    /// HTTP timeout for snapshot fetches.
    pub http_timeout: Duration,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            station_code: None,
            default_fill_color: DEFAULT_FILL_COLOR.to_string(),
            default_heading_deg: DEFAULT_HEADING_DEG,
            history_window: DEFAULT_HISTORY_WINDOW,
            position_epsilon_deg: DEFAULT_POSITION_EPSILON_DEG,
            marker_base_zoom: DEFAULT_MARKER_BASE_ZOOM,
            marker_base_size_px: DEFAULT_MARKER_BASE_SIZE_PX,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl FeatureConfig {
    /// Returns the normalized station filter, or `None` when the filter is
    /// unset or blank.
    pub fn normalized_station_code(&self) -> Option<String> {
        self.station_code
            .as_deref()
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeatureConfig::default();

        assert!(config.endpoint.is_empty());
        assert!(config.station_code.is_none());
        assert_eq!(config.default_fill_color, DEFAULT_FILL_COLOR);
        assert_eq!(config.default_heading_deg, 0.0);
        assert_eq!(config.history_window, DEFAULT_HISTORY_WINDOW);
    }

    #[test]
    fn test_normalized_station_code() {
        let mut config = FeatureConfig::default();
        assert_eq!(config.normalized_station_code(), None);

        config.station_code = Some("  phl ".to_string());
        assert_eq!(config.normalized_station_code(), Some("PHL".to_string()));

        config.station_code = Some("   ".to_string());
        assert_eq!(config.normalized_station_code(), None);
    }
}
