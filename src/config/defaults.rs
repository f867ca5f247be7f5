//! Default values for feature configuration.

use std::time::Duration;

/// Fill color used before the feed supplies one (slate-900).
pub const DEFAULT_FILL_COLOR: &str = "#0f172a";

/// Heading used before any position history exists.
pub const DEFAULT_HEADING_DEG: f64 = 0.0;

/// Position fixes retained per train for heading derivation.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Two fixes closer than this (degrees, per component) are treated as the
/// same point; roughly 10 cm at the equator.
pub const DEFAULT_POSITION_EPSILON_DEG: f64 = 1e-6;

/// Zoom level at which markers render at their base size.
pub const DEFAULT_MARKER_BASE_ZOOM: f64 = 13.0;

/// Marker size in pixels at the base zoom.
pub const DEFAULT_MARKER_BASE_SIZE_PX: f64 = 34.0;

/// Marker scale is clamped to this range as zoom diverges from base.
pub const DEFAULT_MARKER_MIN_SCALE: f64 = 0.55;
pub const DEFAULT_MARKER_MAX_SCALE: f64 = 1.6;

/// HTTP timeout for snapshot fetches.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
