//! Coordinate type definitions

use std::fmt;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A geographic position in degrees.
///
/// Constructed through [`LatLng::new`], which rejects non-finite or
/// out-of-range values, so a `LatLng` held by the registry is always a
/// usable fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lng: f64,
}

impl LatLng {
    /// Creates a validated position.
    ///
    /// Returns `None` when either component is non-finite or outside the
    /// valid range, which is how malformed source coordinates collapse to
    /// "no position" instead of an error.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if !(MIN_LAT..=MAX_LAT).contains(&lat) || !(MIN_LON..=MAX_LON).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }

    /// Returns true when the two positions differ by more than `epsilon`
    /// degrees in either component.
    ///
    /// Used to decide whether two consecutive fixes are distinct enough to
    /// derive a bearing from.
    #[inline]
    pub fn is_distinct_from(&self, other: &LatLng, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() > epsilon || (self.lng - other.lng).abs() > epsilon
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}
