//! Geographic coordinate module
//!
//! Provides the validated [`LatLng`] pair used throughout the tracking
//! engine and the forward-azimuth calculation used to derive a heading
//! from two consecutive position fixes.

mod types;

pub use types::{LatLng, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};


/// Computes the initial great-circle bearing from `from` to `to`.
///
/// # Arguments
///
/// * `from` - Earlier position fix
/// * `to` - Later position fix
///
/// # Returns
///
/// Bearing in degrees, normalized to `[0.0, 360.0)`, measured clockwise
/// from true north.
#[inline]
pub fn initial_bearing(from: LatLng, to: LatLng) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Normalizes an arbitrary heading value into `[0.0, 360.0)`.
#[inline]
pub fn normalize_heading(heading_deg: f64) -> f64 {
    heading_deg.rem_euclid(360.0)
}
