//! Heading estimation from consecutive position fixes.
//!
//! The feed sometimes carries an explicit heading; when it does, that value
//! wins. When it does not, the estimator falls back to the bearing between
//! the most recent recorded fix and the new one, provided the two are far
//! enough apart to be meaningful. A stationary or positionless train keeps
//! its previous heading.

use crate::config::FeatureConfig;
use crate::coord::{initial_bearing, normalize_heading, LatLng};
use crate::registry::TrackedTrain;

/// Derives train headings and maintains the bounded position history.
#[derive(Debug, Clone)]
pub struct HeadingEstimator {
    /// Maximum retained fixes (oldest discarded first).
    window: usize,

    /// Minimum per-component separation (degrees) for two fixes to count
    /// as distinct.
    epsilon_deg: f64,
}

impl HeadingEstimator {
    /// Creates an estimator with an explicit window and epsilon.
    pub fn new(window: usize, epsilon_deg: f64) -> Self {
        Self {
            // A window of zero would make every fix its own history; keep
            // at least one entry so bearings can be derived.
            window: window.max(1),
            epsilon_deg,
        }
    }

    /// Creates an estimator from the feature configuration.
    pub fn from_config(config: &FeatureConfig) -> Self {
        Self::new(config.history_window, config.position_epsilon_deg)
    }

    /// Updates `train.heading_deg` and its position history.
    ///
    /// Priority:
    /// 1. A finite `explicit_heading` is recorded directly.
    /// 2. Otherwise, the bearing from the last recorded fix to
    ///    `new_position`, when both exist and are distinct.
    /// 3. Otherwise the previous heading is retained.
    ///
    /// The new position (when present) is always appended to the history,
    /// which is trimmed front-first to the configured window. An absent
    /// position leaves both heading and history untouched.
    pub fn update_heading(
        &self,
        train: &mut TrackedTrain,
        new_position: Option<LatLng>,
        explicit_heading: Option<f64>,
    ) {
        if let Some(heading) = explicit_heading.filter(|h| h.is_finite()) {
            train.heading_deg = normalize_heading(heading);
        } else if let (Some(position), Some(previous)) =
            (new_position, train.position_history.last())
        {
            if previous.is_distinct_from(&position, self.epsilon_deg) {
                train.heading_deg = initial_bearing(*previous, position);
            }
        }

        if let Some(position) = new_position {
            train.position_history.push(position);
            let excess = train.position_history.len().saturating_sub(self.window);
            if excess > 0 {
                train.position_history.drain(..excess);
            }
        }
    }
}
