//! Capability surfaces for externally owned collaborators.
//!
//! The tracking engine never owns the map widget, icon rendering, or
//! authorization policy. It consumes them through the narrow traits in this
//! module, which enables dependency injection and testability:
//!
//! - [`MapAccess`] / [`MapSurface`] - the host map, when one exists
//! - [`MarkerHandle`] - one on-map marker, created by the map
//! - [`IconRenderer`] / [`LabelRenderer`] - icon bitmap generation
//! - [`TrainsGate`] - authorization and label-mode policy
//! - [`FeatureEvents`] - best-effort notifications back to the host
//!
//! Optional capabilities are declared here rather than probed at runtime:
//! a marker that cannot animate falls back to an instant reposition via the
//! default [`MarkerHandle::animate_to`] body.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::coord::LatLng;

// ============================================================================
// Icons
// ============================================================================

/// An icon produced by a renderer and consumed by a marker.
///
/// The payload is opaque to this crate; the map implementation decides what
/// it means (DOM markup, a texture key, ...). The cache key identifies the
/// rendered variant for the host's icon cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerIcon {
    /// Renderer cache key (marker id or a label digest).
    pub cache_key: String,
    /// Opaque icon payload understood by the map implementation.
    pub payload: String,
}

impl MarkerIcon {
    /// Creates a new icon.
    pub fn new(cache_key: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            cache_key: cache_key.into(),
            payload: payload.into(),
        }
    }
}

/// Renderable state snapshot handed to the icon renderer.
///
/// Decouples the renderer from the registry's internal entity type.
#[derive(Debug, Clone)]
pub struct MarkerStyle {
    /// Marker body color.
    pub fill_color: String,
    /// Glyph color, contrasting with the fill.
    pub glyph_color: String,
    /// Direction of travel in degrees.
    pub heading_deg: f64,
    /// Marker size in pixels at the current zoom.
    pub size_px: f64,
    /// Assistive-technology description.
    pub accessible_label: String,
    /// Data freshness flags (currently always false after a merge).
    pub is_stale: bool,
    pub is_stopped: bool,
}

// ============================================================================
// Marker Handle
// ============================================================================

/// One on-map marker, owned by the map implementation.
///
/// Handles are created through [`MapSurface::create_marker`] and stay valid
/// until [`remove`](MarkerHandle::remove) is called. Attachment state is
/// tracked by the handle so that attach/detach are idempotent from the
/// engine's point of view.
pub trait MarkerHandle: Send + Sync {
    /// Replaces the marker's icon in place.
    fn set_icon(&self, icon: MarkerIcon);

    /// Moves the marker instantly.
    fn set_position(&self, position: LatLng);

    /// Moves the marker with an animated tween.
    ///
    /// Optional capability: the default implementation falls back to an
    /// instant [`set_position`](MarkerHandle::set_position).
    fn animate_to(&self, position: LatLng) {
        self.set_position(position);
    }

    /// Whether the marker is currently attached to the map.
    fn is_attached(&self) -> bool;

    /// Attaches the marker to the map. No-op when already attached.
    fn attach(&self);

    /// Detaches the marker from the map, keeping the handle reusable.
    fn detach(&self);

    /// Destroys the marker. The handle must not be used afterwards.
    fn remove(&self);
}

// ============================================================================
// Map Surface
// ============================================================================

/// The subset of the host map the engine needs.
pub trait MapSurface: Send + Sync {
    /// Whether the current viewport bounds contain `position`.
    fn contains(&self, position: LatLng) -> bool;

    /// Current zoom level.
    fn zoom(&self) -> f64;

    /// Constructs a marker at `position` with `icon`, not yet attached.
    ///
    /// Pane selection and interactivity are the map implementation's
    /// choice; train markers are expected to be non-interactive.
    fn create_marker(&self, position: LatLng, icon: MarkerIcon) -> Arc<dyn MarkerHandle>;
}

/// Accessor for the current map handle.
///
/// The map may not exist yet (or may be torn down) when a pass runs, so
/// every pass re-fetches it and degrades to a no-op when absent.
pub trait MapAccess: Send + Sync {
    /// Returns the current map, if any.
    fn map(&self) -> Option<Arc<dyn MapSurface>>;
}

// ============================================================================
// Icon Renderers
// ============================================================================

/// Errors from primary icon rendering.
#[derive(Debug, Clone)]
pub struct IconRenderError {
    /// Human-readable error message.
    pub message: String,
}

impl IconRenderError {
    /// Creates a new icon render error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for IconRenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IconRenderError {}

/// Asynchronous renderer for primary train icons.
///
/// Rendering may involve rasterization or resource loading, so it is async
/// and may fail; a failure skips only the affected train for that pass.
pub trait IconRenderer: Send + Sync {
    /// Renders the primary icon for a train.
    ///
    /// # Arguments
    ///
    /// * `marker_id` - Stable display id used as the icon-cache key
    /// * `style` - Renderable state snapshot
    fn render_icon<'a>(
        &'a self,
        marker_id: &'a str,
        style: &'a MarkerStyle,
    ) -> BoxFuture<'a, Result<MarkerIcon, IconRenderError>>;
}

/// Synchronous renderer for label (route name) icons.
pub trait LabelRenderer: Send + Sync {
    /// Renders a label icon, or `None` to suppress the label.
    fn render_label(
        &self,
        text: &str,
        fill_color: &str,
        scale: f64,
        heading_deg: f64,
    ) -> Option<MarkerIcon>;
}

// ============================================================================
// Gating & Notifications
// ============================================================================

/// Authorization and display-mode policy, owned by the host.
pub trait TrainsGate: Send + Sync {
    /// Whether the feature is currently permitted to run at all.
    fn feature_allowed(&self) -> bool;

    /// Whether route-name label markers should be shown.
    ///
    /// Optional capability; defaults to no labels.
    fn labels_visible(&self) -> bool {
        false
    }
}

/// Best-effort notifications back to the host.
///
/// All methods default to no-ops. Implementations must not panic; calls are
/// fire-and-forget and never awaited.
pub trait FeatureEvents: Send + Sync {
    /// The layer's effective visibility changed.
    fn visibility_changed(&self, _visible: bool) {}

    /// A fetch operation started (`true`) or finished (`false`).
    fn fetch_state_changed(&self, _in_flight: bool) {}

    /// The host's toggle-button state should be refreshed.
    fn refresh_toggle(&self) {}
}

/// Events sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl FeatureEvents for NoopEvents {}
