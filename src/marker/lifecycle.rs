//! Marker create/update/teardown operations.

use std::sync::Arc;

use crate::map::{IconRenderer, LabelRenderer, MapSurface, MarkerHandle};
use crate::registry::{TrackedTrain, TrainRegistry};

use super::labels::LabelStore;
use super::metrics::MarkerMetrics;

/// Converges a train's primary marker with its current state.
///
/// Requests a fresh icon from the renderer; on failure the train is left
/// untouched for this pass and `false` is returned so the caller skips its
/// label as well. Otherwise the marker is created at the train's position
/// (first sighting) or updated in place, attached idempotently, and moved
/// with an animated reposition rather than an instant jump.
pub async fn sync_marker(
    train: &mut TrackedTrain,
    map: &Arc<dyn MapSurface>,
    icons: &dyn IconRenderer,
    metrics: &MarkerMetrics,
) -> bool {
    let Some(position) = train.last_position else {
        return false;
    };

    let style = train.style(metrics.size_px);
    let icon = match icons.render_icon(&train.marker_id, &style).await {
        Ok(icon) => icon,
        Err(error) => {
            tracing::warn!(
                train_id = %train.id,
                error = %error,
                "Failed to render train marker icon"
            );
            return false;
        }
    };

    let marker = match &train.marker {
        Some(existing) => {
            existing.set_icon(icon);
            Arc::clone(existing)
        }
        None => {
            let created = map.create_marker(position, icon);
            train.marker = Some(Arc::clone(&created));
            created
        }
    };

    if !marker.is_attached() {
        marker.attach();
    }
    marker.animate_to(position);
    true
}

/// Converges a train's label marker with its current state.
///
/// A label exists only while `label_mode` is on, the train has a non-empty
/// route name, and the primary marker is present; in every other case any
/// existing label is destroyed. The label renderer may also suppress the
/// label by returning `None`.
pub fn sync_label(
    train: &TrackedTrain,
    labels: &mut LabelStore,
    map: &Arc<dyn MapSurface>,
    renderer: &dyn LabelRenderer,
    metrics: &MarkerMetrics,
    label_mode: bool,
) {
    let eligible = label_mode && !train.route_name.is_empty() && train.marker.is_some();
    let position = train.last_position;

    let (Some(position), true) = (position, eligible) else {
        labels.remove(&train.id);
        return;
    };

    let icon = renderer.render_label(
        &train.route_name,
        &train.fill_color,
        metrics.scale,
        train.heading_deg,
    );
    let Some(icon) = icon else {
        labels.remove(&train.id);
        return;
    };

    match labels.get(&train.id) {
        Some(existing) => {
            existing.handle.animate_to(position);
            existing.handle.set_icon(icon);
        }
        None => {
            let handle = map.create_marker(position, icon);
            if !handle.is_attached() {
                handle.attach();
            }
            labels.insert(&train.id, handle);
        }
    }
}

/// Detaches a train's marker from the map, keeping the handle for a later
/// re-show. No-op when there is no marker or it is already detached.
pub fn detach_marker(train: &TrackedTrain) {
    if let Some(marker) = &train.marker {
        if marker.is_attached() {
            marker.detach();
        }
    }
}

/// Destroys a removed train's marker handle.
pub fn discard_train(train: TrackedTrain) {
    if let Some(marker) = train.marker {
        if marker.is_attached() {
            marker.detach();
        }
        marker.remove();
    }
}

/// Hidden-layer teardown: detaches every marker (handles retained) and
/// destroys every label. Registry entries persist so a re-show can render
/// immediately from the last known positions.
pub fn detach_all_markers(registry: &TrainRegistry, labels: &mut LabelStore) {
    for train in registry.values() {
        detach_marker(train);
    }
    labels.clear();
}

/// Disabled-feature teardown: destroys every marker and label and clears
/// the registry entirely. A subsequent re-enable starts from nothing.
pub fn clear_all_markers(registry: &mut TrainRegistry, labels: &mut LabelStore) {
    for train in registry.remove_all() {
        discard_train(train);
    }
    labels.clear();
}
