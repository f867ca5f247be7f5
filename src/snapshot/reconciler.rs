//! Snapshot reconciliation - replace-by-diff merge into the registry.

use std::collections::HashSet;

use chrono::Utc;

use crate::color::{contrast_glyph_color, normalize_color, normalize_glyph_color};
use crate::config::FeatureConfig;
use crate::heading::HeadingEstimator;
use crate::registry::{TrackedTrain, TrainRegistry};

use super::record::RawTrainRecord;
use super::SnapshotPayload;

/// Result of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Distinct ids upserted this pass.
    pub seen: usize,

    /// Records skipped (filtered out, no id, or not an object).
    pub skipped: usize,

    /// Entries whose ids were absent from the snapshot, removed from the
    /// registry. The caller owns tearing down their marker handles.
    pub removed: Vec<TrackedTrain>,
}

/// Merges one snapshot into the registry.
///
/// Every record in every group is filtered, identified, and upserted; ids
/// not seen by the end of the pass are deleted outright. The reconciler
/// never keeps last-pass data for an id the new snapshot dropped - absence
/// means removal, not staleness.
///
/// Capture time is taken once so all entries merged by a pass share the
/// same `last_update` stamp.
pub fn reconcile_snapshot(
    registry: &mut TrainRegistry,
    estimator: &HeadingEstimator,
    config: &FeatureConfig,
    payload: &SnapshotPayload,
) -> ReconcileOutcome {
    let station_filter = config.normalized_station_code();
    let captured_at = Utc::now();

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut skipped = 0usize;

    for group in payload.values() {
        // Groups are not semantically meaningful; non-array values are
        // metadata and get ignored.
        let Some(records) = group.as_array() else {
            continue;
        };

        for raw in records {
            let Some(record) = RawTrainRecord::from_value(raw) else {
                skipped += 1;
                continue;
            };
            if let Some(code) = &station_filter {
                if !record.serves_station(code) {
                    skipped += 1;
                    continue;
                }
            }
            let Some(id) = record.identifier() else {
                skipped += 1;
                continue;
            };

            seen_ids.insert(id.clone());
            merge_record(registry, estimator, config, &id, &record, captured_at);
        }
    }

    let mut removed = Vec::new();
    for id in registry.ids() {
        if !seen_ids.contains(&id) {
            if let Some(train) = registry.remove(&id) {
                removed.push(train);
            }
        }
    }

    ReconcileOutcome {
        seen: seen_ids.len(),
        skipped,
        removed,
    }
}

/// Upserts one record into the registry.
fn merge_record(
    registry: &mut TrainRegistry,
    estimator: &HeadingEstimator,
    config: &FeatureConfig,
    id: &str,
    record: &RawTrainRecord,
    captured_at: chrono::DateTime<Utc>,
) {
    let train = registry.upsert(id, config);

    let fill_color = normalize_color(
        record.icon_color().unwrap_or(""),
        &config.default_fill_color,
    );
    let glyph_color = match record.text_color() {
        Some(text_color) => normalize_glyph_color(text_color, &fill_color),
        None => contrast_glyph_color(&fill_color).to_string(),
    };

    train.fill_color = fill_color;
    train.glyph_color = glyph_color;
    train.route_name = record.route_name().to_string();
    train.accessible_label = accessible_label(&train.route_name, id);
    train.is_stale = false;
    train.is_stopped = false;
    train.last_update = Some(captured_at);

    let position = record.position();
    train.last_position = position;
    estimator.update_heading(train, position, record.heading_deg());
}

/// Builds the assistive-technology description for a train.
fn accessible_label(route_name: &str, id: &str) -> String {
    if route_name.is_empty() {
        format!("Train {}", id)
    } else {
        format!("Train {} {}", route_name, id)
    }
}
