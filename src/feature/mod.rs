//! The trains feature facade.
//!
//! [`TrainsFeature`] is the context object the host owns: it wires the
//! collaborators together, holds all mutable state behind one async mutex,
//! and exposes the public operations. Every public operation resolves
//! successfully - internal failures are logged and observable only through
//! [`FeatureEvents`] notifications.
//!
//! # Control flow
//!
//! ```text
//! fetch_now / show-transition
//!         │
//!         ▼
//!   FetchSlot (single-flight) ──► fetch snapshot ──► reconcile registry
//!                                                          │
//!                                                          ▼
//!                                              visibility pass (cull +
//!                                              marker/label lifecycle)
//! ```
//!
//! A visibility pass holds the state lock for its duration, so every pass
//! reads a consistent registry snapshot; a toggle that interleaves with an
//! in-flight fetch is converged by the pass the fetch runs on completion.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::FeatureConfig;
use crate::fetch::{FetchSlot, SharedFetch, SnapshotClient};
use crate::heading::HeadingEstimator;
use crate::map::{FeatureEvents, IconRenderer, LabelRenderer, MapAccess, TrainsGate};
use crate::marker::{
    clear_all_markers, detach_all_markers, detach_marker, discard_train, sync_label, sync_marker,
    LabelStore, MarkerMetrics,
};
use crate::registry::{TrackedTrain, TrainRegistry};
use crate::snapshot::reconcile_snapshot;

/// Externally owned collaborators, injected at construction.
#[derive(Clone)]
pub struct FeatureCollaborators {
    /// Snapshot transport.
    pub client: Arc<dyn SnapshotClient>,

    /// Authorization and label-mode policy.
    pub gate: Arc<dyn TrainsGate>,

    /// Accessor for the current map, if any.
    pub map: Arc<dyn MapAccess>,

    /// Primary icon renderer.
    pub icons: Arc<dyn IconRenderer>,

    /// Label icon renderer.
    pub labels: Arc<dyn LabelRenderer>,

    /// Best-effort notification sink.
    pub events: Arc<dyn FeatureEvents>,
}

/// All mutable feature state, guarded by one async mutex.
pub struct FeatureState {
    /// Persistent per-train state.
    pub registry: TrainRegistry,

    /// Live label markers.
    pub labels: LabelStore,

    /// Whether the layer is currently toggled visible.
    pub visible: bool,
}

struct FeatureInner {
    config: FeatureConfig,
    estimator: HeadingEstimator,
    collaborators: FeatureCollaborators,
    state: Mutex<FeatureState>,
    fetch_slot: Arc<FetchSlot>,
}

/// The trains feature context object.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct TrainsFeature {
    inner: Arc<FeatureInner>,
}

impl TrainsFeature {
    /// Creates the feature, initially hidden.
    ///
    /// The host's notification sink is told the initial state immediately,
    /// mirroring how toggle buttons expect a baseline callback.
    pub fn new(config: FeatureConfig, collaborators: FeatureCollaborators) -> Self {
        let estimator = HeadingEstimator::from_config(&config);
        let inner = Arc::new(FeatureInner {
            config,
            estimator,
            collaborators,
            state: Mutex::new(FeatureState {
                registry: TrainRegistry::new(),
                labels: LabelStore::new(),
                visible: false,
            }),
            fetch_slot: Arc::new(FetchSlot::new()),
        });

        inner.collaborators.events.visibility_changed(false);
        inner.collaborators.events.refresh_toggle();

        Self { inner }
    }

    /// Sets the layer's visibility.
    ///
    /// The request is gated through the authorization policy, so asking
    /// for `true` while disallowed yields hidden. Every call runs a
    /// visibility pass; a hidden-to-visible transition additionally kicks
    /// off a fetch (not awaited - the pass already rendered retained
    /// entities from their last known positions).
    pub async fn set_visible(&self, visible: bool) {
        let inner = &self.inner;
        let desired = inner.collaborators.gate.feature_allowed() && visible;

        let previous = {
            let mut state = inner.state.lock().await;
            std::mem::replace(&mut state.visible, desired)
        };

        inner.collaborators.events.visibility_changed(desired);
        inner.collaborators.events.refresh_toggle();

        run_visibility_pass(inner).await;

        if desired && !previous {
            // Fire-and-forget: the pass above already rendered retained
            // entities; the driver task completes the refresh
            let _ = self.request_fetch().await;
        }
    }

    /// Flips the layer's visibility.
    pub async fn toggle_visibility(&self) {
        let visible = self.inner.state.lock().await.visible;
        self.set_visible(!visible).await;
    }

    /// Runs one visibility pass: culls off-screen or positionless trains
    /// and converges markers and labels for the rest.
    pub async fn run_visibility_pass(&self) {
        run_visibility_pass(&self.inner).await;
    }

    /// Fetches a snapshot now and waits for the full fetch-reconcile-render
    /// sequence to finish.
    ///
    /// Joins the outstanding operation when one is already in flight;
    /// resolves immediately when the feature is disallowed or hidden.
    pub async fn fetch_now(&self) {
        if let Some(operation) = self.request_fetch().await {
            operation.await;
        }
    }

    /// The in-flight fetch operation, for observers. `None` when Idle.
    pub fn current_fetch(&self) -> Option<SharedFetch> {
        self.inner.fetch_slot.current()
    }

    /// Whether a fetch is currently in flight.
    pub fn fetch_in_flight(&self) -> bool {
        self.inner.fetch_slot.is_in_flight()
    }

    /// Destroys every marker and label and clears the registry.
    pub async fn clear_all_markers(&self) {
        let mut state = self.inner.state.lock().await;
        let FeatureState {
            registry, labels, ..
        } = &mut *state;
        clear_all_markers(registry, labels);
    }

    /// Removes the label marker for one train, if present.
    pub async fn remove_label(&self, train_id: &str) {
        self.inner.state.lock().await.labels.remove(train_id);
    }

    /// Whether the layer is currently toggled visible.
    pub async fn is_visible(&self) -> bool {
        self.inner.state.lock().await.visible
    }

    /// Snapshot of the tracked train ids.
    pub async fn train_ids(&self) -> Vec<String> {
        self.inner.state.lock().await.registry.ids()
    }

    /// Clone of one tracked train's state.
    pub async fn train(&self, id: &str) -> Option<TrackedTrain> {
        self.inner.state.lock().await.registry.get(id).cloned()
    }

    /// Number of tracked trains.
    pub async fn train_count(&self) -> usize {
        self.inner.state.lock().await.registry.len()
    }

    /// Number of markers currently attached to the map.
    pub async fn attached_marker_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .await
            .registry
            .values()
            .filter(|train| train.marker_attached())
            .count()
    }

    /// Number of live label markers.
    pub async fn label_count(&self) -> usize {
        self.inner.state.lock().await.labels.len()
    }

    /// Installs (or joins) the single-flight fetch operation.
    ///
    /// Returns `None` without touching the network when the feature is
    /// disallowed or the layer is hidden.
    async fn request_fetch(&self) -> Option<SharedFetch> {
        let inner = &self.inner;
        if let Some(operation) = inner.fetch_slot.current() {
            return Some(operation);
        }
        if !inner.collaborators.gate.feature_allowed() {
            return None;
        }
        if !inner.state.lock().await.visible {
            return None;
        }

        let task_inner = Arc::clone(inner);
        let events = Arc::clone(&inner.collaborators.events);
        let operation = inner.fetch_slot.request(events, async move {
            run_fetch_pass(task_inner).await;
        });
        Some(operation)
    }
}

/// One full fetch-reconcile-render sequence.
///
/// Visibility is re-checked before the network call and again after the
/// response arrives: the layer may have been hidden or disallowed while
/// the request was outstanding, in which case the payload is discarded
/// rather than resurrecting markers.
async fn run_fetch_pass(inner: Arc<FeatureInner>) {
    if !inner.collaborators.gate.feature_allowed() {
        return;
    }
    if !inner.state.lock().await.visible {
        return;
    }

    let payload = match inner.collaborators.client.fetch_snapshot().await {
        Ok(payload) => payload,
        Err(error) => {
            tracing::warn!(error = %error, "Failed to fetch train snapshot");
            return;
        }
    };

    if !inner.collaborators.gate.feature_allowed() {
        tracing::debug!("Discarding train snapshot, feature no longer allowed");
        return;
    }

    let mut state = inner.state.lock().await;
    if !state.visible {
        tracing::debug!("Discarding train snapshot, layer hidden during fetch");
        return;
    }

    {
        let FeatureState {
            registry, labels, ..
        } = &mut *state;
        let outcome = reconcile_snapshot(registry, &inner.estimator, &inner.config, &payload);
        tracing::debug!(
            seen = outcome.seen,
            skipped = outcome.skipped,
            removed = outcome.removed.len(),
            "Train snapshot reconciled"
        );
        for removed in outcome.removed {
            labels.remove(&removed.id);
            discard_train(removed);
        }
    }

    visibility_pass_locked(&inner, &mut state).await;
}

/// Visibility pass entry point: handles the disabled regime, then runs the
/// locked pass for the hidden/visible regimes.
async fn run_visibility_pass(inner: &Arc<FeatureInner>) {
    if !inner.collaborators.gate.feature_allowed() {
        // Disabling is a full teardown, not a hide
        let mut state = inner.state.lock().await;
        let FeatureState {
            registry, labels, ..
        } = &mut *state;
        clear_all_markers(registry, labels);
        return;
    }

    let mut state = inner.state.lock().await;
    visibility_pass_locked(inner, &mut state).await;
}

/// The culling and lifecycle sweep, run under the state lock.
async fn visibility_pass_locked(inner: &Arc<FeatureInner>, state: &mut FeatureState) {
    let FeatureState {
        registry,
        labels,
        visible,
    } = state;

    if !*visible {
        // Hidden but not disabled: markers detach, registry persists
        detach_all_markers(registry, labels);
        return;
    }

    let Some(map) = inner.collaborators.map.map() else {
        return;
    };
    let metrics = MarkerMetrics::for_zoom(&inner.config, map.zoom());
    let label_mode = inner.collaborators.gate.labels_visible();

    for id in registry.ids() {
        let Some(train) = registry.get_mut(&id) else {
            continue;
        };

        let on_screen = train
            .last_position
            .is_some_and(|position| map.contains(position));
        if !on_screen {
            detach_marker(train);
            labels.remove(&id);
            continue;
        }

        let synced = sync_marker(
            train,
            &map,
            inner.collaborators.icons.as_ref(),
            &metrics,
        )
        .await;
        if !synced {
            // Icon failure skips this train for the pass; others proceed
            continue;
        }

        sync_label(
            train,
            labels,
            &map,
            inner.collaborators.labels.as_ref(),
            &metrics,
            label_mode,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLng;
    use crate::fetch::{FetchError, SnapshotPayload};
    use crate::map::{
        IconRenderError, MapSurface, MarkerHandle, MarkerIcon, MarkerStyle, NoopEvents,
    };
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct StaticGate {
        allowed: AtomicBool,
    }

    impl TrainsGate for StaticGate {
        fn feature_allowed(&self) -> bool {
            self.allowed.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct StubMarker {
        attached: AtomicBool,
    }

    impl MarkerHandle for StubMarker {
        fn set_icon(&self, _icon: MarkerIcon) {}
        fn set_position(&self, _position: LatLng) {}
        fn is_attached(&self) -> bool {
            self.attached.load(Ordering::SeqCst)
        }
        fn attach(&self) {
            self.attached.store(true, Ordering::SeqCst);
        }
        fn detach(&self) {
            self.attached.store(false, Ordering::SeqCst);
        }
        fn remove(&self) {}
    }

    struct StubMap;

    impl MapSurface for StubMap {
        fn contains(&self, _position: LatLng) -> bool {
            true
        }
        fn zoom(&self) -> f64 {
            13.0
        }
        fn create_marker(&self, _position: LatLng, _icon: MarkerIcon) -> Arc<dyn MarkerHandle> {
            Arc::new(StubMarker::default())
        }
    }

    struct StubMapAccess;

    impl MapAccess for StubMapAccess {
        fn map(&self) -> Option<Arc<dyn MapSurface>> {
            Some(Arc::new(StubMap))
        }
    }

    struct StubIcons;

    impl IconRenderer for StubIcons {
        fn render_icon<'a>(
            &'a self,
            marker_id: &'a str,
            _style: &'a MarkerStyle,
        ) -> BoxFuture<'a, Result<MarkerIcon, IconRenderError>> {
            Box::pin(async move { Ok(MarkerIcon::new(marker_id, "icon")) })
        }
    }

    struct StubLabels;

    impl LabelRenderer for StubLabels {
        fn render_label(
            &self,
            text: &str,
            _fill_color: &str,
            _scale: f64,
            _heading_deg: f64,
        ) -> Option<MarkerIcon> {
            Some(MarkerIcon::new(format!("label:{text}"), "label"))
        }
    }

    struct ScriptedClient {
        payload: SnapshotPayload,
        calls: AtomicUsize,
    }

    impl SnapshotClient for ScriptedClient {
        fn fetch_snapshot(&self) -> BoxFuture<'_, Result<SnapshotPayload, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let payload = self.payload.clone();
            Box::pin(async move { Ok(payload) })
        }
    }

    fn payload_with_train(id: &str) -> SnapshotPayload {
        let value = serde_json::json!({
            "g": [{"trainID": id, "lat": 40.0, "lon": -75.0}],
        });
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn build_feature(allowed: bool, client: Arc<ScriptedClient>) -> TrainsFeature {
        TrainsFeature::new(
            FeatureConfig::default(),
            FeatureCollaborators {
                client,
                gate: Arc::new(StaticGate {
                    allowed: AtomicBool::new(allowed),
                }),
                map: Arc::new(StubMapAccess),
                icons: Arc::new(StubIcons),
                labels: Arc::new(StubLabels),
                events: Arc::new(NoopEvents),
            },
        )
    }

    fn scripted(id: &str) -> Arc<ScriptedClient> {
        Arc::new(ScriptedClient {
            payload: payload_with_train(id),
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_starts_hidden() {
        let feature = build_feature(true, scripted("99"));
        assert!(!feature.is_visible().await);
        assert_eq!(feature.train_count().await, 0);
        assert!(!feature.fetch_in_flight());
    }

    #[tokio::test]
    async fn test_set_visible_gated_by_authorization() {
        let feature = build_feature(false, scripted("99"));

        feature.set_visible(true).await;
        assert!(!feature.is_visible().await, "disallowed stays hidden");
    }

    #[tokio::test]
    async fn test_fetch_now_hidden_is_noop() {
        let client = scripted("99");
        let feature = build_feature(true, client.clone());

        feature.fetch_now().await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        assert_eq!(feature.train_count().await, 0);
    }

    #[tokio::test]
    async fn test_show_fetches_and_renders() {
        let client = scripted("99");
        let feature = build_feature(true, client.clone());

        feature.set_visible(true).await;
        // The show-transition fetch is fire-and-forget; join it
        if let Some(operation) = feature.current_fetch() {
            operation.await;
        }

        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(feature.train_count().await, 1);
        assert_eq!(feature.attached_marker_count().await, 1);
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let feature = build_feature(true, scripted("99"));

        feature.toggle_visibility().await;
        assert!(feature.is_visible().await);

        feature.toggle_visibility().await;
        assert!(!feature.is_visible().await);
    }

    #[tokio::test]
    async fn test_clear_all_markers_resets() {
        let client = scripted("99");
        let feature = build_feature(true, client.clone());

        feature.set_visible(true).await;
        feature.fetch_now().await;
        assert_eq!(feature.train_count().await, 1);

        feature.clear_all_markers().await;
        assert_eq!(feature.train_count().await, 0);
        assert_eq!(feature.attached_marker_count().await, 0);
    }
}
