//! Route-name label markers.
//!
//! Each label is keyed by a namespaced version of its train id so label
//! keys can never collide with anything else the host caches. A label only
//! exists while label mode is active, the train has a route name, and the
//! primary marker is attached; the store's removal paths tear the handle
//! down so no stale labels accumulate.

use std::collections::HashMap;
use std::sync::Arc;

use crate::map::MarkerHandle;

/// Namespaces a train id into a label key (`train:<id>`).
///
/// Already-namespaced ids pass through unchanged.
pub fn label_key(train_id: &str) -> String {
    if train_id.starts_with("train:") {
        train_id.to_string()
    } else {
        format!("train:{}", train_id)
    }
}

/// One label marker, tied to its owning train.
#[derive(Clone)]
pub struct LabelMarker {
    /// Owning train id (un-namespaced).
    pub train_id: String,

    /// The on-map label handle.
    pub handle: Arc<dyn MarkerHandle>,
}

/// Store of live label markers, keyed by [`label_key`].
#[derive(Default)]
pub struct LabelStore {
    entries: HashMap<String, LabelMarker>,
}

impl LabelStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the label for a train.
    pub fn get(&self, train_id: &str) -> Option<&LabelMarker> {
        self.entries.get(&label_key(train_id))
    }

    /// Inserts or replaces the label for a train.
    ///
    /// A replaced handle is torn down, unless it is the same handle being
    /// re-inserted.
    pub fn insert(&mut self, train_id: &str, handle: Arc<dyn MarkerHandle>) {
        let replaced = self.entries.insert(
            label_key(train_id),
            LabelMarker {
                train_id: train_id.to_string(),
                handle: handle.clone(),
            },
        );
        if let Some(previous) = replaced {
            if !Arc::ptr_eq(&previous.handle, &handle) {
                teardown(&previous.handle);
            }
        }
    }

    /// Removes and tears down the label for a train. No-op when absent.
    pub fn remove(&mut self, train_id: &str) {
        if let Some(entry) = self.entries.remove(&label_key(train_id)) {
            teardown(&entry.handle);
        }
    }

    /// Removes and tears down every label.
    pub fn clear(&mut self) {
        for (_, entry) in self.entries.drain() {
            teardown(&entry.handle);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Detaches (when attached) and destroys a label handle.
fn teardown(handle: &Arc<dyn MarkerHandle>) {
    if handle.is_attached() {
        handle.detach();
    }
    handle.remove();
}
