//! Single-flight fetch coordination.
//!
//! An explicit two-state machine: **Idle** (slot empty) and **InFlight**
//! (slot holds the current operation). Requesting a fetch while one is
//! outstanding returns a clone of the same shared operation instead of
//! starting a second one; the slot empties itself when the operation
//! completes.
//!
//! A spawned driver task polls the operation to completion, so it runs
//! even when no requester awaits the returned handle; show-transition
//! refreshes are fire-and-forget.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

use crate::map::FeatureEvents;

/// Handle to the in-flight fetch operation.
///
/// Cloneable; all clones resolve when the underlying operation completes.
pub type SharedFetch = Shared<BoxFuture<'static, ()>>;

/// The single-flight slot.
///
/// The inner mutex is only ever held for pointer-sized bookkeeping, never
/// across an await point.
#[derive(Default)]
pub struct FetchSlot {
    current: Mutex<Option<SharedFetch>>,
}

impl FetchSlot {
    /// Creates an empty (Idle) slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outstanding operation, if any.
    pub fn current(&self) -> Option<SharedFetch> {
        self.current.lock().unwrap().clone()
    }

    /// Whether a fetch is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        self.current.lock().unwrap().is_some()
    }

    /// Idle: installs `task` as the current operation, notifies observers,
    /// and spawns a driver to run it to completion. InFlight: ignores
    /// `task` and returns the outstanding operation.
    pub fn request<F>(self: &Arc<Self>, events: Arc<dyn FeatureEvents>, task: F) -> SharedFetch
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let operation = {
            let mut slot = self.current.lock().unwrap();
            if let Some(existing) = slot.as_ref() {
                return existing.clone();
            }

            let slot_ref = Arc::clone(self);
            let completion_events = Arc::clone(&events);
            let wrapped: BoxFuture<'static, ()> = Box::pin(async move {
                task.await;
                slot_ref.clear();
                completion_events.fetch_state_changed(false);
            });

            let operation = wrapped.shared();
            *slot = Some(operation.clone());
            operation
        };

        events.fetch_state_changed(true);
        tokio::spawn(operation.clone());
        operation
    }

    /// Returns the slot to Idle.
    fn clear(&self) {
        *self.current.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::NoopEvents;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn events() -> Arc<dyn FeatureEvents> {
        Arc::new(NoopEvents)
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let slot = Arc::new(FetchSlot::new());
        assert!(!slot.is_in_flight());
        assert!(slot.current().is_none());
    }

    #[tokio::test]
    async fn test_single_flight_shares_operation() {
        let slot = Arc::new(FetchSlot::new());
        let gate = Arc::new(Notify::new());
        let first_runs = Arc::new(AtomicUsize::new(0));
        let second_runs = Arc::new(AtomicUsize::new(0));

        let op1 = {
            let gate = Arc::clone(&gate);
            let first_runs = Arc::clone(&first_runs);
            slot.request(events(), async move {
                gate.notified().await;
                first_runs.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert!(slot.is_in_flight());

        // Second request while in flight: its task must never run
        let op2 = {
            let second_runs = Arc::clone(&second_runs);
            slot.request(events(), async move {
                second_runs.fetch_add(1, Ordering::SeqCst);
            })
        };

        // notify_one stores a permit, so the order of notify vs. first
        // poll of the operation does not matter
        gate.notify_one();
        op1.await;
        op2.await;

        assert_eq!(first_runs.load(Ordering::SeqCst), 1);
        assert_eq!(second_runs.load(Ordering::SeqCst), 0);
        assert!(!slot.is_in_flight(), "slot returns to Idle");
    }

    #[tokio::test]
    async fn test_runs_without_awaiting_handle() {
        let slot = Arc::new(FetchSlot::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(Notify::new());

        {
            let runs = Arc::clone(&runs);
            let done = Arc::clone(&done);
            // Dropping the returned handle must not cancel the operation
            let _ = slot.request(events(), async move {
                runs.fetch_add(1, Ordering::SeqCst);
                done.notify_one();
            });
        }

        done.notified().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_new_operation_after_completion() {
        let slot = Arc::new(FetchSlot::new());
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let runs = Arc::clone(&runs);
            let op = slot.request(events(), async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
            op.await;
        }

        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(!slot.is_in_flight());
    }

    #[tokio::test]
    async fn test_notifies_state_changes() {
        struct Recorder {
            changes: Mutex<Vec<bool>>,
        }
        impl FeatureEvents for Recorder {
            fn fetch_state_changed(&self, in_flight: bool) {
                self.changes.lock().unwrap().push(in_flight);
            }
        }

        let recorder = Arc::new(Recorder {
            changes: Mutex::new(Vec::new()),
        });
        let slot = Arc::new(FetchSlot::new());

        // The completion notification fires inside the wrapped operation,
        // so it has happened by the time the handle resolves
        let op = slot.request(recorder.clone(), async {});
        op.await;

        assert_eq!(*recorder.changes.lock().unwrap(), vec![true, false]);
    }
}
