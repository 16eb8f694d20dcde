//! Shared table of destination windows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::{debug, trace};

use super::window::{UpdateOutcome, Window, WindowTotals};
use crate::utils::diff_in_seconds;

/// Thread-safe map from destination key to its [`Window`].
///
/// Cloning is cheap and yields a handle to the same table. Every operation
/// takes the lock once and never holds it across an `.await`, so a plain
/// `std::sync::Mutex` is enough.
#[derive(Debug, Clone, Default)]
pub struct WindowStore {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl WindowStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a single assignment or increment, so a panic in
    // another holder cannot leave a window half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates an empty window for `key` anchored at `now` if none exists.
    ///
    /// Returns a snapshot of the window for `key`, whether new or existing.
    pub fn ensure_window(&self, key: &str, now: DateTime<Utc>, window_length: u32) -> Window {
        let mut windows = self.lock();
        windows
            .entry(key.to_string())
            .or_insert_with(|| Window::new(now, window_length))
            .clone()
    }

    /// Ensures a window exists for `key` and aggregates it at `now` under one lock.
    pub(crate) fn ensure_and_aggregate(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window_length: u32,
    ) -> WindowTotals {
        let mut windows = self.lock();
        match windows.get(key) {
            Some(window) => window.aggregate(now),
            None => {
                windows.insert(key.to_string(), Window::new(now, window_length));
                WindowTotals::default()
            }
        }
    }

    /// Records one outcome for `key` at `now`.
    ///
    /// Returns `None` without touching anything when `key` has no window.
    pub fn update(
        &self,
        key: &str,
        now: DateTime<Utc>,
        inc_request: bool,
        inc_accept: bool,
    ) -> Option<UpdateOutcome> {
        let mut windows = self.lock();
        let Some(window) = windows.get_mut(key) else {
            debug!("No window for {key}, dropping update");
            return None;
        };

        let outcome = window.update(now, inc_request, inc_accept);
        match outcome {
            UpdateOutcome::Rotated => debug!("Window for {key} rotated to {now}"),
            UpdateOutcome::Recorded(offset) => {
                trace!("Recorded outcome for {key} at offset {offset}")
            }
            UpdateOutcome::Ignored => debug!(
                "Ignoring outcome for {key} stamped {now}, before window head {}",
                window.head()
            ),
        }
        Some(outcome)
    }

    /// Request/accept totals for `key` at `now`, if it is tracked.
    pub fn aggregate(&self, key: &str, now: DateTime<Utc>) -> Option<WindowTotals> {
        self.lock().get(key).map(|window| window.aggregate(now))
    }

    /// Snapshot of the window for `key`.
    pub fn get(&self, key: &str) -> Option<Window> {
        self.lock().get(key).cloned()
    }

    /// Removes every window whose head is more than `max_age_secs` seconds before `now`.
    ///
    /// Returns how many windows were removed.
    pub fn remove_stale(&self, now: DateTime<Utc>, max_age_secs: f64) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        // i64 -> f64 is exact for any realistic age in seconds
        #[allow(clippy::cast_precision_loss)]
        windows.retain(|_, window| diff_in_seconds(now, window.head()) as f64 <= max_age_secs);
        before - windows.len()
    }

    /// Number of tracked destinations.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no destination is tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns `true` if `key` has a window.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }
}
