//! Throttle probability and the one-shot admission result.

use chrono::{DateTime, Utc};
use log::debug;

use super::store::WindowStore;
use super::window::WindowTotals;

/// Probability of rejecting the next request given recent totals.
///
/// `max(0, (requests - k * accepts) / (requests + 1))`
///
/// A healthy backend (`accepts` close to `requests`) stays at zero for any
/// `k >= 1`; as failures pile up the value approaches 1. The `+ 1` keeps an
/// empty history at zero and leans towards letting traffic through while
/// history is sparse.
///
/// # Examples
///
/// ```
/// use throttled_fetch::{chance_of_throttle, WindowTotals};
///
/// let healthy = WindowTotals { requests: 10, accepts: 10 };
/// assert_eq!(chance_of_throttle(healthy, 2.0), 0.0);
///
/// let failing = WindowTotals { requests: 2, accepts: 0 };
/// assert!((chance_of_throttle(failing, 2.0) - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn chance_of_throttle(totals: WindowTotals, k: f64) -> f64 {
    // Counts stay far below 2^53, so the conversions are exact
    #[allow(clippy::cast_precision_loss)]
    let (requests, accepts) = (totals.requests as f64, totals.accepts as f64);
    ((requests - k * accepts) / (requests + 1.0)).max(0.0)
}

/// Where and when an admitted request will be recorded.
#[derive(Debug)]
struct PendingRecord {
    store: WindowStore,
    key: String,
    admitted_at: DateTime<Utc>,
}

/// One-shot handle for reporting the outcome of an admitted request.
///
/// Consuming `self` means an outcome is recorded at most once. A handle from a
/// throttled admission records nothing. Dropping a handle without calling
/// [`complete`](Self::complete) or [`abandon`](Self::abandon) also records
/// nothing, which leaves that request uncounted.
#[derive(Debug)]
#[must_use = "report the request outcome with `complete` or discard it with `abandon`"]
pub struct Completion {
    pending: Option<PendingRecord>,
}

impl Completion {
    pub(crate) fn noop() -> Self {
        Completion { pending: None }
    }

    pub(crate) fn recording(store: WindowStore, key: &str, admitted_at: DateTime<Utc>) -> Self {
        Completion {
            pending: Some(PendingRecord {
                store,
                key: key.to_string(),
                admitted_at,
            }),
        }
    }

    /// Returns `true` if completing this handle records nothing.
    pub fn is_noop(&self) -> bool {
        self.pending.is_none()
    }

    /// Records one request, and one acceptance if `success`.
    ///
    /// The outcome is stamped with the admission time, not the completion time.
    pub fn complete(mut self, success: bool) {
        if let Some(record) = self.pending.take() {
            record
                .store
                .update(&record.key, record.admitted_at, true, success);
        }
    }

    /// Discards the handle without recording anything.
    ///
    /// Used when the caller aborted the request itself, so the backend's
    /// statistics are not affected.
    pub fn abandon(mut self) {
        if let Some(record) = self.pending.take() {
            debug!("Outcome for {} abandoned, not recorded", record.key);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(record) = self.pending.take() {
            debug!(
                "Completion for {} admitted at {} dropped without an outcome",
                record.key, record.admitted_at
            );
        }
    }
}

/// Result of an admission check.
#[derive(Debug)]
#[must_use = "a permitted admission must be completed once the request finishes"]
pub struct Admission {
    throttled: bool,
    chance_of_throttle: f64,
    completion: Completion,
}

impl Admission {
    pub(crate) fn throttled(chance_of_throttle: f64) -> Self {
        Admission {
            throttled: true,
            chance_of_throttle,
            completion: Completion::noop(),
        }
    }

    pub(crate) fn permitted(chance_of_throttle: f64, completion: Completion) -> Self {
        Admission {
            throttled: false,
            chance_of_throttle,
            completion,
        }
    }

    /// Returns `true` if the request must not be attempted.
    pub fn is_throttled(&self) -> bool {
        self.throttled
    }

    /// The rejection probability the decision was sampled against.
    pub fn chance_of_throttle(&self) -> f64 {
        self.chance_of_throttle
    }

    /// Takes the completion handle. It is a no-op when throttled.
    pub fn into_completion(self) -> Completion {
        self.completion
    }

    /// Shorthand for `into_completion().complete(success)`.
    pub fn complete(self, success: bool) {
        self.completion.complete(success);
    }
}
