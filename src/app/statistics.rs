//! Outcome counting for CLI runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;

use crate::config::FailureThreshold;
use crate::error_handling::FetchError;

/// Counts request outcomes across concurrently running URL tasks.
#[derive(Debug, Default)]
pub struct RunSummary {
    succeeded: AtomicUsize,
    failed_status: AtomicUsize,
    transport_errors: AtomicUsize,
    throttled: AtomicUsize,
    cancelled: AtomicUsize,
}

/// Point-in-time copy of a [`RunSummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    /// Responses below the failure threshold
    pub succeeded: usize,
    /// Responses at or above the failure threshold
    pub failed_status: usize,
    /// Requests that failed in the transport
    pub transport_errors: usize,
    /// Requests rejected locally
    pub throttled: usize,
    /// Requests cancelled before completion
    pub cancelled: usize,
}

impl RunTotals {
    /// All requests, sent or not.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed_status + self.transport_errors + self.throttled + self.cancelled
    }
}

impl RunSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a response.
    pub fn record_status(&self, status: u16, threshold: FailureThreshold) {
        if threshold.is_success(status) {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_status.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records an error returned by the request wrapper.
    pub fn record_error(&self, error: &FetchError) {
        let counter = match error {
            FetchError::Throttled { .. } => &self.throttled,
            FetchError::Cancelled => &self.cancelled,
            FetchError::Transport(_) => &self.transport_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counts.
    pub fn totals(&self) -> RunTotals {
        RunTotals {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed_status: self.failed_status.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }

    /// Logs the final counts at `info`.
    pub fn log(&self, elapsed_seconds: f64) {
        let t = self.totals();
        info!(
            "Run finished in {elapsed_seconds:.1}s: total={}, succeeded={}, failed_status={}, transport_errors={}, throttled={}, cancelled={}",
            t.total(),
            t.succeeded,
            t.failed_status,
            t.transport_errors,
            t.throttled,
            t.cancelled
        );
    }
}
