//! Adaptive throttler implementation.

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use log::debug;
use tokio_util::sync::CancellationToken;

use super::admission::{chance_of_throttle, Admission, Completion};
use super::store::WindowStore;
use super::sweeper::{max_entry_age_secs, spawn_sweeper};
use super::window::WindowTotals;
use crate::config::ThrottlerConfig;
use crate::error_handling::ConfigError;

/// Source of uniform draws in `[0, 1)`.
pub type Sampler = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Client-side adaptive throttler.
///
/// Tracks requests and acceptances per destination over a sliding window and
/// rejects new requests locally with probability
/// `max(0, (requests - K * accepts) / (requests + 1))`.
///
/// Each instance owns its own [`WindowStore`] and at most one sweeper task.
/// The sweeper starts on the first [`check`](Self::check) made inside a Tokio
/// runtime (or via [`start_sweeper`](Self::start_sweeper)) and stops on
/// [`shutdown`](Self::shutdown) or drop.
pub struct AdaptiveThrottler {
    config: ThrottlerConfig,
    store: WindowStore,
    sampler: Sampler,
    sweeper: OnceLock<CancellationToken>,
}

impl fmt::Debug for AdaptiveThrottler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveThrottler")
            .field("config", &self.config)
            .field("tracked_destinations", &self.store.len())
            .field("sweeper_running", &self.sweeper_running())
            .finish()
    }
}

impl AdaptiveThrottler {
    /// Creates a throttler with a fresh, empty store.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` is out of range.
    pub fn new(config: ThrottlerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(AdaptiveThrottler {
            config,
            store: WindowStore::new(),
            sampler: Arc::new(rand::random::<f64>),
            sweeper: OnceLock::new(),
        })
    }

    /// Replaces the random source used to sample decisions.
    pub fn with_sampler<F>(mut self, sampler: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.sampler = Arc::new(sampler);
        self
    }

    /// The configuration this throttler was built with.
    pub fn config(&self) -> &ThrottlerConfig {
        &self.config
    }

    /// The underlying window table.
    pub fn store(&self) -> &WindowStore {
        &self.store
    }

    /// Decides whether a request to `key` may proceed now.
    ///
    /// Also starts the sweeper if this is the first check made inside a
    /// Tokio runtime.
    pub fn check(&self, key: &str) -> Admission {
        if tokio::runtime::Handle::try_current().is_ok() {
            self.start_sweeper();
        }
        self.check_at(key, Utc::now())
    }

    /// Decides whether a request to `key` may proceed at `now`.
    ///
    /// A window is created for `key` if none exists, so the first check for a
    /// destination always passes. A permitted admission carries a completion
    /// that records its outcome stamped with `now`.
    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> Admission {
        let totals = self
            .store
            .ensure_and_aggregate(key, now, self.config.window_length);
        let chance = chance_of_throttle(totals, self.config.k);

        if (self.sampler)() < chance {
            debug!(
                "Throttling request to {key}: {} requests, {} accepted in window, p={chance:.3}",
                totals.requests, totals.accepts
            );
            return Admission::throttled(chance);
        }

        Admission::permitted(chance, Completion::recording(self.store.clone(), key, now))
    }

    /// Totals for `key` over the window ending at `now`, if it is tracked.
    pub fn window_totals(&self, key: &str, now: DateTime<Utc>) -> Option<WindowTotals> {
        self.store.aggregate(key, now)
    }

    /// Number of destinations currently tracked.
    pub fn tracked_destinations(&self) -> usize {
        self.store.len()
    }

    /// Runs one sweep at `now`, returning how many destinations were evicted.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        self.store
            .remove_stale(now, max_entry_age_secs(self.config.window_length))
    }

    /// Starts the periodic sweeper if it is not already running.
    ///
    /// Returns the sweeper's cancellation token. Calling this again returns
    /// the same token; once shut down, the sweeper is not restarted.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start_sweeper(&self) -> CancellationToken {
        self.sweeper
            .get_or_init(|| {
                debug!(
                    "Starting throttler sweeper every {}s",
                    self.config.cleanup_interval
                );
                spawn_sweeper(
                    self.store.clone(),
                    self.config.window_length,
                    self.config.cleanup_period(),
                )
            })
            .clone()
    }

    /// Returns `true` while a sweeper task is active.
    pub fn sweeper_running(&self) -> bool {
        self.sweeper
            .get()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Stops the sweeper task, if one was started.
    pub fn shutdown(&self) {
        if let Some(token) = self.sweeper.get() {
            token.cancel();
        }
    }
}

impl Drop for AdaptiveThrottler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
