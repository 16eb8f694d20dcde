//! Background eviction of inactive destinations.

use std::time::Duration;

use chrono::Utc;
use log::{debug, info};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

use super::store::WindowStore;
use crate::config::STALE_ENTRY_FACTOR;

/// Age in seconds past which a window head counts as inactive.
pub(crate) fn max_entry_age_secs(window_length: u32) -> f64 {
    STALE_ENTRY_FACTOR * f64::from(window_length)
}

/// Spawns the sweeper loop on the current Tokio runtime.
///
/// Every `period` the loop removes windows whose head is more than
/// `2.5 * window_length` seconds old. The first sweep happens one period
/// after start. Cancel the returned token to stop the loop.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub(crate) fn spawn_sweeper(
    store: WindowStore,
    window_length: u32,
    period: Duration,
) -> CancellationToken {
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();
    let max_age = max_entry_age_secs(window_length);
    let mut ticker = interval_at(Instant::now() + period, period);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = store.remove_stale(Utc::now(), max_age);
                    if evicted > 0 {
                        info!(
                            "Throttler sweeper evicted {} inactive destination{} ({} still tracked)",
                            evicted,
                            if evicted == 1 { "" } else { "s" },
                            store.len()
                        );
                    }
                }
                _ = shutdown_clone.cancelled() => {
                    debug!("Throttler sweeper shutting down");
                    break;
                }
            }
        }
    });

    shutdown
}
