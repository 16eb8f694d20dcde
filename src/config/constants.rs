//! Configuration constants.
//!
//! Defaults for the throttler and the HTTP transport used by the CLI.

/// Multiplier that sets how aggressively requests are throttled.
/// Higher values are more lenient; 2 is the recommended starting point.
pub const DEFAULT_K: f64 = 2.0;

/// Width of the request history window in seconds.
/// Throttle probability is based on how the backend behaved over this window.
pub const DEFAULT_WINDOW_LENGTH_SECS: u32 = 120;

/// How often stale destination windows are swept, in seconds.
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u32 = 60;

/// A destination whose window head is more than this many window lengths old
/// is evicted by the sweeper.
pub const STALE_ENTRY_FACTOR: f64 = 2.5;

/// Status codes at or above this value count as failures by default (5xx).
pub const HTTP_STATUS_SERVER_ERROR: u16 = 500;

/// Status codes at or above this value count as failures when client errors are included (4xx).
pub const HTTP_STATUS_CLIENT_ERROR: u16 = 400;

/// Per-request timeout in seconds used by the CLI transport.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default User-Agent string for HTTP requests made by the CLI.
pub const DEFAULT_USER_AGENT: &str = concat!("throttled_fetch/", env!("CARGO_PKG_VERSION"));

/// Maximum URL length accepted by the CLI.
pub const MAX_URL_LENGTH: usize = 2048;
