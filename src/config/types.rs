//! Configuration types and CLI options.
//!
//! This module defines the throttler configuration, per-request settings, and
//! the enums used for command-line argument parsing.

use std::collections::HashMap;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::constants::{
    DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_K, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    DEFAULT_WINDOW_LENGTH_SECS, HTTP_STATUS_CLIENT_ERROR, HTTP_STATUS_SERVER_ERROR,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Throttler configuration.
///
/// Immutable for the lifetime of an [`AdaptiveThrottler`](crate::AdaptiveThrottler).
/// Missing fields deserialize to their defaults, so the struct can be embedded
/// in a larger application config file.
///
/// # Examples
///
/// ```
/// use throttled_fetch::ThrottlerConfig;
///
/// let config = ThrottlerConfig {
///     k: 1.5,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.window_length, 120);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlerConfig {
    /// Leniency multiplier; throttling starts once `requests > k * accepts`
    pub k: f64,

    /// Lookback window and ring size, in seconds
    pub window_length: u32,

    /// Sweep cadence for stale destinations, in seconds
    pub cleanup_interval: u32,
}

impl Default for ThrottlerConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            window_length: DEFAULT_WINDOW_LENGTH_SECS,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

impl ThrottlerConfig {
    /// Checks that every field is in range.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(ConfigError::InvalidK(self.k));
        }
        if self.window_length == 0 {
            return Err(ConfigError::InvalidWindowLength);
        }
        if self.cleanup_interval == 0 {
            return Err(ConfigError::InvalidCleanupInterval);
        }
        Ok(())
    }

    /// Sweep cadence as a `Duration`.
    pub fn cleanup_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.cleanup_interval))
    }
}

/// Which response statuses count as a failed (not accepted) request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureThreshold {
    /// Only 5xx responses are failures (default)
    #[default]
    ServerErrors,
    /// 4xx and 5xx responses are failures
    ClientAndServerErrors,
}

impl FailureThreshold {
    /// The lowest status code treated as a failure.
    pub fn min_failure_status(self) -> u16 {
        match self {
            FailureThreshold::ServerErrors => HTTP_STATUS_SERVER_ERROR,
            FailureThreshold::ClientAndServerErrors => HTTP_STATUS_CLIENT_ERROR,
        }
    }

    /// Returns `true` if `status` counts as an accepted request.
    pub fn is_success(self, status: u16) -> bool {
        status < self.min_failure_status()
    }
}

/// Transport-agnostic description of an outgoing request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method; `None` means GET
    pub method: Option<reqwest::Method>,
    /// Extra request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
    /// Per-request timeout overriding the client default
    pub timeout: Option<Duration>,
}

/// Per-call flags for [`ThrottledClient::request`](crate::ThrottledClient::request).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSettings {
    /// Consult the throttler before sending
    pub apply_throttling: bool,
    /// Drop the query string when deriving the destination key
    pub strip_query_params: bool,
    /// Which statuses are recorded as failures
    pub failure_threshold: FailureThreshold,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            apply_throttling: true,
            strip_query_params: true,
            failure_threshold: FailureThreshold::ServerErrors,
        }
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Hit an endpoint 50 times with default throttling
/// throttled_fetch https://api.example.com/health --repeat 50
///
/// # Treat 4xx as failures and use a shorter, stricter window
/// throttled_fetch https://api.example.com/items --include-client-errors --k 1.2 --window-length 30
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "throttled_fetch",
    about = "Sends requests through a client-side adaptive throttler and reports the outcome."
)]
pub struct Opt {
    /// URLs to request
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// How many times to request each URL
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,

    /// Throttling leniency multiplier (higher is more lenient)
    #[arg(long, default_value_t = DEFAULT_K)]
    pub k: f64,

    /// History window length in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_LENGTH_SECS)]
    pub window_length: u32,

    /// Stale-entry sweep interval in seconds
    #[arg(long, default_value_t = DEFAULT_CLEANUP_INTERVAL_SECS)]
    pub cleanup_interval: u32,

    /// Keep query parameters when deriving the throttling key
    #[arg(long)]
    pub keep_query_params: bool,

    /// Count 4xx responses as failures as well as 5xx
    #[arg(long)]
    pub include_client_errors: bool,

    /// Send every request without consulting the throttler
    #[arg(long)]
    pub no_throttling: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Opt {
    /// Throttler configuration described by the flags.
    pub fn throttler_config(&self) -> ThrottlerConfig {
        ThrottlerConfig {
            k: self.k,
            window_length: self.window_length,
            cleanup_interval: self.cleanup_interval,
        }
    }

    /// Per-request settings described by the flags.
    pub fn request_settings(&self) -> RequestSettings {
        RequestSettings {
            apply_throttling: !self.no_throttling,
            strip_query_params: !self.keep_query_params,
            failure_threshold: if self.include_client_errors {
                FailureThreshold::ClientAndServerErrors
            } else {
                FailureThreshold::ServerErrors
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_throttler_config_default() {
        let config = ThrottlerConfig::default();
        assert_eq!(config.k, 2.0);
        assert_eq!(config.window_length, 120);
        assert_eq!(config.cleanup_interval, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_throttler_config_rejects_invalid_k() {
        for k in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = ThrottlerConfig {
                k,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidK(_))),
                "k = {k} should be rejected"
            );
        }
    }

    #[test]
    fn test_throttler_config_rejects_zero_lengths() {
        let config = ThrottlerConfig {
            window_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWindowLength)
        ));

        let config = ThrottlerConfig {
            cleanup_interval: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCleanupInterval)
        ));
    }

    #[test]
    fn test_throttler_config_deserializes_partial_json() {
        let config: ThrottlerConfig = serde_json::from_str(r#"{"k": 3.0}"#).unwrap();
        assert_eq!(config.k, 3.0);
        assert_eq!(config.window_length, DEFAULT_WINDOW_LENGTH_SECS);
        assert_eq!(config.cleanup_interval, DEFAULT_CLEANUP_INTERVAL_SECS);
    }

    #[test]
    fn test_failure_threshold_classification() {
        let server = FailureThreshold::ServerErrors;
        assert!(server.is_success(200));
        assert!(server.is_success(404));
        assert!(server.is_success(499));
        assert!(!server.is_success(500));
        assert!(!server.is_success(503));

        let client = FailureThreshold::ClientAndServerErrors;
        assert!(client.is_success(399));
        assert!(!client.is_success(400));
        assert!(!client.is_success(429));
        assert!(!client.is_success(500));
    }

    #[test]
    fn test_request_settings_default() {
        let settings = RequestSettings::default();
        assert!(settings.apply_throttling);
        assert!(settings.strip_query_params);
        assert_eq!(settings.failure_threshold, FailureThreshold::ServerErrors);
    }

    #[test]
    fn test_opt_maps_flags_to_settings() {
        let opt = Opt::parse_from([
            "throttled_fetch",
            "http://a.test",
            "--keep-query-params",
            "--include-client-errors",
            "--k",
            "1.5",
            "--window-length",
            "30",
        ]);
        let settings = opt.request_settings();
        assert!(settings.apply_throttling);
        assert!(!settings.strip_query_params);
        assert_eq!(
            settings.failure_threshold,
            FailureThreshold::ClientAndServerErrors
        );

        let config = opt.throttler_config();
        assert_eq!(config.k, 1.5);
        assert_eq!(config.window_length, 30);
        assert_eq!(config.cleanup_interval, DEFAULT_CLEANUP_INTERVAL_SECS);
    }
}
