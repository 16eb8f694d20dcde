//! Throttler configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, status thresholds)
//! - Throttler and per-request configuration types
//! - CLI option types and parsing

mod constants;
mod types;

pub use constants::*;
pub use types::{
    FailureThreshold, LogFormat, LogLevel, Opt, RequestOptions, RequestSettings, ThrottlerConfig,
};
