//! Utility functions shared by the throttler and the request wrapper.
//!
//! This module provides:
//! - Second-granularity time differences
//! - Destination key derivation from URLs

pub mod sanitize;
mod timing;

pub use sanitize::strip_query_params;
pub use timing::diff_in_seconds;
