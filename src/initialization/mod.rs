//! Application initialization.
//!
//! This module provides functions to set up the logger and the HTTP client
//! used by the CLI. Both return proper error types for error handling.

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
