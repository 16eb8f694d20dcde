//! CLI application helpers.
//!
//! This module provides URL validation and outcome counting used by the
//! binary.

pub mod statistics;
pub mod url;

// Re-export public API
pub use statistics::{RunSummary, RunTotals};
pub use url::validate_url;
