//! Throttled HTTP fetching.
//!
//! This module provides:
//! - The [`Transport`] seam for the underlying request function
//! - A `reqwest`-backed transport
//! - [`ThrottledClient`], which consults the throttler before each request
//!   and reports the outcome afterwards

mod client;
mod transport;

pub use client::ThrottledClient;
pub use transport::{transport_fn, FnTransport, ReqwestTransport, ResponseStatus, Transport};
