//! throttled_fetch library: client-side adaptive request throttling
//!
//! Tracks, per destination, how many recent requests were sent and how many
//! the backend accepted, and rejects new requests locally once the ratio
//! degrades. The backend needs no cooperation; a struggling server simply
//! sees less traffic from this client until it recovers.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use throttled_fetch::{
//!     AdaptiveThrottler, ReqwestTransport, RequestOptions, RequestSettings, ThrottledClient,
//!     ThrottlerConfig,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let throttler = Arc::new(AdaptiveThrottler::new(ThrottlerConfig::default())?);
//! let transport = ReqwestTransport::new(Arc::new(reqwest::Client::new()));
//! let client = ThrottledClient::new(throttler, transport);
//!
//! match client
//!     .request("https://api.example.com/items?page=1", &RequestOptions::default(), RequestSettings::default())
//!     .await
//! {
//!     Ok(response) => println!("status {}", response.status()),
//!     Err(e) if e.is_throttled() => println!("backing off: {e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The lower-level admission API can gate any operation, not just HTTP:
//!
//! ```
//! use throttled_fetch::{AdaptiveThrottler, ThrottlerConfig};
//!
//! let throttler = AdaptiveThrottler::new(ThrottlerConfig::default()).unwrap();
//! let admission = throttler.check("billing-service");
//! if !admission.is_throttled() {
//!     let succeeded = true; // perform the call here
//!     admission.complete(succeeded);
//! }
//! ```
//!
//! # Requirements
//!
//! The background sweeper and the request wrapper need a Tokio runtime.
//! Admission checks made outside a runtime work, but no sweeper is started.

#![warn(missing_docs)]

mod adaptive_throttler;
pub mod app;
pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
pub mod utils;

// Re-export public API
pub use adaptive_throttler::{
    chance_of_throttle, AdaptiveThrottler, Admission, Completion, Sampler, UpdateOutcome, Window,
    WindowSlot, WindowStore, WindowTotals,
};
pub use config::{FailureThreshold, RequestOptions, RequestSettings, ThrottlerConfig};
pub use error_handling::{ConfigError, FetchError, InitializationError, TransportError};
pub use fetch::{
    transport_fn, FnTransport, ReqwestTransport, ResponseStatus, ThrottledClient, Transport,
};
