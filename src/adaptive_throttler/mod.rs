//! Client-side adaptive throttling.
//!
//! Keeps, per destination, a ring of per-second counters covering the last
//! `window_length` seconds and rejects new requests locally with probability
//!
//! ```text
//! max(0, (requests - K * accepts) / (requests + 1))
//! ```
//!
//! - Counters are recorded only for admitted requests, stamped with the
//!   second they were admitted
//! - Slots older than one window are ignored at read time rather than cleared
//! - A background sweeper evicts destinations idle for more than 2.5 windows
//!
//! This backs off a struggling backend without any server cooperation while
//! letting a healthy one through untouched.

mod admission;
mod store;
mod sweeper;
mod throttler;
mod window;

pub use admission::{chance_of_throttle, Admission, Completion};
pub use store::WindowStore;
pub use throttler::{AdaptiveThrottler, Sampler};
pub use window::{UpdateOutcome, Window, WindowSlot, WindowTotals};
