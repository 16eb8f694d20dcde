//! Second-granularity time arithmetic for the throttling windows.

use chrono::{DateTime, Utc};

/// Returns the number of whole seconds from `b` to `a`, rounded to the nearest second.
///
/// Ties round up (towards positive infinity), so `1.5s` is `2` and `-1.5s` is `-1`.
/// The result is negative when `a` precedes `b`.
///
/// The value is used both as a slot offset into a window and as a staleness test.
pub fn diff_in_seconds(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    let millis = a.signed_duration_since(b).num_milliseconds();
    (millis + 500).div_euclid(1000)
}
