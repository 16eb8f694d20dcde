//! Per-destination ring of per-second request counters.

use chrono::{DateTime, Utc};

use crate::utils::diff_in_seconds;

/// Outcomes recorded during one calendar second.
///
/// `timestamp == None` means the slot has never been written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSlot {
    /// Admitted requests recorded in this slot
    pub request_count: u64,
    /// Requests that were accepted by the backend
    pub accept_count: u64,
    /// When the slot was last written
    pub timestamp: Option<DateTime<Utc>>,
}

impl WindowSlot {
    /// Returns `true` if the slot was written less than `window_length` seconds before `now`.
    fn is_live(&self, now: DateTime<Utc>, window_length: i64) -> bool {
        self.timestamp
            .is_some_and(|t| diff_in_seconds(now, t) < window_length)
    }
}

/// Request and accept totals over the live part of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowTotals {
    /// Admitted requests
    pub requests: u64,
    /// Accepted requests
    pub accepts: u64,
}

/// What an update did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// `now` was a full window past the head; slot 0 was overwritten and the head moved.
    Rotated,
    /// The slot at this offset from the head was incremented.
    Recorded(usize),
    /// `now` precedes the head; nothing was written.
    Ignored,
}

/// Fixed-length ring of per-second slots anchored at `head`.
///
/// Slot `i` stands for the second `head + i`. Slots are never cleared in bulk;
/// an old slot stops counting once its timestamp falls out of the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    head: DateTime<Utc>,
    slots: Box<[WindowSlot]>,
}

impl Window {
    /// Creates an empty window anchored at `now`.
    ///
    /// `window_length` is clamped to at least one slot.
    pub fn new(now: DateTime<Utc>, window_length: u32) -> Self {
        let len = window_length.max(1) as usize;
        Window {
            head: now,
            slots: vec![WindowSlot::default(); len].into_boxed_slice(),
        }
    }

    /// The instant slot 0 stands for.
    pub fn head(&self) -> DateTime<Utc> {
        self.head
    }

    /// All slots, in order from the head.
    pub fn slots(&self) -> &[WindowSlot] {
        &self.slots
    }

    /// Window length in seconds (the number of slots).
    pub fn window_length(&self) -> usize {
        self.slots.len()
    }

    fn window_length_secs(&self) -> i64 {
        i64::try_from(self.slots.len()).unwrap_or(i64::MAX)
    }

    /// Sums every slot written less than one window length before `now`.
    ///
    /// Slots that were never written or whose timestamp is at least
    /// `window_length` seconds old contribute nothing. `now` may be before,
    /// at, or long after the head.
    pub fn aggregate(&self, now: DateTime<Utc>) -> WindowTotals {
        let window_length = self.window_length_secs();
        self.slots
            .iter()
            .filter(|slot| slot.is_live(now, window_length))
            .fold(WindowTotals::default(), |acc, slot| WindowTotals {
                requests: acc.requests + slot.request_count,
                accepts: acc.accepts + slot.accept_count,
            })
    }

    /// Records one outcome at `now`.
    ///
    /// - At or beyond one window length past the head, slot 0 is overwritten
    ///   with just this outcome and the head moves to `now`. Other slots are
    ///   left as they are; their timestamps exclude them from aggregation.
    /// - Inside the window, the slot at `now - head` is incremented and
    ///   re-stamped. Counts already in that slot are kept unless they were
    ///   written a full window before `now`, in which case they no longer
    ///   count and the slot starts from zero.
    /// - Before the head, nothing is written.
    pub fn update(
        &mut self,
        now: DateTime<Utc>,
        inc_request: bool,
        inc_accept: bool,
    ) -> UpdateOutcome {
        let window_length = self.window_length_secs();
        let offset = diff_in_seconds(now, self.head);

        if offset >= window_length {
            self.slots[0] = WindowSlot {
                request_count: u64::from(inc_request),
                accept_count: u64::from(inc_accept),
                timestamp: Some(now),
            };
            self.head = now;
            return UpdateOutcome::Rotated;
        }

        let Ok(index) = usize::try_from(offset) else {
            return UpdateOutcome::Ignored;
        };

        let slot = &mut self.slots[index];
        if !slot.is_live(now, window_length) {
            slot.request_count = 0;
            slot.accept_count = 0;
        }
        slot.request_count += u64::from(inc_request);
        slot.accept_count += u64::from(inc_accept);
        slot.timestamp = Some(now);
        UpdateOutcome::Recorded(index)
    }
}
