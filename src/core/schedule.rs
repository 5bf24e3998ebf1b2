//! Slot/rotation arithmetic for placing a task on the ring.
//!
//! A delay is first quantized to whole ticks (`total_slots`), on the caller's
//! side, against the interval. The controller then places it relative to the
//! cursor it holds at insertion time:
//!
//! ```text
//! total_slots = floor(delay / interval)
//! slot        = (cursor + total_slots) mod N
//! cycle       = floor(total_slots / N)
//! ```
//!
//! Placement is never recomputed when the task fires, so re-inserting the same
//! delay repeatedly cannot drift.

use std::time::Duration;

/// Where a task lands on the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    /// Queue index in `[0, N)`.
    pub slot: usize,
    /// Full rotations that must pass before the entry is due.
    pub cycle: u64,
}

/// Whole ticks contained in `delay`; saturates at `u64::MAX`.
///
/// A zero `interval` is treated as one nanosecond so the division is defined;
/// callers pass the sanitized interval from the config.
pub(crate) fn total_slots(delay: Duration, interval: Duration) -> u64 {
    let ticks = delay.as_nanos() / interval.as_nanos().max(1);
    u64::try_from(ticks).unwrap_or(u64::MAX)
}

/// Computes the queue and rotation count for `total_slots` from `cursor`.
pub(crate) fn placement(cursor: usize, total_slots: u64, slot_count: usize) -> Placement {
    let n = slot_count.max(1) as u64;
    let slot = ((cursor as u64 % n) + (total_slots % n)) % n;
    Placement {
        slot: slot as usize,
        cycle: total_slots / n,
    }
}
