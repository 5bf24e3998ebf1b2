//! # Wheel configuration.
//!
//! Provides [`WheelConfig`], the construction settings for a [`TimeWheel`](crate::TimeWheel).
//!
//! ## Sentinel values
//! - `slot_count = 0` → [`DEFAULT_SLOT_COUNT`]
//! - `interval = 0s` → [`DEFAULT_INTERVAL`]
//! - `command_capacity = 0`, `bus_capacity = 0` → clamped to 1
//!
//! Invalid values are never reported as errors; they are replaced silently.

use std::time::Duration;

/// Slot count used when `slot_count` is zero.
pub const DEFAULT_SLOT_COUNT: usize = 10;

/// Tick interval used when `interval` is zero.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Construction settings for the wheel.
///
/// ## Field semantics
/// - `slot_count`: number of queues in the ring (`0` = default)
/// - `interval`: time covered by one slot, i.e. tick period (`0s` = default)
/// - `command_capacity`: bound of the command channel feeding the controller (min 1)
/// - `bus_capacity`: event bus ring buffer size (min 1)
///
/// ## Notes
/// All fields are public. Read them through the sanitizing accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct WheelConfig {
    /// Number of slots in the ring.
    ///
    /// Delays longer than `slot_count × interval` are represented with rotation counts.
    pub slot_count: usize,

    /// Duration of one slot; the wheel advances one slot per `interval`.
    ///
    /// This is also the firing granularity: a task fires less than one interval
    /// early and at most one interval late.
    pub interval: Duration,

    /// Capacity of the command channel.
    ///
    /// Callers of `add_task`/`remove_task` wait for the controller to apply their
    /// request either way; this only bounds how many requests may queue up.
    pub command_capacity: usize,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,
}

impl WheelConfig {
    /// Creates a config with the given slot count and interval, defaults elsewhere.
    pub fn new(slot_count: usize, interval: Duration) -> Self {
        Self {
            slot_count,
            interval,
            ..Self::default()
        }
    }

    /// Returns the slot count, falling back to [`DEFAULT_SLOT_COUNT`] for `0`.
    #[inline]
    pub fn slot_count_or_default(&self) -> usize {
        if self.slot_count == 0 {
            DEFAULT_SLOT_COUNT
        } else {
            self.slot_count
        }
    }

    /// Returns the interval, falling back to [`DEFAULT_INTERVAL`] for `0s`.
    #[inline]
    pub fn interval_or_default(&self) -> Duration {
        if self.interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            self.interval
        }
    }

    /// Returns the command channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn command_capacity_clamped(&self) -> usize {
        self.command_capacity.max(1)
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for WheelConfig {
    /// Default configuration:
    ///
    /// - `slot_count = 10`
    /// - `interval = 1s`
    /// - `command_capacity = 1` (closest to a rendezvous)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            interval: DEFAULT_INTERVAL,
            command_capacity: 1,
            bus_capacity: 1024,
        }
    }
}
