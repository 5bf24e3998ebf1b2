//! # Runtime events emitted by the wheel.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Scheduling events**: entries entering or leaving the ring (scheduled, replaced, cancelled, fired)
//! - **Execution events**: callback failures observed by the executor
//! - **Runtime events**: controller faults, shutdown and subscriber health
//!
//! The [`Event`] struct carries metadata such as timestamps, task key, slot
//! placement and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use timewheel::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskScheduled)
//!     .with_task("session-42")
//!     .with_slot(3)
//!     .with_cycle(1);
//!
//! assert_eq!(ev.kind, EventKind::TaskScheduled);
//! assert_eq!(ev.task.as_deref(), Some("session-42"));
//! assert_eq!(ev.slot, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Scheduling events ===
    /// Task linked into the ring.
    ///
    /// Sets:
    /// - `task`: task key
    /// - `slot`: queue index
    /// - `cycle`: rotations before it is due
    TaskScheduled,

    /// A pending task was dropped because the same key was added again.
    ///
    /// Published right before the matching `TaskScheduled`.
    ///
    /// Sets:
    /// - `task`: task key
    /// - `slot`, `cycle`: placement of the **old** entry
    TaskReplaced,

    /// A pending task was cancelled by `remove_task`.
    ///
    /// Not published for unknown or already fired keys.
    ///
    /// Sets:
    /// - `task`: task key
    /// - `slot`: queue it was removed from
    TaskCancelled,

    /// Task became due and was handed to the executor.
    ///
    /// Sets:
    /// - `task`: task key
    /// - `slot`: queue it fired from
    TaskFired,

    // === Execution events ===
    /// Callback returned an error.
    ///
    /// Sets:
    /// - `task`: task key
    /// - `reason`: error message
    CallbackFailed,

    /// Callback panicked; the panic was contained to its own execution.
    ///
    /// Sets:
    /// - `task`: task key
    /// - `reason`: panic message
    CallbackPanicked,

    // === Runtime events ===
    /// Applying one controller event panicked; the loop kept running.
    ///
    /// Sets:
    /// - `task`: task key, when the event concerned one
    /// - `reason`: `"<event>: <panic message>"`
    CommandPanicked,

    /// Controller loop exited.
    ///
    /// Sets:
    /// - `reason`: `"stop_requested"` or `"handles_dropped"`
    /// - `dropped`: number of pending entries dropped without firing
    WheelStopped,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task key (or subscriber name for subscriber events).
    pub task: Option<Arc<str>>,
    /// Ring slot the event refers to.
    pub slot: Option<usize>,
    /// Remaining rotations before the entry is due.
    pub cycle: Option<u64>,
    /// Pending entries discarded at shutdown.
    pub dropped: Option<usize>,
    /// Human-readable reason (errors, panic messages, stop cause).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            slot: None,
            cycle: None,
            dropped: None,
            reason: None,
        }
    }

    /// Attaches a task key.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a slot index.
    #[inline]
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches a rotation count.
    #[inline]
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Attaches the number of entries discarded at shutdown.
    #[inline]
    pub fn with_dropped(mut self, dropped: usize) -> Self {
        self.dropped = Some(dropped);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::TaskFired);
        let b = Event::new(EventKind::TaskFired);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::new(EventKind::TaskReplaced)
            .with_task("k")
            .with_slot(4)
            .with_cycle(0)
            .with_reason("re-added");
        assert_eq!(ev.task.as_deref(), Some("k"));
        assert_eq!(ev.slot, Some(4));
        assert_eq!(ev.cycle, Some(0));
        assert_eq!(ev.reason.as_deref(), Some("re-added"));
        assert_eq!(ev.dropped, None);
    }

    #[test]
    fn stop_count_does_not_reuse_cycle() {
        let ev = Event::new(EventKind::WheelStopped)
            .with_reason("stop_requested")
            .with_dropped(3);
        assert_eq!(ev.dropped, Some(3));
        assert_eq!(ev.cycle, None);
    }

    #[test]
    fn subscriber_helpers() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.task.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));

        let ev = Event::subscriber_panicked("audit", "boom".into());
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert!(!ev.is_subscriber_overflow());
    }
}
