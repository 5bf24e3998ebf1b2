//! # Non-blocking event fan-out to multiple subscribers.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//!
//! Workers exit once the set is dropped (their queues close).
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::error::panic_message;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub(crate) fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let bus_for_worker = bus.clone();

            tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await
                    {
                        bus_for_worker.publish(Event::subscriber_panicked(
                            sub.name(),
                            panic_message(&*panic_err),
                        ));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
        }
        Self { channels, bus }
    }

    /// Emits a pre-allocated `Arc<Event>` to all subscribers.
    ///
    /// `SubscriberOverflow` events that themselves overflow are not re-published.
    pub(crate) fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = event.is_subscriber_overflow();

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow_evt {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
