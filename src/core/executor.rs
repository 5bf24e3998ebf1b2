//! # Detached callback execution.
//!
//! [`Executor::fire`] hands one due callback to its own tokio task and returns
//! immediately, so the controller is never blocked by callback duration.
//!
//! ## Rules
//! - One spawned task per firing; no `JoinHandle` is kept (fire-and-forget).
//! - Each execution has its own panic boundary; a panic or `Err` is published
//!   on the bus and goes no further.
//! - `Task::spawn` is called inside the boundary, so a callback that panics
//!   while building its future is contained too.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskRef;

pub(crate) struct Executor {
    bus: Bus,
}

impl Executor {
    pub(crate) fn new(bus: Bus) -> Self {
        Self { bus }
    }

    /// Runs `task` on a detached tokio task.
    pub(crate) fn fire(&self, key: String, task: TaskRef) {
        let bus = self.bus.clone();
        tokio::spawn(async move {
            let run = AssertUnwindSafe(async { task.spawn().await }).catch_unwind();
            match run.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => bus.publish(
                    Event::new(EventKind::CallbackFailed)
                        .with_task(key)
                        .with_reason(e.to_string()),
                ),
                Err(panic) => bus.publish(
                    Event::new(EventKind::CallbackPanicked)
                        .with_task(key)
                        .with_reason(panic_message(&*panic)),
                ),
            }
        });
    }
}
