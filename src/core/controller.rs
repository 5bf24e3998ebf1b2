//! # Controller: the single owner of wheel state.
//!
//! The controller runs as one tokio task and is the only code that touches the
//! [`SlotRing`], its registry and the cursor. Everything else talks to it through
//! [`Command`]s, so no locks guard that state.
//!
//! ## Loop
//! ```text
//! loop {
//!   select! (biased) {
//!     stop token cancelled ─► break (Stopped)
//!     ticker.tick()        ─► guarded(tick)     ─► ring.advance(fire)
//!     rx.recv()            ─► guarded(command)  ─► add / remove / pending
//!                 None     ─► break (all handles dropped)
//!   }
//! }
//! publish WheelStopped; drop ring (pending entries never fire)
//! ```
//!
//! ## Rules
//! - Each event is applied inside its **own** panic boundary; a panic while
//!   applying one event is published as `CommandPanicked` and the loop goes on.
//! - Stop leaves the loop for good. The ticker is owned by the loop and is
//!   dropped with it; nothing keeps polling a closed stop signal.
//! - The first tick comes one `interval` after the loop starts.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::command::Command;
use super::executor::Executor;
use super::ring::SlotRing;
use super::schedule;
use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskRef;

pub(crate) struct Controller {
    ring: SlotRing<String, TaskRef>,
    interval: Duration,
    executor: Executor,
    bus: Bus,
}

impl Controller {
    /// Creates a controller; `slot_count` and `interval` must already be sanitized.
    pub(crate) fn new(slot_count: usize, interval: Duration, bus: Bus) -> Self {
        Self {
            ring: SlotRing::new(slot_count),
            interval,
            executor: Executor::new(bus.clone()),
            bus,
        }
    }

    /// Runs until `stop` is cancelled or every command sender is dropped.
    ///
    /// `done` is cancelled when this future finishes, including by panic.
    pub(crate) async fn run(
        mut self,
        mut rx: mpsc::Receiver<Command>,
        stop: CancellationToken,
        done: CancellationToken,
    ) {
        let _done = done.drop_guard();
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);

        let reason = loop {
            tokio::select! {
                biased;

                _ = stop.cancelled() => break "stop_requested",

                _ = ticker.tick() => self.guarded("tick", None, |c| c.tick()),

                cmd = rx.recv() => match cmd {
                    Some(cmd) => {
                        let label = cmd.label();
                        let key = cmd.key().map(str::to_owned);
                        self.guarded(label, key, move |c| c.apply(cmd));
                    }
                    None => break "handles_dropped",
                },
            }
        };

        // Buffered commands are dropped with `rx`; their callers see the ack
        // sender vanish and return without effect.
        rx.close();
        let dropped = self.ring.len();
        debug!(reason, dropped, "timer wheel stopped");
        self.bus.publish(
            Event::new(EventKind::WheelStopped)
                .with_reason(reason)
                .with_dropped(dropped),
        );
    }

    /// Applies `f` inside its own panic boundary.
    fn guarded(&mut self, label: &'static str, key: Option<String>, f: impl FnOnce(&mut Self)) {
        let Err(panic) = catch_unwind(AssertUnwindSafe(|| f(self))) else {
            return;
        };
        let info = panic_message(&*panic);
        error!(event = label, task = ?key, "controller event panicked: {info}");

        let mut ev = Event::new(EventKind::CommandPanicked).with_reason(format!("{label}: {info}"));
        if let Some(key) = key {
            ev = ev.with_task(key);
        }
        self.bus.publish(ev);
    }

    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Add {
                key,
                task,
                execute_at,
                ack,
            } => {
                let delay = execute_at.saturating_duration_since(Instant::now());
                self.add(key, task, schedule::total_slots(delay, self.interval));
                let _ = ack.send(());
            }
            Command::Remove { key, ack } => {
                self.remove(&key);
                let _ = ack.send(());
            }
            Command::Pending { reply } => {
                let mut keys: Vec<String> = self.ring.keys().cloned().collect();
                keys.sort_unstable();
                let _ = reply.send(keys);
            }
        }
    }

    fn add(&mut self, key: String, task: TaskRef, total_slots: u64) {
        let inserted = self.ring.insert(key.clone(), task, total_slots);
        if let Some(old) = inserted.replaced {
            self.bus.publish(
                Event::new(EventKind::TaskReplaced)
                    .with_task(old.key.as_str())
                    .with_slot(old.slot)
                    .with_cycle(old.cycle),
            );
        }
        self.bus.publish(
            Event::new(EventKind::TaskScheduled)
                .with_task(key)
                .with_slot(inserted.placement.slot)
                .with_cycle(inserted.placement.cycle),
        );
    }

    fn remove(&mut self, key: &str) {
        if let Some(old) = self.ring.remove(key) {
            self.bus.publish(
                Event::new(EventKind::TaskCancelled)
                    .with_task(old.key.as_str())
                    .with_slot(old.slot),
            );
        }
    }

    fn tick(&mut self) {
        let executor = &self.executor;
        let bus = &self.bus;
        self.ring.advance(|entry| {
            bus.publish(
                Event::new(EventKind::TaskFired)
                    .with_task(entry.key.as_str())
                    .with_slot(entry.slot),
            );
            executor.fire(entry.key, entry.task);
        });
    }
}
