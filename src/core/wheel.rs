//! # TimeWheel: public handle to a running wheel.
//!
//! A [`TimeWheel`] is a cheap, cloneable handle. All clones talk to the same
//! controller task through a bounded command channel; the controller owns the
//! ring and applies requests one at a time.
//!
//! ## Call semantics
//! - `add_task` / `remove_task` return once the controller has **applied** the
//!   request (rendezvous), so a following `remove_task` or `pending_tasks` from
//!   the same caller always observes it.
//! - Nothing returns an error: after [`TimeWheel::stop`] every operation is a
//!   silent no-op.
//! - Dropping every handle also shuts the controller down.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use timewheel::{TaskError, TaskFn, TimeWheel, WheelConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let wheel = TimeWheel::new(WheelConfig::new(10, Duration::from_millis(50)));
//!
//!     wheel
//!         .add_task_after(
//!             "greet",
//!             TaskFn::arc(|| async {
//!                 println!("hello from the wheel");
//!                 Ok::<(), TaskError>(())
//!             }),
//!             Duration::from_millis(100),
//!         )
//!         .await;
//!     assert_eq!(wheel.pending_tasks().await, vec!["greet".to_string()]);
//!
//!     wheel.remove_task("greet").await;
//!     assert!(wheel.pending_tasks().await.is_empty());
//!
//!     wheel.stop();
//!     wheel.stopped().await;
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::builder::TimeWheelBuilder;
use super::command::Command;
use super::config::WheelConfig;
use crate::tasks::TaskRef;

/// Handle to a running timer wheel.
#[derive(Clone)]
pub struct TimeWheel {
    inner: Arc<Inner>,
}

struct Inner {
    tx: mpsc::Sender<Command>,
    stop: CancellationToken,
    done: CancellationToken,
    stopped: AtomicBool,
    slot_count: usize,
    interval: Duration,
}

impl TimeWheel {
    /// Starts a wheel without subscribers.
    ///
    /// Must be called from within a tokio runtime (the controller is spawned).
    pub fn new(cfg: WheelConfig) -> Self {
        TimeWheelBuilder::new(cfg).build()
    }

    /// Returns a builder for a wheel with subscribers.
    pub fn builder(cfg: WheelConfig) -> TimeWheelBuilder {
        TimeWheelBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        tx: mpsc::Sender<Command>,
        stop: CancellationToken,
        done: CancellationToken,
        slot_count: usize,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                tx,
                stop,
                done,
                stopped: AtomicBool::new(false),
                slot_count,
                interval,
            }),
        }
    }

    /// Effective number of slots (after defaulting).
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.inner.slot_count
    }

    /// Effective tick interval (after defaulting).
    #[inline]
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Schedules `task` to fire on the tick nearest `execute_at`.
    ///
    /// The delay is quantized to whole intervals when the controller applies the
    /// request, and the task fires on the `floor(delay / interval) + 1`-th tick
    /// after that. Because ticks keep their phase from construction, this lands
    /// in `(execute_at - interval, execute_at + interval]`.
    ///
    /// Replaces any pending task registered under `key`. An instant in the past
    /// means "due now": the task fires on the next tick.
    pub async fn add_task(
        &self,
        key: impl Into<String>,
        task: TaskRef,
        execute_at: impl Into<Instant>,
    ) {
        let (cmd, acked) = self.add_command(key.into(), task, execute_at.into());
        self.submit(cmd, acked).await;
    }

    /// Schedules `task` to fire `delay` from now. See [`TimeWheel::add_task`].
    pub async fn add_task_after(&self, key: impl Into<String>, task: TaskRef, delay: Duration) {
        let execute_at = Instant::now() + delay;
        self.add_task(key, task, execute_at).await;
    }

    /// Cancels the pending task under `key`; no-op for unknown or fired keys.
    ///
    /// A callback already handed to the executor is not interrupted.
    pub async fn remove_task(&self, key: impl Into<String>) {
        let (ack, acked) = oneshot::channel();
        let cmd = Command::Remove {
            key: key.into(),
            ack,
        };
        self.submit(cmd, acked).await;
    }

    /// Returns the sorted keys of all pending tasks (empty once stopped).
    pub async fn pending_tasks(&self) -> Vec<String> {
        let (reply, keys) = oneshot::channel();
        self.submit(Command::Pending { reply }, keys)
            .await
            .unwrap_or_default()
    }

    /// Blocking variant of [`TimeWheel::add_task`] for code outside the runtime.
    ///
    /// # Panics
    /// Panics if called from within an asynchronous execution context.
    pub fn blocking_add_task(
        &self,
        key: impl Into<String>,
        task: TaskRef,
        execute_at: impl Into<Instant>,
    ) {
        let (cmd, acked) = self.add_command(key.into(), task, execute_at.into());
        self.blocking_submit(cmd, acked);
    }

    /// Blocking variant of [`TimeWheel::remove_task`] for code outside the runtime.
    ///
    /// # Panics
    /// Panics if called from within an asynchronous execution context.
    pub fn blocking_remove_task(&self, key: impl Into<String>) {
        let (ack, acked) = oneshot::channel();
        let cmd = Command::Remove {
            key: key.into(),
            ack,
        };
        self.blocking_submit(cmd, acked);
    }

    /// Stops the wheel.
    ///
    /// Idempotent and safe to call concurrently: only the first call signals the
    /// controller. Pending tasks are dropped without firing; callbacks already
    /// running are neither awaited nor cancelled.
    pub fn stop(&self) {
        if self
            .inner
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.inner.stop.cancel();
        }
    }

    /// Returns `true` once [`TimeWheel::stop`] was called or the controller exited.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire) || self.inner.done.is_cancelled()
    }

    /// Resolves once the controller loop has exited.
    pub async fn stopped(&self) {
        self.inner.done.cancelled().await;
    }

    fn add_command(
        &self,
        key: String,
        task: TaskRef,
        execute_at: Instant,
    ) -> (Command, oneshot::Receiver<()>) {
        let (ack, acked) = oneshot::channel();
        let cmd = Command::Add {
            key,
            task,
            execute_at,
            ack,
        };
        (cmd, acked)
    }

    async fn submit<T>(&self, cmd: Command, reply: oneshot::Receiver<T>) -> Option<T> {
        if self.is_stopped() {
            debug!(command = cmd.label(), "timer wheel stopped; ignoring");
            return None;
        }
        let label = cmd.label();
        if self.inner.tx.send(cmd).await.is_err() {
            debug!(command = label, "timer wheel closed; ignoring");
            return None;
        }
        reply.await.ok()
    }

    fn blocking_submit<T>(&self, cmd: Command, reply: oneshot::Receiver<T>) -> Option<T> {
        if self.is_stopped() {
            debug!(command = cmd.label(), "timer wheel stopped; ignoring");
            return None;
        }
        let label = cmd.label();
        if self.inner.tx.blocking_send(cmd).is_err() {
            debug!(command = label, "timer wheel closed; ignoring");
            return None;
        }
        reply.blocking_recv().ok()
    }
}
