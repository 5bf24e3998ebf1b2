//! # timewheel
//!
//! **timewheel** is a hashed timer wheel for tokio.
//!
//! It schedules keyed, one-shot async callbacks at approximate future instants
//! with O(1) insert, cancel and per-tick work. Precision is one tick: ticks keep
//! the phase they had at construction, so a task fires within
//! `(execute_at - interval, execute_at + interval]` of its requested instant.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────┐ ┌────────────┐ ┌────────────┐
//!   │ TimeWheel  │ │ TimeWheel  │ │ TimeWheel  │   (cloned handles, any task)
//!   └─────┬──────┘ └─────┬──────┘ └─────┬──────┘
//!         │ add / remove / pending (rendezvous, oneshot ack)
//!         ▼              ▼              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Controller (single tokio task, sole owner of the state)     │
//! │  - SlotRing: N slot queues + key registry + cursor           │
//! │  - ticker (interval_at now + interval)                       │
//! │  - per-event panic boundary ─► CommandPanicked               │
//! └──────┬─────────────────────────────────────────────┬─────────┘
//!        │ due entries                                 │ publishes
//!        ▼                                             │ TaskScheduled
//! ┌──────────────────────┐                             │ TaskReplaced
//! │ Executor             │                             │ TaskCancelled
//! │ tokio::spawn per     │── CallbackFailed ──────┐    │ TaskFired
//! │ callback,            │── CallbackPanicked ────┤    │ WheelStopped
//! │ catch_unwind         │                        ▼    ▼
//! └──────────────────────┘     ┌──────────────────────────────────┐
//!                              │      Bus (broadcast channel)     │
//!                              │  (capacity: WheelConfig::bus_…)  │
//!                              └────────────────┬─────────────────┘
//!                                               ▼
//!                                  ┌────────────────────────┐
//!                                  │  subscriber_listener   │
//!                                  └───────────┬────────────┘
//!                                              ▼
//!                                        SubscriberSet
//!                                     (per-sub queues)
//!                                   ┌─────────┼─────────┐
//!                                   ▼         ▼         ▼
//!                               sub1.on   sub2.on   subN.on
//!                                _event()  _event()  _event()
//! ```
//!
//! ### Tick
//! ```text
//! every interval:
//!   for entry in slot[cursor]:
//!     ├─ cycle > 0 ─► cycle -= 1, stays
//!     └─ cycle = 0 ─► unlink, unregister, publish TaskFired, Executor::fire
//!   cursor = (cursor + 1) mod N
//!
//! add(key, at), measured when the controller applies it:
//!   total = floor((at - now) / interval)    (0 when at is in the past)
//!   slot  = (cursor + total) mod N,  cycle = floor(total / N)
//!   fires after total + 1 ticks
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                 |
//! |-------------------|-----------------------------------------------------------------|------------------------------------|
//! | **Scheduling**    | Keyed add / replace / cancel, pending snapshot, stop.           | [`TimeWheel`], [`TimeWheelBuilder`] |
//! | **Tasks**         | Define callbacks as closures or trait objects.                  | [`Task`], [`TaskFn`], [`TaskRef`]  |
//! | **Subscriber API**| Observe scheduling, callback failures and shutdown.             | [`Subscribe`], [`Event`]           |
//! | **Errors**        | Typed callback outcomes.                                        | [`TaskError`]                      |
//! | **Configuration** | Slot count, tick interval, channel capacities.                  | [`WheelConfig`]                    |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] that forwards events to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use timewheel::{TaskError, TaskFn, TaskRef, TimeWheel, WheelConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn timewheel::Subscribe>> = vec![Arc::new(timewheel::LogWriter)];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn timewheel::Subscribe>> = Vec::new();
//!
//!     let wheel = TimeWheel::builder(WheelConfig::new(8, Duration::from_millis(20)))
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let (tx, rx) = tokio::sync::oneshot::channel();
//!     let tx = Arc::new(std::sync::Mutex::new(Some(tx)));
//!     let ping: TaskRef = TaskFn::arc(move || {
//!         let tx = tx.clone();
//!         async move {
//!             if let Some(tx) = tx.lock().unwrap().take() {
//!                 let _ = tx.send(());
//!             }
//!             Ok::<(), TaskError>(())
//!         }
//!     });
//!
//!     wheel.add_task_after("ping", ping, Duration::from_millis(50)).await;
//!     rx.await.unwrap();
//!
//!     wheel.stop();
//!     wheel.stopped().await;
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{DEFAULT_INTERVAL, DEFAULT_SLOT_COUNT, TimeWheel, TimeWheelBuilder, WheelConfig};
pub use error::TaskError;
pub use events::{Event, EventKind};
pub use subscribers::Subscribe;
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRef};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
