//! # Callback abstractions.
//!
//! - [`Task`] - trait for a zero-argument async unit of work
//! - [`TaskFn`] - closure-backed implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)

mod task;
mod task_fn;

pub use task::{BoxTaskFuture, Task};
pub use task_fn::{TaskFn, TaskRef};
