//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! firing. Shared state must be captured explicitly (`Arc<...>`).
//!
//! ## Example
//! ```rust
//! use timewheel::{TaskError, TaskFn, TaskRef};
//!
//! let t: TaskRef = TaskFn::arc(|| async move {
//!     // do work...
//!     Ok::<_, TaskError>(())
//! });
//! # let _ = t;
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};

/// Shared handle to a callback.
pub type TaskRef = Arc<dyn Task>;

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn spawn(&self) -> BoxTaskFuture {
        Box::pin((self.f)())
    }
}
