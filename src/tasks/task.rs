//! # Callback abstraction.
//!
//! A [`Task`] is the opaque unit of work the wheel fires. Each firing calls
//! [`Task::spawn`] once and drives the returned future on its own detached
//! tokio task; the wheel never awaits it.

use std::future::Future;
use std::pin::Pin;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// # Zero-argument unit of work fired by the wheel.
///
/// Implementations must be cheap to call: `spawn` only builds the future, the
/// actual work happens when the executor polls it.
///
/// # Example
/// ```
/// use timewheel::{BoxTaskFuture, Task};
///
/// struct Ping;
///
/// impl Task for Ping {
///     fn spawn(&self) -> BoxTaskFuture {
///         Box::pin(async {
///             // do work...
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Creates the future for one execution.
    fn spawn(&self) -> BoxTaskFuture;
}
