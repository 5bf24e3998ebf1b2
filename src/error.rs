//! Error types reported by scheduled callbacks.
//!
//! The wheel API itself never returns errors: invalid configuration is
//! defaulted, cancelling an unknown key is a no-op and operations after
//! [`TimeWheel::stop`](crate::TimeWheel::stop) are ignored. The only failures
//! are those of the callbacks, which are isolated per execution and surfaced
//! as events ([`EventKind::CallbackFailed`](crate::EventKind::CallbackFailed),
//! [`EventKind::CallbackPanicked`](crate::EventKind::CallbackPanicked)).

use std::any::Any;

use thiserror::Error;

/// # Errors produced by a callback execution.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Callback ran and reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Callback gave up because its work no longer applies (e.g. the target is gone).
    #[error("execution skipped: {reason}")]
    Skipped {
        /// Why the work was skipped.
        reason: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use timewheel::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Skipped { .. } => "task_skipped",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Skipped { reason } => format!("skipped: {reason}"),
        }
    }
}

/// Extracts a printable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
