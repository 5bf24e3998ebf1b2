//! Requests carried from [`TimeWheel`](crate::TimeWheel) handles to the controller.
//!
//! Every command carries a `oneshot` sender. The controller answers once the
//! command has been applied, which is what makes `add_task`/`remove_task` a
//! rendezvous rather than a fire-and-forget enqueue. If the controller is gone
//! the sender is dropped and the caller returns without effect.

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::tasks::TaskRef;

pub(crate) enum Command {
    /// Insert or replace `key`, due at `execute_at`.
    ///
    /// The delay is measured when the controller applies the command, against
    /// the cursor it holds at that moment.
    Add {
        key: String,
        task: TaskRef,
        execute_at: Instant,
        ack: oneshot::Sender<()>,
    },
    /// Cancel `key` if it is still pending.
    Remove {
        key: String,
        ack: oneshot::Sender<()>,
    },
    /// Sorted keys of all pending entries.
    Pending { reply: oneshot::Sender<Vec<String>> },
}

impl Command {
    /// Short label used in logs and `CommandPanicked` events.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Remove { .. } => "remove",
            Command::Pending { .. } => "pending",
        }
    }

    /// Task key the command refers to, if any.
    pub(crate) fn key(&self) -> Option<&str> {
        match self {
            Command::Add { key, .. } | Command::Remove { key, .. } => Some(key.as_str()),
            Command::Pending { .. } => None,
        }
    }
}
