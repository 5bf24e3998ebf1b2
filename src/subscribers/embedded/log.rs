//! # LogWriter: event printer
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing`.
//! Use it for tests or demos; install a `tracing` subscriber to see output.
//!
//! ## Example output
//! ```text
//! [scheduled] task="a" slot=2 cycle=0
//! [replaced] task="b" slot=4 cycle=0
//! [fired] task="a" slot=2
//! [callback-failed] task="b" err="execution failed: boom"
//! [stopped] reason="stop_requested" dropped=1
//! ```

use async_trait::async_trait;
use tracing::{info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::TaskScheduled => {
                info!("[scheduled] task={task:?} slot={:?} cycle={:?}", e.slot, e.cycle);
            }
            EventKind::TaskReplaced => {
                info!("[replaced] task={task:?} slot={:?} cycle={:?}", e.slot, e.cycle);
            }
            EventKind::TaskCancelled => {
                info!("[cancelled] task={task:?} slot={:?}", e.slot);
            }
            EventKind::TaskFired => {
                info!("[fired] task={task:?} slot={:?}", e.slot);
            }
            EventKind::CallbackFailed => {
                warn!("[callback-failed] task={task:?} err={reason:?}");
            }
            EventKind::CallbackPanicked => {
                warn!("[callback-panicked] task={task:?} info={reason:?}");
            }
            EventKind::CommandPanicked => {
                warn!("[command-panicked] task={task:?} info={reason:?}");
            }
            EventKind::WheelStopped => {
                info!("[stopped] reason={reason:?} dropped={}", e.dropped.unwrap_or(0));
            }
            EventKind::SubscriberOverflow => {
                warn!("[subscriber-overflow] subscriber={task} reason={reason}");
            }
            EventKind::SubscriberPanicked => {
                warn!("[subscriber-panicked] subscriber={task} info={reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
