use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::{config::WheelConfig, controller::Controller, wheel::TimeWheel};
use crate::{
    events::{Bus, Event},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`TimeWheel`] with optional subscribers.
pub struct TimeWheelBuilder {
    cfg: WheelConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl TimeWheelBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: WheelConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive wheel events (scheduling, firing, callback failures)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the wheel and spawns its background tasks.
    ///
    /// This consumes the builder and initializes:
    /// - Event bus and, if any subscribers were given, their workers and listener
    /// - Command channel
    /// - Controller loop (ticking starts one interval from now)
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> TimeWheel {
        let slot_count = self.cfg.slot_count_or_default();
        let interval = self.cfg.interval_or_default();
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let stop = CancellationToken::new();
        let done = CancellationToken::new();

        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        if !subs.is_empty() {
            subscriber_listener(bus.subscribe(), subs, done.clone());
        }

        let (tx, rx) = mpsc::channel(self.cfg.command_capacity_clamped());

        let controller = Controller::new(slot_count, interval, bus);
        tokio::spawn(controller.run(rx, stop.clone(), done.clone()));

        TimeWheel::from_parts(tx, stop, done, slot_count, interval)
    }
}

/// Forwards bus events to the subscriber set.
///
/// Exits once the controller is done and the bus backlog is drained, so the
/// final `WheelStopped` still reaches subscribers. Callback outcomes published
/// after that point are not delivered.
fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    done: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                ev = rx.recv() => match ev {
                    Ok(ev) => set.emit_arc(Arc::new(ev)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "subscriber listener lagged behind the event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },

                _ = done.cancelled() => break,
            }
        }
    });
}
