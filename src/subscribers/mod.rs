//! # Event subscribers.
//!
//! - [`Subscribe`] - user hook for observing wheel events
//! - [`SubscriberSet`] - internal fan-out with per-subscriber queues and workers
//! - [`LogWriter`] - built-in printer (feature `logging`)
//!
//! ```text
//! Controller / Executor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                   ├──► LogWriter
//!                                                                   └──► Custom ...
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscriber::Subscribe;
pub(crate) use subscriber_set::SubscriberSet;
