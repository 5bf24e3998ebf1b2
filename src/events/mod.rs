//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Controller` (scheduling, command faults, stop),
//!   `Executor` (callback failures), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by
//!   [`TimeWheelBuilder::build`](crate::TimeWheelBuilder::build), which fans
//!   out to the configured [`Subscribe`](crate::Subscribe) implementations.

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
