//! Runtime core: the ring, its controller and the public handle.
//!
//! The only public API from this module is [`TimeWheel`] (plus its builder and
//! configuration). Everything else is owned by the controller task.
//!
//! Internal modules:
//! - [`slab`]: arena with stable indices and a free list;
//! - [`ring`]: slot queues, registry and cursor (pure, no I/O);
//! - [`schedule`]: delay to slot/cycle arithmetic;
//! - [`controller`]: single-owner event loop with per-event panic boundaries;
//! - [`executor`]: detached, panic-isolated callback execution;
//! - [`command`]: requests sent from handles to the controller.

mod builder;
mod command;
mod config;
mod controller;
mod executor;
mod ring;
mod schedule;
mod slab;
mod wheel;

pub use builder::TimeWheelBuilder;
pub use config::{DEFAULT_INTERVAL, DEFAULT_SLOT_COUNT, WheelConfig};
pub use wheel::TimeWheel;
