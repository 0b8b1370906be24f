//! Supervisor events: types and broadcast bus.
//!
//! - [`EventKind`], [`Event`] what happened, with metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! Published by `core::supervisor`; consumed by the `SubscriberSet` listener and
//! by anyone holding [`Supervisor::bus`](crate::Supervisor::bus).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
