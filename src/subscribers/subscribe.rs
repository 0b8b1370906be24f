//! # Subscriber trait
//!
//! [`Subscribe`] is the extension point for observing a polling loop (metrics,
//! alarms, audit). Each subscriber gets its own worker and bounded queue inside the
//! [`SubscriberSet`](crate::SubscriberSet), so a slow subscriber never delays a
//! poll cycle.
//!
//! ## Contract
//! - `on_event` may be slow; it only holds up this subscriber's queue.
//! - When the queue is full the event is dropped for this subscriber (warn).
//! - A panic in `on_event` is caught and logged; the worker keeps going.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (minimum 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
