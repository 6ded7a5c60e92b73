//! Event bus port — publish/subscribe for domain events.

use std::future::Future;

use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::event::Event;

/// Publishes domain events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TerminalError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TerminalError>> + Send {
        (**self).publish(event)
    }
}
