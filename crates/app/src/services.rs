//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod company_service;
pub mod device_service;
pub mod fleet_service;
pub mod freight_service;
pub mod monitoring_service;
pub mod rule_service;

mod cascade;

use freight_terminal_domain::error::{NotFoundError, TerminalError};
use freight_terminal_domain::event::Event;

use crate::ports::EventPublisher;

fn not_found(entity: &'static str, id: impl ToString) -> TerminalError {
    NotFoundError {
        entity,
        id: id.to_string(),
    }
    .into()
}

/// Publish an event for a change that is already committed.
///
/// A failing publisher is logged and does not fail the operation.
async fn announce<P: EventPublisher>(publisher: &P, event: Event) {
    let kind = event.kind;
    if let Err(err) = publisher.publish(event).await {
        tracing::warn!(error = %err, event = %kind, "failed to publish event");
    }
}
