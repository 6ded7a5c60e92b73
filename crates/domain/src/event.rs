//! Event — an immutable record of something that happened.
//!
//! Events are emitted after a unit of work has been committed, so a
//! subscriber never observes a change that was rolled back.

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::time::{self, Timestamp};

labelled_enum! {
    /// What kind of change the event describes.
    EventType {
        ServiceCreated => "service_created",
        ServiceStatusChanged => "service_status_changed",
        StateRecorded => "state_recorded",
        FreightDamaged => "freight_damaged",
        FreightReturnStarted => "freight_return_started",
        FreightReturnFinished => "freight_return_finished",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub payload: serde_json::Value,
    pub occurred_at: Timestamp,
}

impl Event {
    #[must_use]
    pub fn new(kind: EventType, payload: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            kind,
            payload,
            occurred_at: time::now(),
        }
    }
}
