//! Service — a delivery or reception task performed by one robot.
//!
//! The service status is a small state machine. The forward path is
//!
//! ```text
//! not_started -> in_transit_without_freight -> in_transit_with_freight
//!             -> transfering -> waiting -> done
//! ```
//!
//! with shortcuts between adjacent transit phases, and every state outside
//! the return branch may enter `returning_freight`, which only leads to
//! `returned_freight`.

use serde::{Deserialize, Serialize};

use crate::error::StateConflictError;
use crate::id::{RobotId, ServiceId};
use crate::time::Timestamp;

labelled_enum! {
    /// Role of a service inside a transfer.
    ServiceType {
        Delivery => "delivery",
        Reception => "reception",
    }
}

labelled_enum! {
    /// Phase of freight handling a service is in.
    ServiceStatus default NotStarted {
        NotStarted => "not_started",
        InTransitWithoutFreight => "in_transit_without_freight",
        InTransitWithFreight => "in_transit_with_freight",
        Transfering => "transfering",
        Waiting => "waiting",
        Done => "done",
        ReturningFreight => "returning_freight",
        ReturnedFreight => "returned_freight",
    }
}

impl ServiceStatus {
    /// Whether the robot has started working on the service.
    #[must_use]
    pub fn is_started(self) -> bool {
        self != Self::NotStarted
    }

    /// Whether the service no longer keeps its robot busy.
    #[must_use]
    pub fn is_concluded(self) -> bool {
        matches!(self, Self::Done | Self::ReturnedFreight)
    }

    /// Whether the status belongs to the freight-return branch.
    #[must_use]
    pub fn is_return_branch(self) -> bool {
        matches!(self, Self::ReturningFreight | Self::ReturnedFreight)
    }

    /// Whether moving from `self` to `next` is a legal edge.
    ///
    /// Staying in the same status is always allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use ServiceStatus::{
            Done, InTransitWithFreight, InTransitWithoutFreight, NotStarted, ReturnedFreight,
            ReturningFreight, Transfering, Waiting,
        };

        if self == next {
            return true;
        }
        match (self, next) {
            (from, ReturningFreight) => !from.is_return_branch(),
            (ReturningFreight, ReturnedFreight)
            | (NotStarted, InTransitWithoutFreight | InTransitWithFreight)
            | (InTransitWithoutFreight, InTransitWithFreight | Transfering)
            | (InTransitWithFreight, Transfering)
            | (Transfering, Waiting)
            | (Waiting, Done) => true,
            _ => false,
        }
    }

    /// Apply a transition, rejecting illegal edges.
    ///
    /// # Errors
    ///
    /// Returns [`StateConflictError::ServiceTransition`] when the edge is not
    /// part of the state machine.
    pub fn transition(self, next: Self) -> Result<Self, StateConflictError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StateConflictError::ServiceTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Enter the freight-return branch.
    ///
    /// # Errors
    ///
    /// Fails when the service is already returning or has returned.
    pub fn start_freight_return(self) -> Result<Self, StateConflictError> {
        if self.is_return_branch() {
            return Err(StateConflictError::ServiceTransition {
                from: self,
                to: Self::ReturningFreight,
            });
        }
        Ok(Self::ReturningFreight)
    }

    /// Leave the freight-return branch.
    ///
    /// # Errors
    ///
    /// Fails unless the service is currently returning freight.
    pub fn finish_freight_return(self) -> Result<Self, StateConflictError> {
        if self == Self::ReturningFreight {
            Ok(Self::ReturnedFreight)
        } else {
            Err(StateConflictError::ServiceTransition {
                from: self,
                to: Self::ReturnedFreight,
            })
        }
    }
}

/// A task a robot performs for a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub robot_id: RobotId,
    #[serde(rename = "type")]
    pub kind: ServiceType,
    pub arrival_datetime: Timestamp,
    /// Accumulated delay, in seconds.
    pub delay_time: u32,
    pub status: ServiceStatus,
}

impl Service {
    /// Create a builder for constructing a [`Service`].
    #[must_use]
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::default()
    }
}

/// Step-by-step builder for [`Service`].
#[derive(Debug, Default)]
pub struct ServiceBuilder {
    id: Option<ServiceId>,
    robot_id: Option<RobotId>,
    kind: Option<ServiceType>,
    arrival_datetime: Option<Timestamp>,
    delay_time: u32,
    status: ServiceStatus,
}

impl ServiceBuilder {
    #[must_use]
    pub fn id(mut self, id: ServiceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn robot_id(mut self, robot_id: RobotId) -> Self {
        self.robot_id = Some(robot_id);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: ServiceType) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn arrival_datetime(mut self, arrival: Timestamp) -> Self {
        self.arrival_datetime = Some(arrival);
        self
    }

    #[must_use]
    pub fn delay_time(mut self, seconds: u32) -> Self {
        self.delay_time = seconds;
        self
    }

    #[must_use]
    pub fn status(mut self, status: ServiceStatus) -> Self {
        self.status = status;
        self
    }

    /// Consume the builder and return a [`Service`].
    #[must_use]
    pub fn build(self) -> Service {
        Service {
            id: self.id.unwrap_or_default(),
            robot_id: self.robot_id.unwrap_or_default(),
            kind: self.kind.unwrap_or(ServiceType::Delivery),
            arrival_datetime: self.arrival_datetime.unwrap_or_else(crate::time::now),
            delay_time: self.delay_time,
            status: self.status,
        }
    }
}
