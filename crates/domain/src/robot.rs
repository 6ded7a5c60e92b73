//! Robot — a vehicle owned by a company that performs services.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, StateConflictError, TerminalError};
use crate::id::{CompanyId, RobotId};
use crate::service::ServiceStatus;

labelled_enum! {
    /// Medium the robot travels through.
    RobotType {
        Sea => "sea",
        Air => "air",
        Land => "land",
    }
}

labelled_enum! {
    /// Availability of a robot for new services.
    RobotStatus default Free {
        Busy => "busy",
        Free => "free",
        Unavailable => "unavailable",
    }
}

/// A robot belonging to a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robot {
    pub id: RobotId,
    pub company_id: CompanyId,
    pub model: String,
    #[serde(rename = "type")]
    pub kind: RobotType,
    pub status: RobotStatus,
}

impl Robot {
    /// Create a builder for constructing a [`Robot`].
    #[must_use]
    pub fn builder() -> RobotBuilder {
        RobotBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Configuration`] when `model` is empty.
    pub fn validate(&self) -> Result<(), TerminalError> {
        if self.model.trim().is_empty() {
            return Err(ConfigurationError::Blank { field: "model" }.into());
        }
        Ok(())
    }

    /// Status the robot moves to when a new service in `service_status` is
    /// attached to it.
    ///
    /// # Errors
    ///
    /// - [`StateConflictError::RobotUnavailable`] for an unavailable robot
    /// - [`StateConflictError::RobotBusy`] when a busy robot is handed an
    ///   already started service
    /// - [`StateConflictError::InitialServiceStatus`] for a service that is
    ///   already concluded or in the return branch
    pub fn accept_service(&self, service_status: ServiceStatus) -> Result<RobotStatus, StateConflictError> {
        if service_status.is_concluded() || service_status.is_return_branch() {
            return Err(StateConflictError::InitialServiceStatus {
                status: service_status,
            });
        }
        match self.status {
            RobotStatus::Unavailable => Err(StateConflictError::RobotUnavailable),
            RobotStatus::Busy if service_status.is_started() => Err(StateConflictError::RobotBusy),
            RobotStatus::Busy | RobotStatus::Free => Ok(RobotStatus::Busy),
        }
    }

    /// Status the robot moves to once none of its services keep it busy.
    #[must_use]
    pub fn release(&self) -> RobotStatus {
        match self.status {
            RobotStatus::Busy => RobotStatus::Free,
            other => other,
        }
    }
}

/// Step-by-step builder for [`Robot`].
#[derive(Debug, Default)]
pub struct RobotBuilder {
    id: Option<RobotId>,
    company_id: Option<CompanyId>,
    model: Option<String>,
    kind: Option<RobotType>,
    status: RobotStatus,
}

impl RobotBuilder {
    #[must_use]
    pub fn id(mut self, id: RobotId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn company_id(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: RobotType) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn status(mut self, status: RobotStatus) -> Self {
        self.status = status;
        self
    }

    /// Consume the builder, validate, and return a [`Robot`].
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Configuration`] if `model` is missing or empty.
    pub fn build(self) -> Result<Robot, TerminalError> {
        let robot = Robot {
            id: self.id.unwrap_or_default(),
            company_id: self.company_id.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            kind: self.kind.unwrap_or(RobotType::Land),
            status: self.status,
        };
        robot.validate()?;
        Ok(robot)
    }
}
