//! Common error types used across the workspace.
//!
//! Each failure family is its own typed enum and converts into
//! [`TerminalError`] via `#[from]`. Validation-style errors carry the name
//! of the field they are attributed to so the boundary layer can render
//! field-level messages.

use crate::freight::FreightStatus;
use crate::service::ServiceStatus;

/// Top-level error returned by domain and application operations.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    /// Invalid configuration, rejected before anything is persisted.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The write conflicts with the current status of an entity.
    #[error(transparent)]
    StateConflict(#[from] StateConflictError),

    /// A workflow operation cannot run in the current situation.
    #[error(transparent)]
    OperationConflict(#[from] OperationConflictError),

    /// A referenced entity does not exist in the requested scope.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Configuration and input validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("This field may not be blank.")]
    EmptyName,

    #[error("This field may not be blank.")]
    Blank { field: &'static str },

    #[error("Max value must be greater than min value")]
    InvertedBounds,

    #[error("Value must be a finite number.")]
    NotFinite { field: &'static str },

    #[error("Device with this name already exists.")]
    DuplicateDeviceName,

    #[error("Coefficient must be between 0 and 1.")]
    CoefficientOutOfRange,

    #[error("Sum of rule coefficients of the freight can't be greater than 1 (got {total}).")]
    CoefficientBudgetExceeded { total: f64 },

    #[error("Possible deviation can't be negative.")]
    NegativeDeviation,

    #[error("Time interval must be positive.")]
    EmptyTimeInterval,

    #[error("Rule limits must lie within the device limits [{min}, {max}].")]
    RuleOutsideDevice { field: &'static str, min: f64, max: f64 },

    #[error("Value {value} is outside the device limits [{min}, {max}].")]
    ValueOutsideDevice { value: f64, min: f64, max: f64 },

    #[error("Service is not a {expected} service.")]
    WrongServiceType {
        field: &'static str,
        expected: crate::service::ServiceType,
    },

    #[error("Delivery and reception services must differ.")]
    SameServiceForBothRoles,

    #[error("Invalid identifier.")]
    InvalidIdentifier { field: &'static str },
}

impl ConfigurationError {
    /// Name of the input field the error is attributed to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::DuplicateDeviceName => "name",
            Self::InvertedBounds => "max_value",
            Self::Blank { field }
            | Self::NotFinite { field }
            | Self::RuleOutsideDevice { field, .. }
            | Self::WrongServiceType { field, .. }
            | Self::InvalidIdentifier { field } => field,
            Self::CoefficientOutOfRange | Self::CoefficientBudgetExceeded { .. } => "coefficient",
            Self::NegativeDeviation => "possible_deviation",
            Self::EmptyTimeInterval => "time_interval",
            Self::ValueOutsideDevice { .. } => "value",
            Self::SameServiceForBothRoles => "reception_service",
        }
    }
}

/// Writes rejected because of the current status of related entities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateConflictError {
    #[error("Robot is unavailable for a new service.")]
    RobotUnavailable,

    #[error("Robot is busy, only a not started service can be assigned to it.")]
    RobotBusy,

    #[error("Service is already assigned to another transfer.")]
    ServiceAlreadyPaired { field: &'static str },

    #[error("Freight with an assigned transfer can't have the not_assigned status.")]
    FreightStatusWithTransfer,

    #[error("Freight without a transfer must keep the not_assigned status.")]
    FreightStatusWithoutTransfer,

    #[error("Transfer is already assigned to the freight.")]
    TransferAlreadyAssigned,

    #[error("Service can't move from {from} to {to}.")]
    ServiceTransition {
        from: ServiceStatus,
        to: ServiceStatus,
    },

    #[error("Freight can't move from {from} to {to}.")]
    FreightTransition {
        from: FreightStatus,
        to: FreightStatus,
    },

    #[error("Freight return of a paired service must be driven through its freight.")]
    PairedServiceReturn,

    #[error("Service can't be created with the {status} status.")]
    InitialServiceStatus { status: ServiceStatus },

    #[error("Freight is no longer {expected}, reload it and retry.")]
    StaleFreight { expected: FreightStatus },
}

impl StateConflictError {
    /// Name of the input field the error is attributed to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::RobotUnavailable | Self::RobotBusy => "robot",
            Self::ServiceAlreadyPaired { field } => field,
            Self::TransferAlreadyAssigned => "transfer",
            Self::FreightStatusWithTransfer
            | Self::FreightStatusWithoutTransfer
            | Self::ServiceTransition { .. }
            | Self::FreightTransition { .. }
            | Self::PairedServiceReturn
            | Self::InitialServiceStatus { .. }
            | Self::StaleFreight { .. } => "status",
        }
    }
}

/// Workflow operations that cannot run right now.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationConflictError {
    #[error("Transfer is not assigned to the freight")]
    TransferNotAssigned,

    #[error("Freight is already on his way to be returned")]
    AlreadyReturning,

    #[error("Freight return has not been started")]
    ReturnNotStarted,
}

/// Raised when a referenced entity does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A stored or received label does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} label: {label}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}
