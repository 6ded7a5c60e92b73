//! Transfer — the handoff of a freight from a delivery to a reception service.
//!
//! Returning freight is a compound transition: both services enter (or
//! leave) the return branch together, so the transfer only ever produces
//! the pair of status changes and lets the caller commit them as one unit.

use serde::{Deserialize, Serialize};

use crate::changeset::Change;
use crate::error::{ConfigurationError, StateConflictError, TerminalError};
use crate::id::{ServiceId, TransferId};
use crate::service::{Service, ServiceType};

/// Pairing of one delivery and one reception service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    #[serde(rename = "delivery_service")]
    pub delivery_service_id: ServiceId,
    #[serde(rename = "reception_service")]
    pub reception_service_id: ServiceId,
}

impl Transfer {
    /// Pair two services into a new transfer.
    ///
    /// Uniqueness of the services across transfers needs the stored
    /// transfers and is checked by the caller.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::WrongServiceType`] when a service does not
    ///   match its role
    /// - [`ConfigurationError::SameServiceForBothRoles`] when both roles
    ///   point at the same service
    pub fn pair(delivery: &Service, reception: &Service) -> Result<Self, TerminalError> {
        check_roles(delivery, reception)?;
        Ok(Self {
            id: TransferId::new(),
            delivery_service_id: delivery.id,
            reception_service_id: reception.id,
        })
    }

    /// Whether `service_id` takes part in this transfer, in either role.
    #[must_use]
    pub fn involves(&self, service_id: ServiceId) -> bool {
        self.delivery_service_id == service_id || self.reception_service_id == service_id
    }

    /// Status changes moving both services into the return branch.
    ///
    /// Nothing is produced unless both services accept the transition.
    ///
    /// # Errors
    ///
    /// Returns [`StateConflictError::ServiceTransition`] for the first service
    /// already in the return branch.
    pub fn start_freight_return(
        &self,
        delivery: &Service,
        reception: &Service,
    ) -> Result<[Change; 2], StateConflictError> {
        let delivery_status = delivery.status.start_freight_return()?;
        let reception_status = reception.status.start_freight_return()?;
        Ok([
            Change::SetServiceStatus {
                id: self.delivery_service_id,
                status: delivery_status,
            },
            Change::SetServiceStatus {
                id: self.reception_service_id,
                status: reception_status,
            },
        ])
    }

    /// Status changes moving both services out of the return branch.
    ///
    /// # Errors
    ///
    /// Returns [`StateConflictError::ServiceTransition`] unless both services
    /// are returning freight.
    pub fn finish_freight_return(
        &self,
        delivery: &Service,
        reception: &Service,
    ) -> Result<[Change; 2], StateConflictError> {
        let delivery_status = delivery.status.finish_freight_return()?;
        let reception_status = reception.status.finish_freight_return()?;
        Ok([
            Change::SetServiceStatus {
                id: self.delivery_service_id,
                status: delivery_status,
            },
            Change::SetServiceStatus {
                id: self.reception_service_id,
                status: reception_status,
            },
        ])
    }
}

fn check_roles(delivery: &Service, reception: &Service) -> Result<(), ConfigurationError> {
    if delivery.kind != ServiceType::Delivery {
        return Err(ConfigurationError::WrongServiceType {
            field: "delivery_service",
            expected: ServiceType::Delivery,
        });
    }
    if reception.kind != ServiceType::Reception {
        return Err(ConfigurationError::WrongServiceType {
            field: "reception_service",
            expected: ServiceType::Reception,
        });
    }
    if delivery.id == reception.id {
        return Err(ConfigurationError::SameServiceForBothRoles);
    }
    Ok(())
}
