//! Freight — goods carried through a transfer and monitored by rules.
//!
//! The freight status follows the handover between the delivery and the
//! reception service:
//!
//! ```text
//! not_assigned -> waiting -> in_delivery_transit -> transfering
//!              -> in_reception_transit -> delivered
//! ```
//!
//! Every status outside the return branch may enter `returning`, which only
//! leads to `returned`.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, OperationConflictError, StateConflictError, TerminalError};
use crate::id::{FreightId, TransferId};

labelled_enum! {
    /// Where the freight is in its journey.
    FreightStatus default NotAssigned {
        NotAssigned => "not_assigned",
        Waiting => "waiting",
        InDeliveryTransit => "in_delivery_transit",
        Transfering => "transfering",
        InReceptionTransit => "in_reception_transit",
        Delivered => "delivered",
        Returning => "returning",
        Returned => "returned",
    }
}

impl FreightStatus {
    #[must_use]
    pub fn is_return_branch(self) -> bool {
        matches!(self, Self::Returning | Self::Returned)
    }

    /// Whether moving from `self` to `next` is a legal edge.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use FreightStatus::{
            Delivered, InDeliveryTransit, InReceptionTransit, NotAssigned, Returned, Returning,
            Transfering, Waiting,
        };

        if self == next {
            return true;
        }
        match (self, next) {
            (from, Returning) => !from.is_return_branch(),
            (Returning, Returned)
            | (NotAssigned, Waiting)
            | (Waiting, InDeliveryTransit)
            | (InDeliveryTransit, Transfering)
            | (Transfering, InReceptionTransit)
            | (InReceptionTransit, Delivered) => true,
            _ => false,
        }
    }

    /// Apply a transition, rejecting illegal edges.
    ///
    /// # Errors
    ///
    /// Returns [`StateConflictError::FreightTransition`] for an edge outside
    /// the state machine.
    pub fn transition(self, next: Self) -> Result<Self, StateConflictError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StateConflictError::FreightTransition {
                from: self,
                to: next,
            })
        }
    }
}

/// Goods moved between two services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Freight {
    pub id: FreightId,
    pub name: String,
    pub status: FreightStatus,
    #[serde(rename = "transfer")]
    pub transfer_id: Option<TransferId>,
    pub is_damaged: bool,
}

impl Freight {
    #[must_use]
    pub fn builder() -> FreightBuilder {
        FreightBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::EmptyName`] for a blank name
    /// - [`StateConflictError::FreightStatusWithTransfer`] when a freight
    ///   with a transfer still claims to be `not_assigned`
    /// - [`StateConflictError::FreightStatusWithoutTransfer`] when a freight
    ///   without a transfer has moved past `not_assigned`
    pub fn validate(&self) -> Result<(), TerminalError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyName.into());
        }
        match (self.transfer_id, self.status) {
            (Some(_), FreightStatus::NotAssigned) => {
                Err(StateConflictError::FreightStatusWithTransfer.into())
            }
            (None, status) if status != FreightStatus::NotAssigned => {
                Err(StateConflictError::FreightStatusWithoutTransfer.into())
            }
            _ => Ok(()),
        }
    }

    /// Move the freight into the return branch.
    ///
    /// # Errors
    ///
    /// - [`OperationConflictError::TransferNotAssigned`] without a transfer
    /// - [`OperationConflictError::AlreadyReturning`] when the return is
    ///   already under way or finished
    pub fn start_return(&mut self) -> Result<TransferId, OperationConflictError> {
        let transfer_id = self
            .transfer_id
            .ok_or(OperationConflictError::TransferNotAssigned)?;
        if self.status.is_return_branch() {
            return Err(OperationConflictError::AlreadyReturning);
        }
        self.status = FreightStatus::Returning;
        Ok(transfer_id)
    }

    /// Complete a return started with [`Freight::start_return`].
    ///
    /// # Errors
    ///
    /// - [`OperationConflictError::TransferNotAssigned`] without a transfer
    /// - [`OperationConflictError::ReturnNotStarted`] unless the freight is
    ///   currently `returning`
    pub fn finish_return(&mut self) -> Result<TransferId, OperationConflictError> {
        let transfer_id = self
            .transfer_id
            .ok_or(OperationConflictError::TransferNotAssigned)?;
        if self.status != FreightStatus::Returning {
            return Err(OperationConflictError::ReturnNotStarted);
        }
        self.status = FreightStatus::Returned;
        Ok(transfer_id)
    }

    /// Flag the freight as damaged. Returns `true` if the flag was newly set.
    pub fn mark_damaged(&mut self) -> bool {
        let newly = !self.is_damaged;
        self.is_damaged = true;
        newly
    }
}

#[derive(Debug, Default)]
pub struct FreightBuilder {
    id: Option<FreightId>,
    name: Option<String>,
    status: Option<FreightStatus>,
    transfer_id: Option<TransferId>,
    is_damaged: bool,
}

impl FreightBuilder {
    #[must_use]
    pub fn id(mut self, id: FreightId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: FreightStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a transfer. Without an explicit status the freight starts as
    /// `waiting`.
    #[must_use]
    pub fn transfer_id(mut self, transfer_id: TransferId) -> Self {
        self.transfer_id = Some(transfer_id);
        self
    }

    #[must_use]
    pub fn damaged(mut self, is_damaged: bool) -> Self {
        self.is_damaged = is_damaged;
        self
    }

    /// Consume the builder, validate, and return a [`Freight`].
    ///
    /// # Errors
    ///
    /// Returns the first invariant violated, see [`Freight::validate`].
    pub fn build(self) -> Result<Freight, TerminalError> {
        let status = match (self.status, self.transfer_id) {
            (Some(status), _) => status,
            (None, Some(_)) => FreightStatus::Waiting,
            (None, None) => FreightStatus::NotAssigned,
        };
        let freight = Freight {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            status,
            transfer_id: self.transfer_id,
            is_damaged: self.is_damaged,
        };
        freight.validate()?;
        Ok(freight)
    }
}
