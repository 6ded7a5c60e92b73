//! Freight service — freights, their transfer, and the return workflow.

use freight_terminal_domain::changeset::{Change, ChangeSet};
use freight_terminal_domain::error::{StateConflictError, TerminalError};
use freight_terminal_domain::event::{Event, EventType};
use freight_terminal_domain::freight::{Freight, FreightStatus};
use freight_terminal_domain::id::{FreightId, ServiceId};
use freight_terminal_domain::lifecycle::{plan_finish_return, plan_start_return};
use freight_terminal_domain::service::Service;
use freight_terminal_domain::transfer::Transfer;

use super::cascade::{load_pair, robot_releases};
use super::{announce, not_found};
use crate::ports::{
    EventPublisher, FreightRepository, RobotRepository, ServiceRepository, TransferRepository,
    UnitOfWork,
};

/// Services to pair into a new transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferDraft {
    pub delivery_service_id: ServiceId,
    pub reception_service_id: ServiceId,
}

/// Input for [`FreightService::create_freight`].
#[derive(Debug, Clone)]
pub struct NewFreight {
    pub name: String,
    /// Defaults to `waiting` with a transfer and `not_assigned` without.
    pub status: Option<FreightStatus>,
    pub transfer: Option<TransferDraft>,
}

/// Input for [`FreightService::update_freight`]. `None` keeps the current
/// value.
#[derive(Debug, Clone, Default)]
pub struct FreightChanges {
    pub name: Option<String>,
    pub status: Option<FreightStatus>,
    pub transfer: Option<TransferDraft>,
}

/// Application service for freights.
pub struct FreightService<FR, TR, SR, BR, U, P> {
    freights: FR,
    transfers: TR,
    services: SR,
    robots: BR,
    unit_of_work: U,
    publisher: P,
}

impl<FR, TR, SR, BR, U, P> FreightService<FR, TR, SR, BR, U, P>
where
    FR: FreightRepository,
    TR: TransferRepository,
    SR: ServiceRepository,
    BR: RobotRepository,
    U: UnitOfWork,
    P: EventPublisher,
{
    pub fn new(
        freights: FR,
        transfers: TR,
        services: SR,
        robots: BR,
        unit_of_work: U,
        publisher: P,
    ) -> Self {
        Self {
            freights,
            transfers,
            services,
            robots,
            unit_of_work,
            publisher,
        }
    }

    /// Build a transfer from a draft, checking roles and that neither
    /// service is already paired.
    async fn prepare_transfer(&self, draft: TransferDraft) -> Result<Transfer, TerminalError> {
        let delivery = self.load_service(draft.delivery_service_id).await?;
        let reception = self.load_service(draft.reception_service_id).await?;
        let transfer = Transfer::pair(&delivery, &reception)?;

        for (field, service_id) in [
            ("delivery_service", transfer.delivery_service_id),
            ("reception_service", transfer.reception_service_id),
        ] {
            if self.transfers.find_by_service(service_id).await?.is_some() {
                return Err(StateConflictError::ServiceAlreadyPaired { field }.into());
            }
        }
        Ok(transfer)
    }

    async fn load_service(&self, id: ServiceId) -> Result<Service, TerminalError> {
        self.services
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Service", id))
    }

    /// Register a freight, optionally with a new transfer.
    ///
    /// # Errors
    ///
    /// - [`TerminalError::NotFound`] when a service of the transfer is missing
    /// - [`TerminalError::Configuration`] for a blank name, mismatched
    ///   service types, or the same service in both roles
    /// - [`TerminalError::StateConflict`] when a service is already paired or
    ///   the status contradicts the presence of a transfer
    #[tracing::instrument(skip(self, input), fields(freight_name = %input.name))]
    pub async fn create_freight(&self, input: NewFreight) -> Result<Freight, TerminalError> {
        let transfer = match input.transfer {
            Some(draft) => Some(self.prepare_transfer(draft).await?),
            None => None,
        };

        let mut builder = Freight::builder().name(input.name);
        if let Some(status) = input.status {
            builder = builder.status(status);
        }
        if let Some(transfer) = &transfer {
            builder = builder.transfer_id(transfer.id);
        }
        let freight = builder.build()?;

        let mut changes = ChangeSet::new();
        if let Some(transfer) = transfer {
            changes.push(Change::CreateTransfer(transfer));
        }
        changes.push(Change::CreateFreight(freight.clone()));
        self.unit_of_work.commit(changes).await?;

        Ok(freight)
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when no freight with `id` exists.
    #[tracing::instrument(skip(self))]
    pub async fn get_freight(&self, id: FreightId) -> Result<Freight, TerminalError> {
        self.freights
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Freight", id))
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_freights(&self) -> Result<Vec<Freight>, TerminalError> {
        self.freights.get_all().await
    }

    /// Rename a freight, move it forward, or attach a transfer.
    ///
    /// Attaching a transfer to a `not_assigned` freight moves it to
    /// `waiting` unless another status is requested. The return branch is
    /// only reachable through [`FreightService::start_return`].
    ///
    /// # Errors
    ///
    /// - [`TerminalError::NotFound`] for an unknown freight or service
    /// - [`StateConflictError::TransferAlreadyAssigned`] when the freight
    ///   already has a transfer
    /// - [`StateConflictError::FreightTransition`] for an illegal edge
    /// - [`StateConflictError::FreightStatusWithoutTransfer`] when a freight
    ///   without a transfer is moved past `not_assigned`
    /// - the errors of [`FreightService::create_freight`] for the transfer
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_freight(
        &self,
        id: FreightId,
        changes: FreightChanges,
    ) -> Result<Freight, TerminalError> {
        let current = self.get_freight(id).await?;
        let mut freight = current.clone();

        if let Some(name) = changes.name {
            freight.name = name;
        }

        let transfer = match changes.transfer {
            Some(_) if current.transfer_id.is_some() => {
                return Err(StateConflictError::TransferAlreadyAssigned.into());
            }
            Some(draft) => Some(self.prepare_transfer(draft).await?),
            None => None,
        };
        if let Some(transfer) = &transfer {
            freight.transfer_id = Some(transfer.id);
        }

        let target = match changes.status {
            Some(status) => status,
            None if transfer.is_some() && current.status == FreightStatus::NotAssigned => {
                FreightStatus::Waiting
            }
            None => current.status,
        };
        if target != current.status && target.is_return_branch() {
            return Err(StateConflictError::FreightTransition {
                from: current.status,
                to: target,
            }
            .into());
        }
        freight.status = current.status.transition(target)?;
        freight.validate()?;

        let mut plan = ChangeSet::new();
        if let Some(transfer) = transfer {
            plan.push(Change::CreateTransfer(transfer));
        }
        plan.push(Change::UpdateFreight {
            freight: freight.clone(),
            from: current.status,
        });
        self.unit_of_work.commit(plan).await?;

        Ok(freight)
    }

    /// Delete a freight with its rules and their states.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] for an unknown freight.
    #[tracing::instrument(skip(self))]
    pub async fn delete_freight(&self, id: FreightId) -> Result<(), TerminalError> {
        self.get_freight(id).await?;
        self.freights.delete(id).await
    }

    /// Send the freight back: the freight becomes `returning` and both
    /// services of its transfer `returning_freight`, in one commit.
    ///
    /// # Errors
    ///
    /// - [`TerminalError::NotFound`] for an unknown freight
    /// - [`TerminalError::OperationConflict`] without a transfer or when the
    ///   freight is already returning or returned
    #[tracing::instrument(skip(self))]
    pub async fn start_return(&self, id: FreightId) -> Result<Freight, TerminalError> {
        let freight = self.get_freight(id).await?;
        let pair = load_pair(&self.transfers, &self.services, &freight).await?;
        let plan = plan_start_return(&freight, pair.as_ref())?;
        self.unit_of_work.commit(plan.changes).await?;

        tracing::info!(freight_id = %id, "freight return started");
        announce(
            &self.publisher,
            Event::new(
                EventType::FreightReturnStarted,
                serde_json::json!({ "freight_id": id, "reason": "requested" }),
            ),
        )
        .await;
        Ok(plan.freight)
    }

    /// Complete a return: the freight becomes `returned`, both services
    /// `returned_freight`, and robots left without pending service are
    /// freed.
    ///
    /// # Errors
    ///
    /// - [`TerminalError::NotFound`] for an unknown freight
    /// - [`TerminalError::OperationConflict`] without a transfer or when no
    ///   return is under way
    #[tracing::instrument(skip(self))]
    pub async fn finish_return(&self, id: FreightId) -> Result<Freight, TerminalError> {
        let freight = self.get_freight(id).await?;
        let pair = load_pair(&self.transfers, &self.services, &freight).await?;
        let mut plan = plan_finish_return(&freight, pair.as_ref())?;

        if let Some(pair) = pair {
            let returned: Vec<Service> = [pair.delivery, pair.reception]
                .into_iter()
                .map(|service| Service {
                    status: service.status.finish_freight_return().unwrap_or(service.status),
                    ..service
                })
                .collect();
            plan.changes
                .extend(robot_releases(&self.robots, &self.services, &returned).await?);
        }
        self.unit_of_work.commit(plan.changes).await?;

        tracing::info!(freight_id = %id, "freight return finished");
        announce(
            &self.publisher,
            Event::new(
                EventType::FreightReturnFinished,
                serde_json::json!({ "freight_id": id }),
            ),
        )
        .await;
        Ok(plan.freight)
    }
}
