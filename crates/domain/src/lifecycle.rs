//! Freight lifecycle — plans the cascade from a freight to its transfer,
//! services, and robots.
//!
//! Nothing here touches storage. Each planner takes the current snapshot
//! and returns the updated freight together with the [`ChangeSet`] that
//! brings storage in line with it.

use crate::changeset::{Change, ChangeSet};
use crate::error::{OperationConflictError, TerminalError};
use crate::freight::Freight;
use crate::robot::Robot;
use crate::service::Service;
use crate::transfer::Transfer;

/// A freight's transfer together with both of its services.
#[derive(Debug, Clone)]
pub struct TransferPair {
    pub transfer: Transfer,
    pub delivery: Service,
    pub reception: Service,
}

/// Outcome of a planned lifecycle step.
#[derive(Debug, Clone)]
pub struct Plan {
    pub freight: Freight,
    pub changes: ChangeSet,
}

/// Plan `start_return`: the freight becomes `returning` and both services
/// of its transfer become `returning_freight`.
///
/// `pair` is the loaded transfer of the freight, `None` when it has none.
///
/// # Errors
///
/// - [`OperationConflictError::TransferNotAssigned`] without a transfer
/// - [`OperationConflictError::AlreadyReturning`] for a freight already
///   `returning` or `returned`
/// - [`TerminalError::StateConflict`] if a service cannot enter the return
///   branch
pub fn plan_start_return(freight: &Freight, pair: Option<&TransferPair>) -> Result<Plan, TerminalError> {
    let from = freight.status;
    let mut freight = freight.clone();
    freight.start_return()?;
    let pair = pair.ok_or(OperationConflictError::TransferNotAssigned)?;
    let services = pair
        .transfer
        .start_freight_return(&pair.delivery, &pair.reception)?;

    let mut changes = ChangeSet::new().with(Change::UpdateFreight {
        freight: freight.clone(),
        from,
    });
    changes.extend(services);
    Ok(Plan { freight, changes })
}

/// Plan `finish_return`: the freight becomes `returned` and both services
/// become `returned_freight`.
///
/// Robots are released separately with [`release_robot`] once the caller
/// knows their other services.
///
/// # Errors
///
/// - [`OperationConflictError::TransferNotAssigned`] without a transfer
/// - [`OperationConflictError::ReturnNotStarted`] unless the freight is
///   `returning`
/// - [`TerminalError::StateConflict`] unless both services are returning
pub fn plan_finish_return(freight: &Freight, pair: Option<&TransferPair>) -> Result<Plan, TerminalError> {
    let from = freight.status;
    let mut freight = freight.clone();
    freight.finish_return()?;
    let pair = pair.ok_or(OperationConflictError::TransferNotAssigned)?;
    let services = pair
        .transfer
        .finish_freight_return(&pair.delivery, &pair.reception)?;

    let mut changes = ChangeSet::new().with(Change::UpdateFreight {
        freight: freight.clone(),
        from,
    });
    changes.extend(services);
    Ok(Plan { freight, changes })
}

/// Result of reacting to a violated rule.
#[derive(Debug)]
pub struct DamagePlan {
    pub freight: Freight,
    pub changes: ChangeSet,
    /// Whether the freight was not flagged before.
    pub newly_damaged: bool,
    pub return_started: bool,
    /// Why the return could not be started, if it was attempted and refused.
    pub return_skipped: Option<TerminalError>,
}

/// Plan the reaction to a violated rule: flag the freight and start its
/// return when possible.
///
/// A freight without transfer, or already on its way back, is only
/// flagged. The refusal is reported in [`DamagePlan::return_skipped`]
/// instead of failing the recording of the state.
#[must_use]
pub fn plan_damage(freight: &Freight, pair: Option<&TransferPair>) -> DamagePlan {
    let mut damaged = freight.clone();
    let newly_damaged = damaged.mark_damaged();

    match plan_start_return(&damaged, pair) {
        Ok(plan) => DamagePlan {
            freight: plan.freight,
            changes: plan.changes,
            newly_damaged,
            return_started: true,
            return_skipped: None,
        },
        Err(err) => {
            let changes = if newly_damaged {
                ChangeSet::new().with(Change::UpdateFreight {
                    freight: damaged.clone(),
                    from: freight.status,
                })
            } else {
                ChangeSet::new()
            };
            DamagePlan {
                freight: damaged,
                changes,
                newly_damaged,
                return_started: false,
                return_skipped: Some(err),
            }
        }
    }
}

/// Free `robot` when every one of its services is concluded.
///
/// `services` must reflect the statuses the robot's services will have
/// once the surrounding change set is committed.
#[must_use]
pub fn release_robot(robot: &Robot, services: &[Service]) -> Option<Change> {
    if services.iter().any(|service| !service.status.is_concluded()) {
        return None;
    }
    let status = robot.release();
    (status != robot.status).then_some(Change::SetRobotStatus {
        id: robot.id,
        status,
    })
}
