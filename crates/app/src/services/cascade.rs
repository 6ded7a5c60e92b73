//! Loading helpers shared by the workflows that cascade across entities.

use freight_terminal_domain::changeset::Change;
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::freight::Freight;
use freight_terminal_domain::id::RobotId;
use freight_terminal_domain::lifecycle::{TransferPair, release_robot};
use freight_terminal_domain::service::Service;

use super::not_found;
use crate::ports::{RobotRepository, ServiceRepository, TransferRepository};

/// Load the transfer of `freight` with both services, `None` without one.
pub(super) async fn load_pair<TR, SR>(
    transfers: &TR,
    services: &SR,
    freight: &Freight,
) -> Result<Option<TransferPair>, TerminalError>
where
    TR: TransferRepository,
    SR: ServiceRepository,
{
    let Some(transfer_id) = freight.transfer_id else {
        return Ok(None);
    };
    let transfer = transfers
        .get_by_id(transfer_id)
        .await?
        .ok_or_else(|| not_found("Transfer", transfer_id))?;
    let delivery = services
        .get_by_id(transfer.delivery_service_id)
        .await?
        .ok_or_else(|| not_found("Service", transfer.delivery_service_id))?;
    let reception = services
        .get_by_id(transfer.reception_service_id)
        .await?
        .ok_or_else(|| not_found("Service", transfer.reception_service_id))?;
    Ok(Some(TransferPair {
        transfer,
        delivery,
        reception,
    }))
}

/// Robot status changes following the given service updates.
///
/// `updated` holds services with the status they are about to be committed
/// with. Each robot involved is freed when none of its services is left
/// unconcluded.
pub(super) async fn robot_releases<BR, SR>(
    robots: &BR,
    services: &SR,
    updated: &[Service],
) -> Result<Vec<Change>, TerminalError>
where
    BR: RobotRepository,
    SR: ServiceRepository,
{
    let mut visited: Vec<RobotId> = Vec::new();
    let mut changes = Vec::new();

    for service in updated {
        if visited.contains(&service.robot_id) {
            continue;
        }
        visited.push(service.robot_id);

        let robot = robots
            .get_by_id(service.robot_id)
            .await?
            .ok_or_else(|| not_found("Robot", service.robot_id))?;
        let mut current = services.find_by_robot(robot.id).await?;
        for existing in &mut current {
            if let Some(next) = updated.iter().find(|u| u.id == existing.id) {
                existing.status = next.status;
            }
        }
        if let Some(change) = release_robot(&robot, &current) {
            tracing::debug!(robot_id = %robot.id, "robot released");
            changes.push(change);
        }
    }

    Ok(changes)
}
