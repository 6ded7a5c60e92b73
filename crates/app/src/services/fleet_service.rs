//! Fleet service — robots of a company and the services they perform.
//!
//! Robots and services are always addressed through their owner, a robot
//! of another company or a service of another robot is reported as missing.

use freight_terminal_domain::changeset::{Change, ChangeSet};
use freight_terminal_domain::error::{StateConflictError, TerminalError};
use freight_terminal_domain::event::{Event, EventType};
use freight_terminal_domain::id::{CompanyId, RobotId, ServiceId};
use freight_terminal_domain::robot::Robot;
use freight_terminal_domain::service::{Service, ServiceStatus};

use super::cascade::robot_releases;
use super::{announce, not_found};
use crate::ports::{
    CompanyRepository, EventPublisher, RobotRepository, ServiceRepository, TransferRepository,
    UnitOfWork,
};

/// Application service for robots and their services.
pub struct FleetService<CR, BR, SR, TR, U, P> {
    companies: CR,
    robots: BR,
    services: SR,
    transfers: TR,
    unit_of_work: U,
    publisher: P,
}

impl<CR, BR, SR, TR, U, P> FleetService<CR, BR, SR, TR, U, P>
where
    CR: CompanyRepository,
    BR: RobotRepository,
    SR: ServiceRepository,
    TR: TransferRepository,
    U: UnitOfWork,
    P: EventPublisher,
{
    pub fn new(
        companies: CR,
        robots: BR,
        services: SR,
        transfers: TR,
        unit_of_work: U,
        publisher: P,
    ) -> Self {
        Self {
            companies,
            robots,
            services,
            transfers,
            unit_of_work,
            publisher,
        }
    }

    async fn ensure_company(&self, company_id: CompanyId) -> Result<(), TerminalError> {
        self.companies
            .get_by_id(company_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found("Company", company_id))
    }

    /// Register a robot for a company.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] for an unknown company or
    /// [`TerminalError::Configuration`] for a blank model.
    #[tracing::instrument(skip(self, robot), fields(robot_id = %robot.id))]
    pub async fn create_robot(
        &self,
        company_id: CompanyId,
        mut robot: Robot,
    ) -> Result<Robot, TerminalError> {
        self.ensure_company(company_id).await?;
        robot.company_id = company_id;
        robot.validate()?;
        self.robots.create(robot).await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] for an unknown company.
    #[tracing::instrument(skip(self))]
    pub async fn list_robots(&self, company_id: CompanyId) -> Result<Vec<Robot>, TerminalError> {
        self.ensure_company(company_id).await?;
        self.robots.find_by_company(company_id).await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the company or the robot does
    /// not exist, or the robot belongs to another company.
    #[tracing::instrument(skip(self))]
    pub async fn get_robot(
        &self,
        company_id: CompanyId,
        robot_id: RobotId,
    ) -> Result<Robot, TerminalError> {
        self.ensure_company(company_id).await?;
        self.robots
            .get_by_id(robot_id)
            .await?
            .filter(|robot| robot.company_id == company_id)
            .ok_or_else(|| not_found("Robot", robot_id))
    }

    /// Replace a robot. Its status may be set directly, for instance to
    /// take it out of service.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] outside the company scope or
    /// [`TerminalError::Configuration`] for a blank model.
    #[tracing::instrument(skip(self, robot), fields(robot_id = %robot.id))]
    pub async fn update_robot(
        &self,
        company_id: CompanyId,
        mut robot: Robot,
    ) -> Result<Robot, TerminalError> {
        self.get_robot(company_id, robot.id).await?;
        robot.company_id = company_id;
        robot.validate()?;
        self.robots.update(robot).await
    }

    /// Delete a robot with its services.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] outside the company scope.
    #[tracing::instrument(skip(self))]
    pub async fn delete_robot(
        &self,
        company_id: CompanyId,
        robot_id: RobotId,
    ) -> Result<(), TerminalError> {
        self.get_robot(company_id, robot_id).await?;
        self.robots.delete(robot_id).await
    }

    /// Attach a new service to a robot, which becomes busy.
    ///
    /// The service and the robot status are written together.
    ///
    /// # Errors
    ///
    /// - [`TerminalError::NotFound`] outside the company scope
    /// - [`StateConflictError::RobotUnavailable`] for an unavailable robot
    /// - [`StateConflictError::RobotBusy`] when a busy robot is handed an
    ///   already started service
    /// - [`StateConflictError::InitialServiceStatus`] for a service created
    ///   concluded or returning
    #[tracing::instrument(skip(self, service), fields(service_id = %service.id))]
    pub async fn create_service(
        &self,
        company_id: CompanyId,
        robot_id: RobotId,
        mut service: Service,
    ) -> Result<Service, TerminalError> {
        let robot = self.get_robot(company_id, robot_id).await?;
        let robot_status = robot.accept_service(service.status)?;
        service.robot_id = robot.id;

        let changes = ChangeSet::new()
            .with(Change::CreateService(service.clone()))
            .with(Change::SetRobotStatus {
                id: robot.id,
                status: robot_status,
            });
        self.unit_of_work.commit(changes).await?;

        tracing::info!(robot_id = %robot.id, kind = %service.kind, "service created");
        announce(
            &self.publisher,
            Event::new(
                EventType::ServiceCreated,
                serde_json::json!({
                    "service_id": service.id,
                    "robot_id": robot.id,
                    "type": service.kind,
                    "status": service.status,
                }),
            ),
        )
        .await;
        Ok(service)
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] outside the company scope.
    #[tracing::instrument(skip(self))]
    pub async fn list_services(
        &self,
        company_id: CompanyId,
        robot_id: RobotId,
    ) -> Result<Vec<Service>, TerminalError> {
        self.get_robot(company_id, robot_id).await?;
        self.services.find_by_robot(robot_id).await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] outside the company and robot
    /// scope.
    #[tracing::instrument(skip(self))]
    pub async fn get_service(
        &self,
        company_id: CompanyId,
        robot_id: RobotId,
        service_id: ServiceId,
    ) -> Result<Service, TerminalError> {
        self.get_robot(company_id, robot_id).await?;
        self.services
            .get_by_id(service_id)
            .await?
            .filter(|service| service.robot_id == robot_id)
            .ok_or_else(|| not_found("Service", service_id))
    }

    /// Update the schedule of a service (arrival time and delay).
    ///
    /// The status moves through [`FleetService::change_service_status`] and
    /// the type is fixed at creation.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] outside the company and robot
    /// scope.
    #[tracing::instrument(skip(self, service), fields(service_id = %service.id))]
    pub async fn update_service(
        &self,
        company_id: CompanyId,
        robot_id: RobotId,
        service: Service,
    ) -> Result<Service, TerminalError> {
        let mut current = self.get_service(company_id, robot_id, service.id).await?;
        current.arrival_datetime = service.arrival_datetime;
        current.delay_time = service.delay_time;
        self.services.update(current).await
    }

    /// Delete a service. Its transfer and the freight carried by it go too.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] outside the company and robot
    /// scope.
    #[tracing::instrument(skip(self))]
    pub async fn delete_service(
        &self,
        company_id: CompanyId,
        robot_id: RobotId,
        service_id: ServiceId,
    ) -> Result<(), TerminalError> {
        self.get_service(company_id, robot_id, service_id).await?;
        self.services.delete(service_id).await
    }

    /// Move a service along its state machine.
    ///
    /// A service that concludes frees its robot once no other service keeps
    /// it busy. Services paired in a transfer only enter the return branch
    /// through their freight.
    ///
    /// # Errors
    ///
    /// - [`TerminalError::NotFound`] outside the company and robot scope
    /// - [`StateConflictError::ServiceTransition`] for an illegal edge
    /// - [`StateConflictError::PairedServiceReturn`] for a return-branch
    ///   status on a paired service
    #[tracing::instrument(skip(self))]
    pub async fn change_service_status(
        &self,
        company_id: CompanyId,
        robot_id: RobotId,
        service_id: ServiceId,
        status: ServiceStatus,
    ) -> Result<Service, TerminalError> {
        let service = self.get_service(company_id, robot_id, service_id).await?;
        if service.status == status {
            return Ok(service);
        }
        if status.is_return_branch() && self.transfers.find_by_service(service_id).await?.is_some() {
            return Err(StateConflictError::PairedServiceReturn.into());
        }
        let next = service.status.transition(status)?;

        let updated = Service {
            status: next,
            ..service.clone()
        };
        let mut changes = ChangeSet::new().with(Change::SetServiceStatus {
            id: service_id,
            status: next,
        });
        if next.is_concluded() {
            changes.extend(
                robot_releases(&self.robots, &self.services, std::slice::from_ref(&updated))
                    .await?,
            );
        }
        self.unit_of_work.commit(changes).await?;

        announce(
            &self.publisher,
            Event::new(
                EventType::ServiceStatusChanged,
                serde_json::json!({
                    "service_id": service_id,
                    "from": service.status,
                    "to": next,
                }),
            ),
        )
        .await;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryStore, RecordingPublisher};
    use freight_terminal_domain::company::Company;
    use freight_terminal_domain::robot::RobotStatus;
    use freight_terminal_domain::service::ServiceType;
    use freight_terminal_domain::transfer::Transfer;

    type Fleet = FleetService<
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        RecordingPublisher,
    >;

    struct Fixture {
        store: InMemoryStore,
        publisher: RecordingPublisher,
        fleet: Fleet,
        company: Company,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::default();
        let publisher = RecordingPublisher::default();
        let company = Company::builder().name("Acme").build().unwrap();
        store.with(|t| t.companies.push(company.clone()));
        let fleet = FleetService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            publisher.clone(),
        );
        Fixture {
            store,
            publisher,
            fleet,
            company,
        }
    }

    impl Fixture {
        async fn robot(&self, status: RobotStatus) -> Robot {
            self.fleet
                .create_robot(
                    self.company.id,
                    Robot::builder().model("R2").status(status).build().unwrap(),
                )
                .await
                .unwrap()
        }

        fn robot_status(&self, id: RobotId) -> RobotStatus {
            self.store
                .with(|t| t.robots.iter().find(|r| r.id == id).map(|r| r.status))
                .unwrap()
        }
    }

    #[tokio::test]
    async fn should_make_robot_busy_when_service_created() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Free).await;

        let service = fx
            .fleet
            .create_service(fx.company.id, robot.id, Service::builder().build())
            .await
            .unwrap();

        assert_eq!(service.robot_id, robot.id);
        assert_eq!(fx.robot_status(robot.id), RobotStatus::Busy);
        assert_eq!(fx.publisher.kinds(), [EventType::ServiceCreated]);
    }

    #[tokio::test]
    async fn should_reject_service_when_robot_unavailable() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Unavailable).await;

        let err = fx
            .fleet
            .create_service(fx.company.id, robot.id, Service::builder().build())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Robot is unavailable for a new service.");
        assert!(fx.store.with(|t| t.services.is_empty()));
        assert_eq!(fx.robot_status(robot.id), RobotStatus::Unavailable);
    }

    #[tokio::test]
    async fn should_reject_started_service_when_robot_busy() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Busy).await;

        let result = fx
            .fleet
            .create_service(
                fx.company.id,
                robot.id,
                Service::builder()
                    .status(ServiceStatus::InTransitWithFreight)
                    .build(),
            )
            .await;

        assert!(matches!(
            result,
            Err(TerminalError::StateConflict(StateConflictError::RobotBusy))
        ));
    }

    #[tokio::test]
    async fn should_leave_robot_free_when_service_created_done() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Free).await;

        let result = fx
            .fleet
            .create_service(
                fx.company.id,
                robot.id,
                Service::builder().status(ServiceStatus::Done).build(),
            )
            .await;

        assert!(matches!(
            result,
            Err(TerminalError::StateConflict(
                StateConflictError::InitialServiceStatus {
                    status: ServiceStatus::Done
                }
            ))
        ));
        assert!(fx.store.with(|t| t.services.is_empty()));
        assert_eq!(fx.robot_status(robot.id), RobotStatus::Free);
    }

    #[tokio::test]
    async fn should_hide_robot_of_another_company() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Free).await;

        let result = fx.fleet.get_robot(CompanyId::new(), robot.id).await;

        assert!(matches!(result, Err(TerminalError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_release_robot_when_last_service_done() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Free).await;
        let service = fx
            .fleet
            .create_service(
                fx.company.id,
                robot.id,
                Service::builder()
                    .status(ServiceStatus::Waiting)
                    .build(),
            )
            .await
            .unwrap();

        let done = fx
            .fleet
            .change_service_status(fx.company.id, robot.id, service.id, ServiceStatus::Done)
            .await
            .unwrap();

        assert_eq!(done.status, ServiceStatus::Done);
        assert_eq!(fx.robot_status(robot.id), RobotStatus::Free);
    }

    #[tokio::test]
    async fn should_keep_robot_busy_while_another_service_pending() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Free).await;
        let first = fx
            .fleet
            .create_service(
                fx.company.id,
                robot.id,
                Service::builder()
                    .status(ServiceStatus::Waiting)
                    .build(),
            )
            .await
            .unwrap();
        fx.fleet
            .create_service(fx.company.id, robot.id, Service::builder().build())
            .await
            .unwrap();

        fx.fleet
            .change_service_status(fx.company.id, robot.id, first.id, ServiceStatus::Done)
            .await
            .unwrap();

        assert_eq!(fx.robot_status(robot.id), RobotStatus::Busy);
    }

    #[tokio::test]
    async fn should_reject_illegal_status_edge() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Free).await;
        let service = fx
            .fleet
            .create_service(fx.company.id, robot.id, Service::builder().build())
            .await
            .unwrap();

        let result = fx
            .fleet
            .change_service_status(fx.company.id, robot.id, service.id, ServiceStatus::Done)
            .await;

        assert!(matches!(
            result,
            Err(TerminalError::StateConflict(StateConflictError::ServiceTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn should_refuse_return_status_on_paired_service() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Free).await;
        let delivery = fx
            .fleet
            .create_service(fx.company.id, robot.id, Service::builder().build())
            .await
            .unwrap();
        let reception = fx
            .fleet
            .create_service(
                fx.company.id,
                robot.id,
                Service::builder().kind(ServiceType::Reception).build(),
            )
            .await
            .unwrap();
        let transfer = Transfer::pair(&delivery, &reception).unwrap();
        fx.store.with(|t| t.transfers.push(transfer));

        let result = fx
            .fleet
            .change_service_status(
                fx.company.id,
                robot.id,
                delivery.id,
                ServiceStatus::ReturningFreight,
            )
            .await;

        assert!(matches!(
            result,
            Err(TerminalError::StateConflict(StateConflictError::PairedServiceReturn))
        ));
    }

    #[tokio::test]
    async fn should_only_update_schedule_fields() {
        let fx = fixture();
        let robot = fx.robot(RobotStatus::Free).await;
        let service = fx
            .fleet
            .create_service(fx.company.id, robot.id, Service::builder().build())
            .await
            .unwrap();

        let mut edited = service.clone();
        edited.delay_time = 900;
        edited.status = ServiceStatus::Done;
        let updated = fx
            .fleet
            .update_service(fx.company.id, robot.id, edited)
            .await
            .unwrap();

        assert_eq!(updated.delay_time, 900);
        assert_eq!(updated.status, ServiceStatus::NotStarted);
    }
}
