//! Storage port — repository traits for persistence.
//!
//! Single-row writes go through the repositories. Writes spanning several
//! entities (service creation, freight returns, state recording) are
//! planned as a change set and committed through
//! [`UnitOfWork`](super::UnitOfWork), so the matching repositories only
//! expose reads for them.

use std::future::Future;

use freight_terminal_domain::company::Company;
use freight_terminal_domain::device::Device;
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::freight::Freight;
use freight_terminal_domain::id::{
    CompanyId, DeviceId, FreightId, RobotId, RuleId, ServiceId, StateId, TransferId,
};
use freight_terminal_domain::robot::Robot;
use freight_terminal_domain::rule::Rule;
use freight_terminal_domain::service::Service;
use freight_terminal_domain::state::State;
use freight_terminal_domain::transfer::Transfer;

/// Repository for persisting and querying [`Device`]s.
pub trait DeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, TerminalError>> + Send;

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, TerminalError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, TerminalError>> + Send;

    /// Find a device by its unique name.
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Device>, TerminalError>> + Send;

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, TerminalError>> + Send;

    /// Delete a device together with the rules configured against it.
    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), TerminalError>> + Send;
}

/// Repository for persisting and querying [`Company`]s.
pub trait CompanyRepository {
    fn create(
        &self,
        company: Company,
    ) -> impl Future<Output = Result<Company, TerminalError>> + Send;

    fn get_by_id(
        &self,
        id: CompanyId,
    ) -> impl Future<Output = Result<Option<Company>, TerminalError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Company>, TerminalError>> + Send;

    fn update(
        &self,
        company: Company,
    ) -> impl Future<Output = Result<Company, TerminalError>> + Send;

    /// Delete a company and, transitively, everything it owns.
    fn delete(&self, id: CompanyId) -> impl Future<Output = Result<(), TerminalError>> + Send;
}

/// Repository for persisting and querying [`Robot`]s.
pub trait RobotRepository {
    fn create(&self, robot: Robot) -> impl Future<Output = Result<Robot, TerminalError>> + Send;

    fn get_by_id(
        &self,
        id: RobotId,
    ) -> impl Future<Output = Result<Option<Robot>, TerminalError>> + Send;

    /// All robots of a company.
    fn find_by_company(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<Robot>, TerminalError>> + Send;

    fn update(&self, robot: Robot) -> impl Future<Output = Result<Robot, TerminalError>> + Send;

    fn delete(&self, id: RobotId) -> impl Future<Output = Result<(), TerminalError>> + Send;
}

/// Read and single-row access to [`Service`]s.
pub trait ServiceRepository {
    fn get_by_id(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<Service>, TerminalError>> + Send;

    /// All services of a robot, oldest first.
    fn find_by_robot(
        &self,
        robot_id: RobotId,
    ) -> impl Future<Output = Result<Vec<Service>, TerminalError>> + Send;

    /// Update the descriptive fields of a service (arrival, delay).
    fn update(
        &self,
        service: Service,
    ) -> impl Future<Output = Result<Service, TerminalError>> + Send;

    /// Delete a service, its transfer, and the freight carried by it.
    fn delete(&self, id: ServiceId) -> impl Future<Output = Result<(), TerminalError>> + Send;
}

/// Read access to [`Transfer`]s.
pub trait TransferRepository {
    fn get_by_id(
        &self,
        id: TransferId,
    ) -> impl Future<Output = Result<Option<Transfer>, TerminalError>> + Send;

    /// The transfer a service takes part in, in either role.
    fn find_by_service(
        &self,
        service_id: ServiceId,
    ) -> impl Future<Output = Result<Option<Transfer>, TerminalError>> + Send;
}

/// Read and delete access to [`Freight`]s.
pub trait FreightRepository {
    fn get_by_id(
        &self,
        id: FreightId,
    ) -> impl Future<Output = Result<Option<Freight>, TerminalError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Freight>, TerminalError>> + Send;

    /// Delete a freight with its rules and their states.
    fn delete(&self, id: FreightId) -> impl Future<Output = Result<(), TerminalError>> + Send;
}

/// Repository for persisting and querying [`Rule`]s.
pub trait RuleRepository {
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, TerminalError>> + Send;

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, TerminalError>> + Send;

    /// All rules of a freight.
    fn find_by_freight(
        &self,
        freight_id: FreightId,
    ) -> impl Future<Output = Result<Vec<Rule>, TerminalError>> + Send;

    /// Replace the configuration and the statistics of a rule.
    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, TerminalError>> + Send;

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), TerminalError>> + Send;
}

/// Read access to [`State`]s.
pub trait StateRepository {
    fn get_by_id(
        &self,
        id: StateId,
    ) -> impl Future<Output = Result<Option<State>, TerminalError>> + Send;

    /// The history of a rule, in insertion order.
    fn find_by_rule(
        &self,
        rule_id: RuleId,
    ) -> impl Future<Output = Result<Vec<State>, TerminalError>> + Send;
}
