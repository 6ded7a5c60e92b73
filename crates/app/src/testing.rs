//! In-memory adapters for service tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use freight_terminal_domain::changeset::{Change, ChangeSet};
use freight_terminal_domain::company::Company;
use freight_terminal_domain::device::Device;
use freight_terminal_domain::error::{NotFoundError, StateConflictError, TerminalError};
use freight_terminal_domain::event::{Event, EventType};
use freight_terminal_domain::freight::Freight;
use freight_terminal_domain::id::{
    CompanyId, DeviceId, FreightId, RobotId, RuleId, ServiceId, StateId, TransferId,
};
use freight_terminal_domain::robot::Robot;
use freight_terminal_domain::rule::Rule;
use freight_terminal_domain::service::Service;
use freight_terminal_domain::state::State;
use freight_terminal_domain::transfer::Transfer;

use crate::ports::{
    CompanyRepository, DeviceRepository, EventPublisher, FreightRepository, RobotRepository,
    RuleRepository, ServiceRepository, StateRepository, TransferRepository, UnitOfWork,
};

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub devices: Vec<Device>,
    pub companies: Vec<Company>,
    pub robots: Vec<Robot>,
    pub services: Vec<Service>,
    pub transfers: Vec<Transfer>,
    pub freights: Vec<Freight>,
    pub rules: Vec<Rule>,
    pub states: Vec<State>,
}

fn not_found(entity: &'static str, id: impl ToString) -> TerminalError {
    NotFoundError {
        entity,
        id: id.to_string(),
    }
    .into()
}

impl Tables {
    fn apply(&mut self, change: Change) -> Result<(), TerminalError> {
        match change {
            Change::CreateService(service) => self.services.push(service),
            Change::SetServiceStatus { id, status } => {
                let service = self
                    .services
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or_else(|| not_found("Service", id))?;
                service.status = status;
            }
            Change::SetRobotStatus { id, status } => {
                let robot = self
                    .robots
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| not_found("Robot", id))?;
                robot.status = status;
            }
            Change::CreateTransfer(transfer) => self.transfers.push(transfer),
            Change::CreateFreight(freight) => self.freights.push(freight),
            Change::UpdateFreight { freight, from } => {
                let slot = self
                    .freights
                    .iter_mut()
                    .find(|f| f.id == freight.id)
                    .ok_or_else(|| not_found("Freight", freight.id))?;
                if slot.status != from {
                    return Err(StateConflictError::StaleFreight { expected: from }.into());
                }
                let is_damaged = slot.is_damaged || freight.is_damaged;
                *slot = Freight {
                    is_damaged,
                    ..freight
                };
            }
            Change::RecordState { state, observation } => {
                let rule = self
                    .rules
                    .iter_mut()
                    .find(|r| r.id == state.rule_id)
                    .ok_or_else(|| not_found("Rule", state.rule_id))?;
                rule.stats.apply(observation);
                self.states.push(state);
            }
            Change::DeleteState(id) => {
                let before = self.states.len();
                self.states.retain(|s| s.id != id);
                if self.states.len() == before {
                    return Err(not_found("State", id));
                }
            }
            Change::ReplaceRuleStats { rule_id, stats } => {
                let rule = self
                    .rules
                    .iter_mut()
                    .find(|r| r.id == rule_id)
                    .ok_or_else(|| not_found("Rule", rule_id))?;
                rule.stats = stats;
            }
        }
        Ok(())
    }

    fn delete_rules(&mut self, doomed: impl Fn(&Rule) -> bool) {
        let rule_ids: Vec<RuleId> = self.rules.iter().filter(|r| doomed(r)).map(|r| r.id).collect();
        self.rules.retain(|r| !rule_ids.contains(&r.id));
        self.states.retain(|s| !rule_ids.contains(&s.rule_id));
    }

    fn delete_freights(&mut self, doomed: impl Fn(&Freight) -> bool) {
        let freight_ids: Vec<FreightId> =
            self.freights.iter().filter(|f| doomed(f)).map(|f| f.id).collect();
        self.freights.retain(|f| !freight_ids.contains(&f.id));
        self.delete_rules(|r| freight_ids.contains(&r.freight_id));
    }

    fn delete_services(&mut self, doomed: impl Fn(&Service) -> bool) {
        let service_ids: Vec<ServiceId> =
            self.services.iter().filter(|s| doomed(s)).map(|s| s.id).collect();
        self.services.retain(|s| !service_ids.contains(&s.id));
        let transfer_ids: Vec<TransferId> = self
            .transfers
            .iter()
            .filter(|t| service_ids.iter().any(|id| t.involves(*id)))
            .map(|t| t.id)
            .collect();
        self.transfers.retain(|t| !transfer_ids.contains(&t.id));
        self.delete_freights(|f| f.transfer_id.is_some_and(|id| transfer_ids.contains(&id)));
    }

    fn delete_robots(&mut self, doomed: impl Fn(&Robot) -> bool) {
        let robot_ids: Vec<RobotId> = self.robots.iter().filter(|r| doomed(r)).map(|r| r.id).collect();
        self.robots.retain(|r| !robot_ids.contains(&r.id));
        self.delete_services(|s| robot_ids.contains(&s.robot_id));
    }
}

/// Every port backed by shared in-memory tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn with<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.tables.lock().unwrap();
        f(&mut tables)
    }
}

impl UnitOfWork for InMemoryStore {
    fn commit(&self, changes: ChangeSet) -> impl Future<Output = Result<(), TerminalError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let mut draft = tables.clone();
        let result = changes.into_iter().try_for_each(|change| draft.apply(change));
        if result.is_ok() {
            *tables = draft;
        }
        async move { result }
    }
}

impl DeviceRepository for InMemoryStore {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, TerminalError>> + Send {
        self.with(|t| t.devices.push(device.clone()));
        async move { Ok(device) }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, TerminalError>> + Send {
        let found = self.with(|t| t.devices.iter().find(|d| d.id == id).cloned());
        async move { Ok(found) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, TerminalError>> + Send {
        let all = self.with(|t| t.devices.clone());
        async move { Ok(all) }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Device>, TerminalError>> + Send {
        let found = self.with(|t| t.devices.iter().find(|d| d.name == name).cloned());
        async move { Ok(found) }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, TerminalError>> + Send {
        self.with(|t| {
            if let Some(slot) = t.devices.iter_mut().find(|d| d.id == device.id) {
                *slot = device.clone();
            }
        });
        async move { Ok(device) }
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), TerminalError>> + Send {
        self.with(|t| {
            t.devices.retain(|d| d.id != id);
            t.delete_rules(|r| r.device_id == id);
        });
        async { Ok(()) }
    }
}

impl CompanyRepository for InMemoryStore {
    fn create(
        &self,
        company: Company,
    ) -> impl Future<Output = Result<Company, TerminalError>> + Send {
        self.with(|t| t.companies.push(company.clone()));
        async move { Ok(company) }
    }

    fn get_by_id(
        &self,
        id: CompanyId,
    ) -> impl Future<Output = Result<Option<Company>, TerminalError>> + Send {
        let found = self.with(|t| t.companies.iter().find(|c| c.id == id).cloned());
        async move { Ok(found) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Company>, TerminalError>> + Send {
        let all = self.with(|t| t.companies.clone());
        async move { Ok(all) }
    }

    fn update(
        &self,
        company: Company,
    ) -> impl Future<Output = Result<Company, TerminalError>> + Send {
        self.with(|t| {
            if let Some(slot) = t.companies.iter_mut().find(|c| c.id == company.id) {
                *slot = company.clone();
            }
        });
        async move { Ok(company) }
    }

    fn delete(&self, id: CompanyId) -> impl Future<Output = Result<(), TerminalError>> + Send {
        self.with(|t| {
            t.companies.retain(|c| c.id != id);
            t.delete_robots(|r| r.company_id == id);
        });
        async { Ok(()) }
    }
}

impl RobotRepository for InMemoryStore {
    fn create(&self, robot: Robot) -> impl Future<Output = Result<Robot, TerminalError>> + Send {
        self.with(|t| t.robots.push(robot.clone()));
        async move { Ok(robot) }
    }

    fn get_by_id(
        &self,
        id: RobotId,
    ) -> impl Future<Output = Result<Option<Robot>, TerminalError>> + Send {
        let found = self.with(|t| t.robots.iter().find(|r| r.id == id).cloned());
        async move { Ok(found) }
    }

    fn find_by_company(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<Robot>, TerminalError>> + Send {
        let found = self.with(|t| {
            t.robots
                .iter()
                .filter(|r| r.company_id == company_id)
                .cloned()
                .collect()
        });
        async move { Ok(found) }
    }

    fn update(&self, robot: Robot) -> impl Future<Output = Result<Robot, TerminalError>> + Send {
        self.with(|t| {
            if let Some(slot) = t.robots.iter_mut().find(|r| r.id == robot.id) {
                *slot = robot.clone();
            }
        });
        async move { Ok(robot) }
    }

    fn delete(&self, id: RobotId) -> impl Future<Output = Result<(), TerminalError>> + Send {
        self.with(|t| t.delete_robots(|r| r.id == id));
        async { Ok(()) }
    }
}

impl ServiceRepository for InMemoryStore {
    fn get_by_id(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<Service>, TerminalError>> + Send {
        let found = self.with(|t| t.services.iter().find(|s| s.id == id).cloned());
        async move { Ok(found) }
    }

    fn find_by_robot(
        &self,
        robot_id: RobotId,
    ) -> impl Future<Output = Result<Vec<Service>, TerminalError>> + Send {
        let found = self.with(|t| {
            t.services
                .iter()
                .filter(|s| s.robot_id == robot_id)
                .cloned()
                .collect()
        });
        async move { Ok(found) }
    }

    fn update(
        &self,
        service: Service,
    ) -> impl Future<Output = Result<Service, TerminalError>> + Send {
        self.with(|t| {
            if let Some(slot) = t.services.iter_mut().find(|s| s.id == service.id) {
                slot.arrival_datetime = service.arrival_datetime;
                slot.delay_time = service.delay_time;
            }
        });
        async move { Ok(service) }
    }

    fn delete(&self, id: ServiceId) -> impl Future<Output = Result<(), TerminalError>> + Send {
        self.with(|t| t.delete_services(|s| s.id == id));
        async { Ok(()) }
    }
}

impl TransferRepository for InMemoryStore {
    fn get_by_id(
        &self,
        id: TransferId,
    ) -> impl Future<Output = Result<Option<Transfer>, TerminalError>> + Send {
        let found = self.with(|t| t.transfers.iter().find(|tr| tr.id == id).copied());
        async move { Ok(found) }
    }

    fn find_by_service(
        &self,
        service_id: ServiceId,
    ) -> impl Future<Output = Result<Option<Transfer>, TerminalError>> + Send {
        let found = self.with(|t| t.transfers.iter().find(|tr| tr.involves(service_id)).copied());
        async move { Ok(found) }
    }
}

impl FreightRepository for InMemoryStore {
    fn get_by_id(
        &self,
        id: FreightId,
    ) -> impl Future<Output = Result<Option<Freight>, TerminalError>> + Send {
        let found = self.with(|t| t.freights.iter().find(|f| f.id == id).cloned());
        async move { Ok(found) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Freight>, TerminalError>> + Send {
        let all = self.with(|t| t.freights.clone());
        async move { Ok(all) }
    }

    fn delete(&self, id: FreightId) -> impl Future<Output = Result<(), TerminalError>> + Send {
        self.with(|t| t.delete_freights(|f| f.id == id));
        async { Ok(()) }
    }
}

impl RuleRepository for InMemoryStore {
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, TerminalError>> + Send {
        self.with(|t| t.rules.push(rule.clone()));
        async move { Ok(rule) }
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, TerminalError>> + Send {
        let found = self.with(|t| t.rules.iter().find(|r| r.id == id).cloned());
        async move { Ok(found) }
    }

    fn find_by_freight(
        &self,
        freight_id: FreightId,
    ) -> impl Future<Output = Result<Vec<Rule>, TerminalError>> + Send {
        let found = self.with(|t| {
            t.rules
                .iter()
                .filter(|r| r.freight_id == freight_id)
                .cloned()
                .collect()
        });
        async move { Ok(found) }
    }

    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, TerminalError>> + Send {
        self.with(|t| {
            if let Some(slot) = t.rules.iter_mut().find(|r| r.id == rule.id) {
                *slot = rule.clone();
            }
        });
        async move { Ok(rule) }
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), TerminalError>> + Send {
        self.with(|t| t.delete_rules(|r| r.id == id));
        async { Ok(()) }
    }
}

impl StateRepository for InMemoryStore {
    fn get_by_id(
        &self,
        id: StateId,
    ) -> impl Future<Output = Result<Option<State>, TerminalError>> + Send {
        let found = self.with(|t| t.states.iter().find(|s| s.id == id).cloned());
        async move { Ok(found) }
    }

    fn find_by_rule(
        &self,
        rule_id: RuleId,
    ) -> impl Future<Output = Result<Vec<State>, TerminalError>> + Send {
        let found = self.with(|t| {
            t.states
                .iter()
                .filter(|s| s.rule_id == rule_id)
                .cloned()
                .collect()
        });
        async move { Ok(found) }
    }
}

/// Publisher keeping every event for later inspection.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingPublisher {
    pub fn kinds(&self) -> Vec<EventType> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TerminalError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}
