//! Shared application state for axum handlers.

use std::sync::Arc;

use freight_terminal_app::ports::{
    CompanyRepository, DeviceRepository, EventPublisher, FreightRepository, RobotRepository,
    RuleRepository, ServiceRepository, StateRepository, TransferRepository, UnitOfWork,
};
use freight_terminal_app::services::company_service::CompanyService;
use freight_terminal_app::services::device_service::DeviceService;
use freight_terminal_app::services::fleet_service::FleetService;
use freight_terminal_app::services::freight_service::FreightService;
use freight_terminal_app::services::monitoring_service::MonitoringService;
use freight_terminal_app::services::rule_service::RuleService;

/// The concrete port implementations the server runs with.
///
/// Bundling them behind associated types keeps handlers generic over a
/// single parameter.
pub trait Adapters: Send + Sync + 'static {
    type Devices: DeviceRepository + Send + Sync + 'static;
    type Companies: CompanyRepository + Send + Sync + 'static;
    type Robots: RobotRepository + Send + Sync + 'static;
    type Services: ServiceRepository + Send + Sync + 'static;
    type Transfers: TransferRepository + Send + Sync + 'static;
    type Freights: FreightRepository + Send + Sync + 'static;
    type Rules: RuleRepository + Send + Sync + 'static;
    type States: StateRepository + Send + Sync + 'static;
    type UnitOfWork: UnitOfWork + Send + Sync + 'static;
    type Publisher: EventPublisher + Send + Sync + 'static;
}

pub type Fleet<A> = FleetService<
    <A as Adapters>::Companies,
    <A as Adapters>::Robots,
    <A as Adapters>::Services,
    <A as Adapters>::Transfers,
    <A as Adapters>::UnitOfWork,
    <A as Adapters>::Publisher,
>;

pub type Freights<A> = FreightService<
    <A as Adapters>::Freights,
    <A as Adapters>::Transfers,
    <A as Adapters>::Services,
    <A as Adapters>::Robots,
    <A as Adapters>::UnitOfWork,
    <A as Adapters>::Publisher,
>;

pub type Rules<A> = RuleService<
    <A as Adapters>::Freights,
    <A as Adapters>::Rules,
    <A as Adapters>::Devices,
    <A as Adapters>::States,
>;

pub type Monitoring<A> = MonitoringService<
    <A as Adapters>::Freights,
    <A as Adapters>::Rules,
    <A as Adapters>::Devices,
    <A as Adapters>::States,
    <A as Adapters>::Transfers,
    <A as Adapters>::Services,
    <A as Adapters>::UnitOfWork,
    <A as Adapters>::Publisher,
>;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<A: Adapters> {
    pub device_service: Arc<DeviceService<A::Devices>>,
    pub company_service: Arc<CompanyService<A::Companies>>,
    /// Robots and their services.
    pub fleet_service: Arc<Fleet<A>>,
    pub freight_service: Arc<Freights<A>>,
    pub rule_service: Arc<Rules<A>>,
    /// States and damage assessment.
    pub monitoring_service: Arc<Monitoring<A>>,
}

impl<A: Adapters> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            company_service: Arc::clone(&self.company_service),
            fleet_service: Arc::clone(&self.fleet_service),
            freight_service: Arc::clone(&self.freight_service),
            rule_service: Arc::clone(&self.rule_service),
            monitoring_service: Arc::clone(&self.monitoring_service),
        }
    }
}

impl<A: Adapters> AppState<A> {
    /// Create a new application state from service instances.
    pub fn new(
        device_service: DeviceService<A::Devices>,
        company_service: CompanyService<A::Companies>,
        fleet_service: Fleet<A>,
        freight_service: Freights<A>,
        rule_service: Rules<A>,
        monitoring_service: Monitoring<A>,
    ) -> Self {
        Self {
            device_service: Arc::new(device_service),
            company_service: Arc::new(company_service),
            fleet_service: Arc::new(fleet_service),
            freight_service: Arc::new(freight_service),
            rule_service: Arc::new(rule_service),
            monitoring_service: Arc::new(monitoring_service),
        }
    }
}
