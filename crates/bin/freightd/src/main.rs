//! # freightd — freight terminal daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve until Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use freight_terminal_adapter_http_axum::state::{Adapters, AppState};
use freight_terminal_adapter_storage_sqlite_sqlx::pool;
use freight_terminal_adapter_storage_sqlite_sqlx::{
    SqliteCompanyRepository, SqliteDeviceRepository, SqliteFreightRepository,
    SqliteRobotRepository, SqliteRuleRepository, SqliteServiceRepository, SqliteStateRepository,
    SqliteTransferRepository, SqliteUnitOfWork,
};
use freight_terminal_app::event_bus::InProcessEventBus;
use freight_terminal_app::services::company_service::CompanyService;
use freight_terminal_app::services::device_service::DeviceService;
use freight_terminal_app::services::fleet_service::FleetService;
use freight_terminal_app::services::freight_service::FreightService;
use freight_terminal_app::services::monitoring_service::MonitoringService;
use freight_terminal_app::services::rule_service::RuleService;
use freight_terminal_domain::event::Event;

use crate::config::Config;

/// Port implementations backed by `SQLite` and the in-process bus.
struct SqliteAdapters;

impl Adapters for SqliteAdapters {
    type Devices = SqliteDeviceRepository;
    type Companies = SqliteCompanyRepository;
    type Robots = SqliteRobotRepository;
    type Services = SqliteServiceRepository;
    type Transfers = SqliteTransferRepository;
    type Freights = SqliteFreightRepository;
    type Rules = SqliteRuleRepository;
    type States = SqliteStateRepository;
    type UnitOfWork = SqliteUnitOfWork;
    type Publisher = Arc<InProcessEventBus>;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter)
                .context("parsing the logging filter")?,
        )
        .init();

    // Database
    let db = pool::Config {
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
    }
    .build()
    .await
    .with_context(|| format!("opening database {}", config.database.url))?;
    let pool = db.pool().clone();

    // Repositories
    let devices = SqliteDeviceRepository::new(pool.clone());
    let companies = SqliteCompanyRepository::new(pool.clone());
    let robots = SqliteRobotRepository::new(pool.clone());
    let services = SqliteServiceRepository::new(pool.clone());
    let transfers = SqliteTransferRepository::new(pool.clone());
    let freights = SqliteFreightRepository::new(pool.clone());
    let rules = SqliteRuleRepository::new(pool.clone());
    let states = SqliteStateRepository::new(pool.clone());
    let unit_of_work = SqliteUnitOfWork::new(pool);

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(config.events.capacity));
    tokio::spawn(log_events(event_bus.subscribe()));

    // Services
    let state: AppState<SqliteAdapters> = AppState::new(
        DeviceService::new(devices.clone()),
        CompanyService::new(companies.clone()),
        FleetService::new(
            companies,
            robots.clone(),
            services.clone(),
            transfers.clone(),
            unit_of_work.clone(),
            Arc::clone(&event_bus),
        ),
        FreightService::new(
            freights.clone(),
            transfers.clone(),
            services.clone(),
            robots,
            unit_of_work.clone(),
            Arc::clone(&event_bus),
        ),
        RuleService::new(freights.clone(), rules.clone(), devices.clone(), states.clone()),
        MonitoringService::new(
            freights,
            rules,
            devices,
            states,
            transfers,
            services,
            unit_of_work,
            event_bus,
        ),
    );

    // HTTP
    let app = freight_terminal_adapter_http_axum::router::build(state);
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, "freightd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("freightd stopped");
    Ok(())
}

/// Log every domain event published on the bus.
async fn log_events(mut rx: broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                tracing::info!(
                    event_id = %event.id,
                    kind = %event.kind,
                    payload = %event.payload,
                    "domain event"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagging behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
