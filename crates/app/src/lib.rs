//! # freight-terminal-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - one repository per aggregate (`DeviceRepository`, `FreightRepository`, …)
//!   - `UnitOfWork` — commit a [`ChangeSet`](freight_terminal_domain::changeset::ChangeSet)
//!     atomically
//!   - `EventPublisher` — announce committed changes
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DeviceService`, `CompanyService` — registries
//!   - `FleetService` — robots and the services they perform
//!   - `FreightService` — freights, transfers, and the return workflow
//!   - `RuleService` — rule configuration and the coefficient budget
//!   - `MonitoringService` — state recording, damage detection, health checks
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `freight-terminal-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
