//! # freight-terminal-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `freight-terminal-app::ports::storage`
//! - Apply change sets in a single transaction (`UnitOfWork`)
//! - Manage `SQLite` connection pool lifecycle and embedded migrations
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `freight-terminal-app` (for port traits) and `freight-terminal-domain`
//! (for domain types). The `app` and `domain` crates must never reference this adapter.

mod company_repo;
mod decode;
mod device_repo;
pub mod error;
mod freight_repo;
pub mod pool;
mod robot_repo;
mod rule_repo;
mod service_repo;
mod state_repo;
mod transfer_repo;
mod unit_of_work;

#[cfg(test)]
mod testing;

pub use company_repo::SqliteCompanyRepository;
pub use device_repo::SqliteDeviceRepository;
pub use freight_repo::SqliteFreightRepository;
pub use robot_repo::SqliteRobotRepository;
pub use rule_repo::SqliteRuleRepository;
pub use service_repo::SqliteServiceRepository;
pub use state_repo::SqliteStateRepository;
pub use transfer_repo::SqliteTransferRepository;
pub use unit_of_work::SqliteUnitOfWork;
