//! # freight-terminal-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON API under `/api` (devices, companies and their fleet,
//!   freights with their rules and states)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map [`TerminalError`](freight_terminal_domain::error::TerminalError)
//!   into status codes and field-attributed error bodies
//!
//! ## Dependency rule
//! Depends on `freight-terminal-app` (for port traits and services) and
//! `freight-terminal-domain` (for domain types used in request/response
//! mapping). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
