//! # freight-terminal-domain
//!
//! Pure domain model for the freight terminal.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **Device** registry (calibrated sensor bounds and units)
//! - Define **Companies**, their **Robots**, and the **Services** robots perform
//! - Define **Transfers** (delivery/reception service pairs) and **Freights**
//! - Define **Rules** and **States** (per-device thresholds and observations)
//! - Run the **damage engine** and the **status machines** as pure functions
//! - Describe cascading writes as a [`ChangeSet`](changeset::ChangeSet)
//!   that the application commits atomically
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

#[macro_use]
mod macros;

pub mod error;
pub mod id;
pub mod time;

pub mod changeset;
pub mod company;
pub mod damage;
pub mod device;
pub mod event;
pub mod freight;
pub mod lifecycle;
pub mod robot;
pub mod rule;
pub mod service;
pub mod state;
pub mod transfer;
