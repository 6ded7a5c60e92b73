//! Device — a calibrated sensor type rules are configured against.
//!
//! A device fixes the physical range `[min_value, max_value]` its readings
//! can take. Rules narrow that range into operating thresholds and states
//! are rejected when they fall outside it.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, TerminalError};
use crate::id::DeviceId;

labelled_enum! {
    /// SI base unit a device reports in.
    Unit {
        Meter => "m",
        Kilogram => "kg",
        Second => "s",
        Ampere => "A",
        Kelvin => "K",
        Mole => "mol",
        Candela => "Cd",
    }
}

labelled_enum! {
    /// Optional SI prefix applied to the unit.
    Prefix {
        Giga => "G",
        Mega => "M",
        Kilo => "K",
        Centi => "C",
        Milli => "m",
        Micro => "micro",
        Nano => "n",
    }
}

/// A sensor type with its calibrated bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub unit: Unit,
    pub prefix: Option<Prefix>,
    pub min_value: f64,
    pub max_value: f64,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Configuration`] when:
    /// - `name` is empty ([`ConfigurationError::EmptyName`])
    /// - a bound is NaN or infinite ([`ConfigurationError::NotFinite`])
    /// - `max_value < min_value` ([`ConfigurationError::InvertedBounds`])
    pub fn validate(&self) -> Result<(), TerminalError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyName.into());
        }
        if !self.min_value.is_finite() {
            return Err(ConfigurationError::NotFinite { field: "min_value" }.into());
        }
        if !self.max_value.is_finite() {
            return Err(ConfigurationError::NotFinite { field: "max_value" }.into());
        }
        if self.max_value < self.min_value {
            return Err(ConfigurationError::InvertedBounds.into());
        }
        Ok(())
    }

    /// Whether `value` lies within the calibrated range (inclusive).
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        self.min_value <= value && value <= self.max_value
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    unit: Option<Unit>,
    prefix: Option<Prefix>,
    min_value: f64,
    max_value: f64,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    #[must_use]
    pub fn bounds(mut self, min_value: f64, max_value: f64) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// The unit defaults to kelvin when not provided.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Configuration`] if invariants fail.
    pub fn build(self) -> Result<Device, TerminalError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            unit: self.unit.unwrap_or(Unit::Kelvin),
            prefix: self.prefix,
            min_value: self.min_value,
            max_value: self.max_value,
        };
        device.validate()?;
        Ok(device)
    }
}
