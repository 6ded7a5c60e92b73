//! State — one sensor reading recorded under a rule.

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::error::ConfigurationError;
use crate::id::{RuleId, StateId};
use crate::time::{self, Timestamp};

/// Immutable observation. The timestamp is set when the state is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub rule_id: RuleId,
    pub value: f64,
    pub timestamp: Timestamp,
}

impl State {
    /// Record `value` for `rule_id` at the current time.
    #[must_use]
    pub fn new(rule_id: RuleId, value: f64) -> Self {
        Self {
            id: StateId::new(),
            rule_id,
            value,
            timestamp: time::now(),
        }
    }

    /// Check the reading against the calibrated range of its device.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::NotFinite`] for NaN or infinite readings
    /// - [`ConfigurationError::ValueOutsideDevice`] when the reading is not
    ///   something the device can physically report
    pub fn validate_against(&self, device: &Device) -> Result<(), ConfigurationError> {
        if !self.value.is_finite() {
            return Err(ConfigurationError::NotFinite { field: "value" });
        }
        if !device.accepts(self.value) {
            return Err(ConfigurationError::ValueOutsideDevice {
                value: self.value,
                min: device.min_value,
                max: device.max_value,
            });
        }
        Ok(())
    }
}
