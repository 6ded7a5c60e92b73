//! Rule — operating thresholds for one device, attached to a freight.

use serde::{Deserialize, Serialize};

use crate::damage::{self, Observation, RuleStats, Verdict};
use crate::device::Device;
use crate::error::{ConfigurationError, TerminalError};
use crate::id::{DeviceId, FreightId, RuleId};
use crate::state::State;

/// Upper bound on the sum of coefficients of a freight's rules.
pub const COEFFICIENT_BUDGET: f64 = 1.0;

const BUDGET_TOLERANCE: f64 = 1e-9;

/// Default observation window, in seconds.
pub const DEFAULT_TIME_INTERVAL: u32 = 3600;

/// Thresholds a device's readings must respect while a freight is carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub freight_id: FreightId,
    pub device_id: DeviceId,
    /// Weight of the rule in the freight damage level, in `[0, 1]`.
    pub coefficient: f64,
    pub min_value: f64,
    pub max_value: f64,
    /// Largest tolerated distance of a single reading to the window.
    pub possible_deviation: f64,
    /// Observation window in seconds. Currently advisory, evaluation always
    /// covers the whole history.
    pub time_interval: u32,
    pub stats: RuleStats,
}

impl Rule {
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check the rule on its own.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Configuration`] when a number is not finite,
    /// the coefficient is outside `[0, 1]`, the bounds are inverted, the
    /// deviation is negative, or the time interval is zero.
    pub fn validate(&self) -> Result<(), TerminalError> {
        for (field, value) in [
            ("coefficient", self.coefficient),
            ("min_value", self.min_value),
            ("max_value", self.max_value),
            ("possible_deviation", self.possible_deviation),
        ] {
            if !value.is_finite() {
                return Err(ConfigurationError::NotFinite { field }.into());
            }
        }
        if !(0.0..=1.0).contains(&self.coefficient) {
            return Err(ConfigurationError::CoefficientOutOfRange.into());
        }
        if self.max_value < self.min_value {
            return Err(ConfigurationError::InvertedBounds.into());
        }
        if self.possible_deviation < 0.0 {
            return Err(ConfigurationError::NegativeDeviation.into());
        }
        if self.time_interval == 0 {
            return Err(ConfigurationError::EmptyTimeInterval.into());
        }
        Ok(())
    }

    /// Check that the thresholds fit inside the device range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::RuleOutsideDevice`] attributed to the
    /// offending bound.
    pub fn validate_against(&self, device: &Device) -> Result<(), ConfigurationError> {
        let outside = |field| ConfigurationError::RuleOutsideDevice {
            field,
            min: device.min_value,
            max: device.max_value,
        };
        if !device.accepts(self.min_value) {
            return Err(outside("min_value"));
        }
        if !device.accepts(self.max_value) {
            return Err(outside("max_value"));
        }
        Ok(())
    }

    /// Check that adding this rule to `siblings` keeps the freight within
    /// [`COEFFICIENT_BUDGET`].
    ///
    /// `siblings` may contain the rule itself, it is skipped by id so the
    /// check also covers updates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::CoefficientBudgetExceeded`] with the
    /// resulting total.
    pub fn check_coefficient_budget(&self, siblings: &[Rule]) -> Result<(), ConfigurationError> {
        let total = self.coefficient
            + siblings
                .iter()
                .filter(|other| other.id != self.id)
                .map(|other| other.coefficient)
                .sum::<f64>();
        if total > COEFFICIENT_BUDGET + BUDGET_TOLERANCE {
            return Err(ConfigurationError::CoefficientBudgetExceeded { total });
        }
        Ok(())
    }

    /// Fold a new reading into the running statistics.
    pub fn observe(&mut self, value: f64) -> Observation {
        let observation = damage::observe(self.min_value, self.max_value, value);
        self.stats.apply(observation);
        observation
    }

    /// Rebuild the statistics from the full history, after the thresholds
    /// changed or a state was removed.
    pub fn recompute_stats(&mut self, states: &[State]) {
        self.stats = RuleStats::from_states(self.min_value, self.max_value, states);
    }

    /// Current verdict according to the running statistics.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.stats.verdict(self.possible_deviation)
    }
}

#[derive(Debug)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    freight_id: Option<FreightId>,
    device_id: Option<DeviceId>,
    coefficient: f64,
    min_value: f64,
    max_value: f64,
    possible_deviation: f64,
    time_interval: u32,
    stats: RuleStats,
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self {
            id: None,
            freight_id: None,
            device_id: None,
            coefficient: 0.0,
            min_value: 0.0,
            max_value: 0.0,
            possible_deviation: 0.0,
            time_interval: DEFAULT_TIME_INTERVAL,
            stats: RuleStats::default(),
        }
    }
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn freight_id(mut self, freight_id: FreightId) -> Self {
        self.freight_id = Some(freight_id);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn coefficient(mut self, coefficient: f64) -> Self {
        self.coefficient = coefficient;
        self
    }

    #[must_use]
    pub fn bounds(mut self, min_value: f64, max_value: f64) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    #[must_use]
    pub fn possible_deviation(mut self, possible_deviation: f64) -> Self {
        self.possible_deviation = possible_deviation;
        self
    }

    #[must_use]
    pub fn time_interval(mut self, seconds: u32) -> Self {
        self.time_interval = seconds;
        self
    }

    #[must_use]
    pub fn stats(mut self, stats: RuleStats) -> Self {
        self.stats = stats;
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// # Errors
    ///
    /// Returns the first invariant violated, see [`Rule::validate`].
    pub fn build(self) -> Result<Rule, TerminalError> {
        let rule = Rule {
            id: self.id.unwrap_or_default(),
            freight_id: self.freight_id.unwrap_or_default(),
            device_id: self.device_id.unwrap_or_default(),
            coefficient: self.coefficient,
            min_value: self.min_value,
            max_value: self.max_value,
            possible_deviation: self.possible_deviation,
            time_interval: self.time_interval,
            stats: self.stats,
        };
        rule.validate()?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(coefficient: f64) -> Rule {
        Rule::builder()
            .coefficient(coefficient)
            .bounds(2.0, 8.0)
            .possible_deviation(1.0)
            .build()
            .unwrap()
    }

    fn thermometer() -> Device {
        Device::builder()
            .name("thermometer")
            .bounds(-40.0, 60.0)
            .build()
            .unwrap()
    }

    #[test]
    fn should_default_time_interval_to_one_hour() {
        assert_eq!(rule(0.5).time_interval, 3600);
    }

    #[test]
    fn should_reject_coefficient_above_one() {
        let result = Rule::builder().coefficient(1.2).bounds(0.0, 1.0).build();
        assert!(matches!(
            result,
            Err(TerminalError::Configuration(ConfigurationError::CoefficientOutOfRange))
        ));
    }

    #[test]
    fn should_reject_inverted_bounds() {
        let result = Rule::builder().coefficient(0.1).bounds(5.0, 1.0).build();
        assert!(matches!(
            result,
            Err(TerminalError::Configuration(ConfigurationError::InvertedBounds))
        ));
    }

    #[test]
    fn should_reject_negative_deviation() {
        let result = Rule::builder()
            .coefficient(0.1)
            .bounds(0.0, 1.0)
            .possible_deviation(-0.5)
            .build();
        assert!(matches!(
            result,
            Err(TerminalError::Configuration(ConfigurationError::NegativeDeviation))
        ));
    }

    #[test]
    fn should_accept_rule_inside_device_range() {
        assert!(rule(0.5).validate_against(&thermometer()).is_ok());
    }

    #[test]
    fn should_reject_rule_exceeding_device_range() {
        let mut wide = rule(0.5);
        wide.max_value = 80.0;
        assert!(matches!(
            wide.validate_against(&thermometer()),
            Err(ConfigurationError::RuleOutsideDevice {
                field: "max_value",
                ..
            })
        ));
    }

    #[test]
    fn should_reject_budget_overflow() {
        let siblings = [rule(0.6)];
        let result = rule(0.5).check_coefficient_budget(&siblings);
        assert!(matches!(
            result,
            Err(ConfigurationError::CoefficientBudgetExceeded { .. })
        ));
    }

    #[test]
    fn should_accept_budget_summing_to_exactly_one() {
        let siblings = [rule(0.1), rule(0.2), rule(0.3)];
        assert!(rule(0.4).check_coefficient_budget(&siblings).is_ok());
    }

    #[test]
    fn should_skip_itself_when_checking_budget_on_update() {
        let mut current = rule(0.6);
        let siblings = [current.clone(), rule(0.3)];
        current.coefficient = 0.7;
        assert!(current.check_coefficient_budget(&siblings).is_ok());
    }

    #[test]
    fn should_fold_observations_into_stats() {
        let mut rule = rule(0.5);
        rule.observe(5.0);
        let observation = rule.observe(9.5);

        assert!(observation.out_of_limit);
        assert_eq!(rule.stats.state_count, 2);
        assert_eq!(rule.stats.out_of_limit_count, 1);
        assert_eq!(rule.verdict(), Verdict::Violated);
    }
}
