//! Damage engine — turns rule observations into damage verdicts.
//!
//! Two signals mark a freight as damaged:
//!
//! - the **per-state verdict**: evaluated after each recorded state. A single
//!   out-of-bound reading whose deviation exceeds the rule's tolerance
//!   violates the rule immediately; otherwise the rule is violated once the
//!   share of out-of-bound readings exceeds [`DAMAGE_THRESHOLD`].
//! - the **health check**: a weighted sum of `coefficient × violation
//!   probability` over the rules with more than [`MIN_NUMBER_OF_STATES`]
//!   observations, compared against the same threshold.
//!
//! Both signals only ever set the damage flag, never clear it.
//!
//! Rules keep [`RuleStats`] up to date on every insert so the per-state
//! verdict does not rescan the whole history. [`evaluate`] is the reference
//! rescan and is used when the statistics must be rebuilt.

use serde::{Deserialize, Serialize};

use crate::freight::Freight;
use crate::rule::Rule;
use crate::state::State;

/// Share of violations above which a freight is considered damaged.
pub const DAMAGE_THRESHOLD: f64 = 0.2;

/// A rule needs strictly more observations than this to count in the
/// health check.
pub const MIN_NUMBER_OF_STATES: u32 = 10;

/// Outcome of evaluating one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Violated,
    NotViolated,
}

impl Verdict {
    #[must_use]
    pub fn is_violated(self) -> bool {
        self == Self::Violated
    }
}

/// How far `value` lies outside `[min_value, max_value]`, or `None` when it
/// is inside.
///
/// The distance is measured to the nearest bound.
#[must_use]
pub fn deviation(min_value: f64, max_value: f64, value: f64) -> Option<f64> {
    if value < min_value || value > max_value {
        Some((value - max_value).abs().min((value - min_value).abs()))
    } else {
        None
    }
}

/// Evaluate a rule against its full state history, in insertion order.
///
/// Returns [`Verdict::Violated`] as soon as one out-of-bound reading
/// deviates by more than `possible_deviation`. Otherwise the rule is
/// violated when the out-of-limit ratio exceeds [`DAMAGE_THRESHOLD`]. An
/// empty history is never violated.
#[must_use]
pub fn evaluate(rule: &Rule, states: &[State]) -> Verdict {
    let mut out_of_limit = 0_u32;

    for state in states {
        if let Some(dev) = deviation(rule.min_value, rule.max_value, state.value) {
            out_of_limit = out_of_limit.saturating_add(1);
            if dev > rule.possible_deviation {
                return Verdict::Violated;
            }
        }
    }

    let total = u32::try_from(states.len()).unwrap_or(u32::MAX);
    if ratio(out_of_limit, total) > DAMAGE_THRESHOLD {
        Verdict::Violated
    } else {
        Verdict::NotViolated
    }
}

fn ratio(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(total)
    }
}

/// Contribution of a single reading to a rule's statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub out_of_limit: bool,
    /// Distance to the nearest bound, `0.0` for in-bound readings.
    pub deviation: f64,
}

/// Running counters kept per rule.
///
/// `max_deviation` only considers out-of-bound readings, so comparing it
/// with the rule tolerance is equivalent to the early exit of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleStats {
    pub state_count: u32,
    pub out_of_limit_count: u32,
    pub max_deviation: f64,
}

impl RuleStats {
    /// Rebuild the counters from a full history.
    #[must_use]
    pub fn from_states(min_value: f64, max_value: f64, states: &[State]) -> Self {
        let mut stats = Self::default();
        for state in states {
            stats.apply(observe(min_value, max_value, state.value));
        }
        stats
    }

    /// Fold one observation into the counters.
    pub fn apply(&mut self, observation: Observation) {
        self.state_count = self.state_count.saturating_add(1);
        if observation.out_of_limit {
            self.out_of_limit_count = self.out_of_limit_count.saturating_add(1);
            self.max_deviation = self.max_deviation.max(observation.deviation);
        }
    }

    /// Share of out-of-bound readings, `0.0` without readings.
    #[must_use]
    pub fn violation_probability(&self) -> f64 {
        ratio(self.out_of_limit_count, self.state_count)
    }

    /// Verdict for a rule tolerating `possible_deviation`.
    #[must_use]
    pub fn verdict(&self, possible_deviation: f64) -> Verdict {
        if self.max_deviation > possible_deviation
            || self.violation_probability() > DAMAGE_THRESHOLD
        {
            Verdict::Violated
        } else {
            Verdict::NotViolated
        }
    }
}

/// Classify a single reading against the operating window.
#[must_use]
pub fn observe(min_value: f64, max_value: f64, value: f64) -> Observation {
    match deviation(min_value, max_value, value) {
        Some(deviation) => Observation {
            out_of_limit: true,
            deviation,
        },
        None => Observation {
            out_of_limit: false,
            deviation: 0.0,
        },
    }
}

/// Weighted damage level of a freight's rules.
///
/// Rules with [`MIN_NUMBER_OF_STATES`] observations or fewer are skipped.
/// The plain out-of-limit ratio is used here, without the single-outlier
/// shortcut of the per-state verdict.
#[must_use]
pub fn damage_level(rules: &[Rule]) -> f64 {
    rules
        .iter()
        .filter(|rule| rule.stats.state_count > MIN_NUMBER_OF_STATES)
        .map(|rule| rule.coefficient * rule.stats.violation_probability())
        .sum()
}

/// Result of an on-demand health check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub damage_level: f64,
    pub is_damaged: bool,
}

/// Run the health check for `freight`.
///
/// `is_damaged` stays `true` for a freight that was already flagged.
#[must_use]
pub fn assess(freight: &Freight, rules: &[Rule]) -> HealthReport {
    let level = damage_level(rules);
    HealthReport {
        damage_level: level,
        is_damaged: freight.is_damaged || level > DAMAGE_THRESHOLD,
    }
}
