//! Rule service — thresholds attached to a freight.

use freight_terminal_domain::damage::RuleStats;
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::id::{FreightId, RuleId};
use freight_terminal_domain::rule::Rule;

use super::not_found;
use crate::ports::{DeviceRepository, FreightRepository, RuleRepository, StateRepository};

/// Application service for the rules of a freight.
pub struct RuleService<FR, RR, DR, STR> {
    freights: FR,
    rules: RR,
    devices: DR,
    states: STR,
}

impl<FR, RR, DR, STR> RuleService<FR, RR, DR, STR>
where
    FR: FreightRepository,
    RR: RuleRepository,
    DR: DeviceRepository,
    STR: StateRepository,
{
    pub fn new(freights: FR, rules: RR, devices: DR, states: STR) -> Self {
        Self {
            freights,
            rules,
            devices,
            states,
        }
    }

    async fn ensure_freight(&self, freight_id: FreightId) -> Result<(), TerminalError> {
        self.freights
            .get_by_id(freight_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found("Freight", freight_id))
    }

    /// Checks shared by create and update: the rule itself, its device
    /// range, and the coefficient budget of the freight.
    async fn check(&self, rule: &Rule) -> Result<(), TerminalError> {
        rule.validate()?;
        let device = self
            .devices
            .get_by_id(rule.device_id)
            .await?
            .ok_or_else(|| not_found("Device", rule.device_id))?;
        rule.validate_against(&device)?;
        let siblings = self.rules.find_by_freight(rule.freight_id).await?;
        rule.check_coefficient_budget(&siblings)?;
        Ok(())
    }

    /// Attach a rule to a freight. Any statistics on the input are
    /// discarded.
    ///
    /// # Errors
    ///
    /// - [`TerminalError::NotFound`] for an unknown freight or device
    /// - [`TerminalError::Configuration`] when the rule is invalid, exceeds
    ///   the device range, or pushes the coefficient total above one
    #[tracing::instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub async fn create_rule(
        &self,
        freight_id: FreightId,
        mut rule: Rule,
    ) -> Result<Rule, TerminalError> {
        self.ensure_freight(freight_id).await?;
        rule.freight_id = freight_id;
        rule.stats = RuleStats::default();
        self.check(&rule).await?;
        self.rules.create(rule).await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] for an unknown freight.
    pub async fn list_rules(&self, freight_id: FreightId) -> Result<Vec<Rule>, TerminalError> {
        self.ensure_freight(freight_id).await?;
        self.rules.find_by_freight(freight_id).await
    }

    /// Look up a rule of the given freight.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the rule does not exist or
    /// belongs to another freight.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(
        &self,
        freight_id: FreightId,
        id: RuleId,
    ) -> Result<Rule, TerminalError> {
        self.rules
            .get_by_id(id)
            .await?
            .filter(|rule| rule.freight_id == freight_id)
            .ok_or_else(|| not_found("Rule", id))
    }

    /// Replace the settings of a rule.
    ///
    /// Statistics are recomputed from the recorded states when the bounds
    /// move, and carried over otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`RuleService::create_rule`].
    #[tracing::instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub async fn update_rule(
        &self,
        freight_id: FreightId,
        mut rule: Rule,
    ) -> Result<Rule, TerminalError> {
        let current = self.get_rule(freight_id, rule.id).await?;
        rule.freight_id = freight_id;
        self.check(&rule).await?;

        #[allow(clippy::float_cmp)]
        let bounds_moved =
            rule.min_value != current.min_value || rule.max_value != current.max_value;
        if bounds_moved {
            let states = self.states.find_by_rule(rule.id).await?;
            rule.recompute_stats(&states);
            tracing::debug!(rule_id = %rule.id, states = states.len(), "rule statistics recomputed");
        } else {
            rule.stats = current.stats;
        }
        self.rules.update(rule).await
    }

    /// Delete a rule and its states.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the rule is not one of the
    /// freight's.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, freight_id: FreightId, id: RuleId) -> Result<(), TerminalError> {
        self.get_rule(freight_id, id).await?;
        self.rules.delete(id).await
    }
}
