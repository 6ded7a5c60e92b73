//! Monitoring service — sensor readings and freight damage detection.
//!
//! Every recorded state updates the running statistics of its rule in the
//! same commit. When the rule verdict turns to violated, the freight is
//! flagged and its return started, still within that commit.

use freight_terminal_domain::changeset::{Change, ChangeSet};
use freight_terminal_domain::damage::{self, HealthReport, RuleStats, Verdict};
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::event::{Event, EventType};
use freight_terminal_domain::freight::Freight;
use freight_terminal_domain::id::{FreightId, RuleId, StateId};
use freight_terminal_domain::lifecycle::plan_damage;
use freight_terminal_domain::rule::Rule;
use freight_terminal_domain::state::State;

use super::cascade::load_pair;
use super::{announce, not_found};
use crate::ports::{
    DeviceRepository, EventPublisher, FreightRepository, RuleRepository, ServiceRepository,
    StateRepository, TransferRepository, UnitOfWork,
};

/// A stored reading with the verdict of its rule after it was counted.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedState {
    pub state: State,
    pub verdict: Verdict,
}

/// Application service for states and damage assessment.
pub struct MonitoringService<FR, RR, DR, STR, TR, SR, U, P> {
    freights: FR,
    rules: RR,
    devices: DR,
    states: STR,
    transfers: TR,
    services: SR,
    unit_of_work: U,
    publisher: P,
}

impl<FR, RR, DR, STR, TR, SR, U, P> MonitoringService<FR, RR, DR, STR, TR, SR, U, P>
where
    FR: FreightRepository,
    RR: RuleRepository,
    DR: DeviceRepository,
    STR: StateRepository,
    TR: TransferRepository,
    SR: ServiceRepository,
    U: UnitOfWork,
    P: EventPublisher,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        freights: FR,
        rules: RR,
        devices: DR,
        states: STR,
        transfers: TR,
        services: SR,
        unit_of_work: U,
        publisher: P,
    ) -> Self {
        Self {
            freights,
            rules,
            devices,
            states,
            transfers,
            services,
            unit_of_work,
            publisher,
        }
    }

    async fn load_freight(&self, id: FreightId) -> Result<Freight, TerminalError> {
        self.freights
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Freight", id))
    }

    async fn load_rule(&self, freight_id: FreightId, id: RuleId) -> Result<Rule, TerminalError> {
        self.rules
            .get_by_id(id)
            .await?
            .filter(|rule| rule.freight_id == freight_id)
            .ok_or_else(|| not_found("Rule", id))
    }

    /// Record a reading for a rule of the freight.
    ///
    /// A violated verdict flags the freight and starts its return. When the
    /// return cannot start (no transfer, or already on its way back) the
    /// freight is still flagged and the state is still recorded.
    ///
    /// # Errors
    ///
    /// - [`TerminalError::NotFound`] for an unknown freight, rule, or device
    /// - [`TerminalError::Configuration`] when the value is not finite or
    ///   outside the device range
    #[tracing::instrument(skip(self))]
    pub async fn record_state(
        &self,
        freight_id: FreightId,
        rule_id: RuleId,
        value: f64,
    ) -> Result<RecordedState, TerminalError> {
        let freight = self.load_freight(freight_id).await?;
        let mut rule = self.load_rule(freight_id, rule_id).await?;
        let device = self
            .devices
            .get_by_id(rule.device_id)
            .await?
            .ok_or_else(|| not_found("Device", rule.device_id))?;

        let state = State::new(rule.id, value);
        state.validate_against(&device)?;
        let observation = rule.observe(value);
        let verdict = rule.verdict();

        let mut changes = ChangeSet::new().with(Change::RecordState {
            state: state.clone(),
            observation,
        });

        let mut newly_damaged = false;
        let mut return_started = false;
        if verdict.is_violated() {
            let pair = load_pair(&self.transfers, &self.services, &freight).await?;
            let plan = plan_damage(&freight, pair.as_ref());
            if let Some(reason) = &plan.return_skipped {
                tracing::warn!(
                    freight_id = %freight.id,
                    reason = %reason,
                    "damage detected but freight return not started"
                );
            }
            newly_damaged = plan.newly_damaged;
            return_started = plan.return_started;
            changes.extend(plan.changes);
        }
        self.unit_of_work.commit(changes).await?;

        announce(
            &self.publisher,
            Event::new(
                EventType::StateRecorded,
                serde_json::json!({
                    "freight_id": freight.id,
                    "rule_id": rule.id,
                    "state_id": state.id,
                    "value": value,
                    "verdict": verdict,
                }),
            ),
        )
        .await;
        if newly_damaged {
            tracing::warn!(freight_id = %freight.id, rule_id = %rule.id, "freight damaged");
            announce(
                &self.publisher,
                Event::new(
                    EventType::FreightDamaged,
                    serde_json::json!({ "freight_id": freight.id, "rule_id": rule.id }),
                ),
            )
            .await;
        }
        if return_started {
            announce(
                &self.publisher,
                Event::new(
                    EventType::FreightReturnStarted,
                    serde_json::json!({ "freight_id": freight.id, "reason": "damaged" }),
                ),
            )
            .await;
        }

        Ok(RecordedState { state, verdict })
    }

    /// States of a rule in recording order.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the rule is not one of the
    /// freight's.
    pub async fn list_states(
        &self,
        freight_id: FreightId,
        rule_id: RuleId,
    ) -> Result<Vec<State>, TerminalError> {
        self.load_rule(freight_id, rule_id).await?;
        self.states.find_by_rule(rule_id).await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] unless the state belongs to the
    /// rule, and the rule to the freight.
    pub async fn get_state(
        &self,
        freight_id: FreightId,
        rule_id: RuleId,
        id: StateId,
    ) -> Result<State, TerminalError> {
        self.load_rule(freight_id, rule_id).await?;
        self.states
            .get_by_id(id)
            .await?
            .filter(|state| state.rule_id == rule_id)
            .ok_or_else(|| not_found("State", id))
    }

    /// Remove a reading and rebuild the statistics of its rule without it.
    ///
    /// The freight damage flag is left as is.
    ///
    /// # Errors
    ///
    /// Same as [`MonitoringService::get_state`].
    #[tracing::instrument(skip(self))]
    pub async fn delete_state(
        &self,
        freight_id: FreightId,
        rule_id: RuleId,
        id: StateId,
    ) -> Result<(), TerminalError> {
        let rule = self.load_rule(freight_id, rule_id).await?;
        self.get_state(freight_id, rule_id, id).await?;

        let remaining: Vec<State> = self
            .states
            .find_by_rule(rule_id)
            .await?
            .into_iter()
            .filter(|state| state.id != id)
            .collect();
        let stats = RuleStats::from_states(rule.min_value, rule.max_value, &remaining);

        let changes = ChangeSet::new()
            .with(Change::DeleteState(id))
            .with(Change::ReplaceRuleStats { rule_id, stats });
        self.unit_of_work.commit(changes).await
    }

    /// Weighted damage level of the freight across its rules.
    ///
    /// A freight found damaged is flagged. Its return is not started from
    /// here.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] for an unknown freight.
    #[tracing::instrument(skip(self))]
    pub async fn check_health(&self, freight_id: FreightId) -> Result<HealthReport, TerminalError> {
        let mut freight = self.load_freight(freight_id).await?;
        let rules = self.rules.find_by_freight(freight_id).await?;
        let report = damage::assess(&freight, &rules);
        tracing::debug!(
            freight_id = %freight_id,
            damage_level = report.damage_level,
            "freight health assessed"
        );

        if report.is_damaged && freight.mark_damaged() {
            let from = freight.status;
            self.unit_of_work
                .commit(ChangeSet::new().with(Change::UpdateFreight { freight, from }))
                .await?;
            tracing::warn!(freight_id = %freight_id, damage_level = report.damage_level, "freight damaged");
            announce(
                &self.publisher,
                Event::new(
                    EventType::FreightDamaged,
                    serde_json::json!({
                        "freight_id": freight_id,
                        "damage_level": report.damage_level,
                    }),
                ),
            )
            .await;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryStore, RecordingPublisher};
    use freight_terminal_domain::device::Device;
    use freight_terminal_domain::error::ConfigurationError;
    use freight_terminal_domain::freight::FreightStatus;
    use freight_terminal_domain::robot::{Robot, RobotStatus};
    use freight_terminal_domain::service::{Service, ServiceStatus, ServiceType};
    use freight_terminal_domain::transfer::Transfer;

    type Monitoring = MonitoringService<
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        RecordingPublisher,
    >;

    struct Fixture {
        store: InMemoryStore,
        publisher: RecordingPublisher,
        monitoring: Monitoring,
        freight: Freight,
        rule: Rule,
    }

    /// A freight with one cold-chain rule (2..8, tolerance 1) on a
    /// thermometer, optionally carried by a transfer in transit.
    fn fixture(with_transfer: bool) -> Fixture {
        let store = InMemoryStore::default();
        let publisher = RecordingPublisher::default();
        let device = Device::builder()
            .name("thermometer")
            .bounds(-40.0, 60.0)
            .build()
            .unwrap();

        let mut freight = Freight::builder().name("Vaccines");
        if with_transfer {
            let robot = Robot::builder()
                .model("R2")
                .status(RobotStatus::Busy)
                .build()
                .unwrap();
            let delivery = Service::builder()
                .robot_id(robot.id)
                .kind(ServiceType::Delivery)
                .status(ServiceStatus::InTransitWithFreight)
                .build();
            let reception = Service::builder()
                .robot_id(robot.id)
                .kind(ServiceType::Reception)
                .build();
            let transfer = Transfer::pair(&delivery, &reception).unwrap();
            freight = freight
                .transfer_id(transfer.id)
                .status(FreightStatus::InDeliveryTransit);
            store.with(|t| {
                t.robots.push(robot);
                t.services.extend([delivery, reception]);
                t.transfers.push(transfer);
            });
        }
        let freight = freight.build().unwrap();
        let rule = Rule::builder()
            .freight_id(freight.id)
            .device_id(device.id)
            .coefficient(1.0)
            .bounds(2.0, 8.0)
            .possible_deviation(1.0)
            .build()
            .unwrap();
        store.with(|t| {
            t.devices.push(device);
            t.freights.push(freight.clone());
            t.rules.push(rule.clone());
        });

        let monitoring = MonitoringService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            publisher.clone(),
        );
        Fixture {
            store,
            publisher,
            monitoring,
            freight,
            rule,
        }
    }

    impl Fixture {
        async fn record(&self, value: f64) -> RecordedState {
            self.monitoring
                .record_state(self.freight.id, self.rule.id, value)
                .await
                .unwrap()
        }

        fn stored_freight(&self) -> Freight {
            self.store
                .with(|t| t.freights.iter().find(|f| f.id == self.freight.id).cloned())
                .unwrap()
        }

        fn stored_rule(&self) -> Rule {
            self.store
                .with(|t| t.rules.iter().find(|r| r.id == self.rule.id).cloned())
                .unwrap()
        }
    }

    #[tokio::test]
    async fn should_record_in_bound_state_without_damage() {
        let fx = fixture(true);

        let recorded = fx.record(5.0).await;

        assert_eq!(recorded.verdict, Verdict::NotViolated);
        assert!(!fx.stored_freight().is_damaged);
        assert_eq!(fx.stored_rule().stats.state_count, 1);
        assert_eq!(fx.publisher.kinds(), [EventType::StateRecorded]);
    }

    #[tokio::test]
    async fn should_reject_value_outside_device_range() {
        let fx = fixture(true);

        let result = fx
            .monitoring
            .record_state(fx.freight.id, fx.rule.id, 75.0)
            .await;

        assert!(matches!(
            result,
            Err(TerminalError::Configuration(ConfigurationError::ValueOutsideDevice { .. }))
        ));
        assert!(fx.store.with(|t| t.states.is_empty()));
    }

    #[tokio::test]
    async fn should_flag_and_return_freight_on_large_deviation() {
        let fx = fixture(true);
        for _ in 0..5 {
            fx.record(5.0).await;
        }

        let recorded = fx.record(10.0).await;

        assert_eq!(recorded.verdict, Verdict::Violated);
        let freight = fx.stored_freight();
        assert!(freight.is_damaged);
        assert_eq!(freight.status, FreightStatus::Returning);
        let statuses: Vec<_> = fx.store.with(|t| t.services.iter().map(|s| s.status).collect());
        assert_eq!(
            statuses,
            [ServiceStatus::ReturningFreight, ServiceStatus::ReturningFreight]
        );
        assert!(fx.publisher.kinds().ends_with(&[
            EventType::StateRecorded,
            EventType::FreightDamaged,
            EventType::FreightReturnStarted,
        ]));
    }

    #[tokio::test]
    async fn should_flag_freight_when_out_of_limit_ratio_exceeds_threshold() {
        let fx = fixture(true);
        for _ in 0..3 {
            fx.record(5.0).await;
        }
        // within tolerance each, but 1 of 4 out of limit
        let recorded = fx.record(8.5).await;

        assert_eq!(recorded.verdict, Verdict::Violated);
        assert!(fx.stored_freight().is_damaged);
    }

    #[tokio::test]
    async fn should_record_state_and_flag_when_freight_has_no_transfer() {
        let fx = fixture(false);

        let recorded = fx.record(12.0).await;

        assert_eq!(recorded.verdict, Verdict::Violated);
        let freight = fx.stored_freight();
        assert!(freight.is_damaged);
        assert_eq!(freight.status, FreightStatus::NotAssigned);
        assert_eq!(fx.store.with(|t| t.states.len()), 1);
        assert_eq!(
            fx.publisher.kinds(),
            [EventType::StateRecorded, EventType::FreightDamaged]
        );
    }

    #[tokio::test]
    async fn should_not_restart_return_of_returning_freight() {
        let fx = fixture(true);
        fx.record(12.0).await;

        fx.record(13.0).await;

        assert_eq!(fx.stored_freight().status, FreightStatus::Returning);
        assert_eq!(fx.store.with(|t| t.states.len()), 2);
        assert_eq!(fx.publisher.kinds().last(), Some(&EventType::StateRecorded));
    }

    #[tokio::test]
    async fn should_hide_states_of_another_rule() {
        let fx = fixture(false);
        let recorded = fx.record(5.0).await;

        assert!(matches!(
            fx.monitoring
                .get_state(fx.freight.id, RuleId::new(), recorded.state.id)
                .await,
            Err(TerminalError::NotFound(_))
        ));
        assert_eq!(
            fx.monitoring
                .list_states(fx.freight.id, fx.rule.id)
                .await
                .unwrap(),
            [recorded.state]
        );
    }

    #[tokio::test]
    async fn should_rebuild_stats_when_state_deleted() {
        let fx = fixture(false);
        fx.record(5.0).await;
        let outlier = fx.record(8.5).await;

        fx.monitoring
            .delete_state(fx.freight.id, fx.rule.id, outlier.state.id)
            .await
            .unwrap();

        let stats = fx.stored_rule().stats;
        assert_eq!(stats.state_count, 1);
        assert_eq!(stats.out_of_limit_count, 0);
        assert!(fx.stored_freight().is_damaged);
    }

    #[tokio::test]
    async fn should_report_healthy_freight_below_min_states() {
        let fx = fixture(false);
        fx.store.with(|t| {
            t.rules[0].stats = RuleStats {
                state_count: 10,
                out_of_limit_count: 10,
                max_deviation: 0.0,
            };
        });

        let report = fx.monitoring.check_health(fx.freight.id).await.unwrap();

        assert!(report.damage_level.abs() < f64::EPSILON);
        assert!(!report.is_damaged);
    }

    #[tokio::test]
    async fn should_flag_freight_when_damage_level_exceeds_threshold() {
        let fx = fixture(true);
        fx.store.with(|t| {
            t.rules[0].stats = RuleStats {
                state_count: 20,
                out_of_limit_count: 5,
                max_deviation: 0.5,
            };
        });

        let report = fx.monitoring.check_health(fx.freight.id).await.unwrap();

        assert!((report.damage_level - 0.25).abs() < 1e-9);
        assert!(report.is_damaged);
        let freight = fx.stored_freight();
        assert!(freight.is_damaged);
        assert_eq!(freight.status, FreightStatus::InDeliveryTransit);
        assert_eq!(fx.publisher.kinds(), [EventType::FreightDamaged]);
    }
}
