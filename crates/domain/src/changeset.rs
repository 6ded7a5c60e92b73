//! Change sets — the writes of one operation, planned before anything is
//! persisted.
//!
//! Workflows touching several entities (a robot and its new service, a
//! freight and both services of its transfer) compute a [`ChangeSet`]
//! from the current snapshot. The storage layer applies it in a single
//! transaction: either every change lands or none does.

use crate::damage::{Observation, RuleStats};
use crate::freight::{Freight, FreightStatus};
use crate::id::{RobotId, RuleId, ServiceId, StateId};
use crate::robot::RobotStatus;
use crate::service::{Service, ServiceStatus};
use crate::state::State;
use crate::transfer::Transfer;

/// A single write.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    CreateService(Service),
    SetServiceStatus { id: ServiceId, status: ServiceStatus },
    SetRobotStatus { id: RobotId, status: RobotStatus },
    CreateTransfer(Transfer),
    CreateFreight(Freight),
    /// Rewrite a freight read with status `from`. The damage flag is only
    /// ever raised by this write, never cleared.
    UpdateFreight { freight: Freight, from: FreightStatus },
    /// Insert a state and fold its observation into the rule counters.
    RecordState { state: State, observation: Observation },
    DeleteState(StateId),
    ReplaceRuleStats { rule_id: RuleId, stats: RuleStats },
}

/// Ordered list of writes, applied atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[must_use]
    pub fn with(mut self, change: Change) -> Self {
        self.push(change);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl Extend<Change> for ChangeSet {
    fn extend<I: IntoIterator<Item = Change>>(&mut self, iter: I) {
        self.changes.extend(iter);
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_insertion_order() {
        let robot_id = RobotId::new();
        let service = Service::builder().robot_id(robot_id).build();
        let set = ChangeSet::new()
            .with(Change::CreateService(service.clone()))
            .with(Change::SetRobotStatus {
                id: robot_id,
                status: RobotStatus::Busy,
            });

        assert_eq!(set.len(), 2);
        let mut iter = set.into_iter();
        assert_eq!(iter.next(), Some(Change::CreateService(service)));
        assert!(matches!(iter.next(), Some(Change::SetRobotStatus { .. })));
    }
}
