//! `SQLite` implementation of [`RuleRepository`].
//!
//! The running statistics of a rule are stored in its row and folded in by
//! the unit of work as states are recorded.

use std::future::Future;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Row, Sqlite, SqlitePool};

use freight_terminal_app::ports::RuleRepository;
use freight_terminal_domain::damage::{Observation, RuleStats};
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::id::{FreightId, RuleId};
use freight_terminal_domain::rule::Rule;

use crate::decode::parsed;
use crate::error::StorageError;

struct Wrapper(Rule);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Rule {
            id: parsed(row, "id")?,
            freight_id: parsed(row, "freight_id")?,
            device_id: parsed(row, "device_id")?,
            coefficient: row.try_get("coefficient")?,
            min_value: row.try_get("min_value")?,
            max_value: row.try_get("max_value")?,
            possible_deviation: row.try_get("possible_deviation")?,
            time_interval: row.try_get("time_interval")?,
            stats: RuleStats {
                state_count: row.try_get("state_count")?,
                out_of_limit_count: row.try_get("out_of_limit_count")?,
                max_deviation: row.try_get("max_deviation")?,
            },
        }))
    }
}

const INSERT: &str = "INSERT INTO rules (id, freight_id, device_id, coefficient, min_value, max_value, possible_deviation, time_interval, state_count, out_of_limit_count, max_deviation) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM rules WHERE id = ?";
const SELECT_BY_FREIGHT: &str = "SELECT * FROM rules WHERE freight_id = ? ORDER BY rowid";
const UPDATE: &str = "UPDATE rules SET device_id = ?, coefficient = ?, min_value = ?, max_value = ?, possible_deviation = ?, time_interval = ?, state_count = ?, out_of_limit_count = ?, max_deviation = ? WHERE id = ?";
const UPDATE_STATS: &str =
    "UPDATE rules SET state_count = ?, out_of_limit_count = ?, max_deviation = ? WHERE id = ?";
const FOLD_OBSERVATION: &str = "UPDATE rules SET state_count = state_count + 1, out_of_limit_count = out_of_limit_count + ?, max_deviation = MAX(max_deviation, ?) WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM rules WHERE id = ?";

pub(crate) fn replace_stats(
    rule_id: RuleId,
    stats: RuleStats,
) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(UPDATE_STATS)
        .bind(stats.state_count)
        .bind(stats.out_of_limit_count)
        .bind(stats.max_deviation)
        .bind(rule_id.to_string())
}

/// Count one more state and raise the maximum deviation if needed.
pub(crate) fn fold_observation(
    rule_id: RuleId,
    observation: Observation,
) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    let (out_of_limit, deviation) = if observation.out_of_limit {
        (1_u32, observation.deviation)
    } else {
        (0, 0.0)
    };
    sqlx::query(FOLD_OBSERVATION)
        .bind(out_of_limit)
        .bind(deviation)
        .bind(rule_id.to_string())
}

/// `SQLite`-backed rule repository.
#[derive(Clone)]
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(rule.id.to_string())
                .bind(rule.freight_id.to_string())
                .bind(rule.device_id.to_string())
                .bind(rule.coefficient)
                .bind(rule.min_value)
                .bind(rule.max_value)
                .bind(rule.possible_deviation)
                .bind(rule.time_interval)
                .bind(rule.stats.state_count)
                .bind(rule.stats.out_of_limit_count)
                .bind(rule.stats.max_deviation)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rule)
        }
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn find_by_freight(
        &self,
        freight_id: FreightId,
    ) -> impl Future<Output = Result<Vec<Rule>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_FREIGHT)
                .bind(freight_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(rule.device_id.to_string())
                .bind(rule.coefficient)
                .bind(rule.min_value)
                .bind(rule.max_value)
                .bind(rule.possible_deviation)
                .bind(rule.time_interval)
                .bind(rule.stats.state_count)
                .bind(rule.stats.out_of_limit_count)
                .bind(rule.stats.max_deviation)
                .bind(rule.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rule)
        }
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{database, seed_rule};

    #[tokio::test]
    async fn should_roundtrip_rule_with_stats() {
        let pool = database().await;
        let rule = seed_rule(&pool).await;
        let repo = SqliteRuleRepository::new(pool);

        assert_eq!(repo.get_by_id(rule.id).await.unwrap(), Some(rule.clone()));
        assert_eq!(repo.find_by_freight(rule.freight_id).await.unwrap(), [rule]);
    }

    #[tokio::test]
    async fn should_fold_observations_like_domain_stats() {
        let pool = database().await;
        let rule = seed_rule(&pool).await;
        let observations = [
            Observation { out_of_limit: false, deviation: 0.0 },
            Observation { out_of_limit: true, deviation: 1.5 },
            Observation { out_of_limit: true, deviation: 0.5 },
        ];
        let mut expected = rule.stats;
        for observation in observations {
            expected.apply(observation);
            fold_observation(rule.id, observation).execute(&pool).await.unwrap();
        }

        let stored = SqliteRuleRepository::new(pool)
            .get_by_id(rule.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.stats, expected);
    }

    #[tokio::test]
    async fn should_update_thresholds() {
        let pool = database().await;
        let mut rule = seed_rule(&pool).await;
        let repo = SqliteRuleRepository::new(pool);

        rule.max_value = 9.0;
        rule.time_interval = 60;
        repo.update(rule.clone()).await.unwrap();

        assert_eq!(repo.get_by_id(rule.id).await.unwrap(), Some(rule));
    }
}
