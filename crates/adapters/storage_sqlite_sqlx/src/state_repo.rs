//! `SQLite` implementation of [`StateRepository`].

use std::future::Future;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Row, Sqlite, SqlitePool};

use freight_terminal_app::ports::StateRepository;
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::id::{RuleId, StateId};
use freight_terminal_domain::state::State;

use crate::decode::{parsed, timestamp};
use crate::error::StorageError;

struct Wrapper(State);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(State {
            id: parsed(row, "id")?,
            rule_id: parsed(row, "rule_id")?,
            value: row.try_get("value")?,
            timestamp: timestamp(row, "timestamp")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO states (id, rule_id, value, timestamp) VALUES (?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM states WHERE id = ?";
const SELECT_BY_RULE: &str = "SELECT * FROM states WHERE rule_id = ? ORDER BY rowid";
const DELETE_BY_ID: &str = "DELETE FROM states WHERE id = ?";

pub(crate) fn insert(state: &State) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(INSERT)
        .bind(state.id.to_string())
        .bind(state.rule_id.to_string())
        .bind(state.value)
        .bind(state.timestamp.to_rfc3339())
}

pub(crate) fn delete(id: StateId) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(DELETE_BY_ID).bind(id.to_string())
}

/// `SQLite`-backed, read-only state repository. States are written by
/// [`SqliteUnitOfWork`](crate::SqliteUnitOfWork) together with the
/// statistics of their rule.
#[derive(Clone)]
pub struct SqliteStateRepository {
    pool: SqlitePool,
}

impl SqliteStateRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl StateRepository for SqliteStateRepository {
    fn get_by_id(
        &self,
        id: StateId,
    ) -> impl Future<Output = Result<Option<State>, TerminalError>> + Send {
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

    fn find_by_rule(
        &self,
        rule_id: RuleId,
    ) -> impl Future<Output = Result<Vec<State>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_RULE)
                .bind(rule_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
