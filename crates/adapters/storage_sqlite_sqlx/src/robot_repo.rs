//! `SQLite` implementation of [`RobotRepository`].

use std::future::Future;

use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::query::Query;
use sqlx::{FromRow, Row, Sqlite, SqlitePool};

use freight_terminal_app::ports::RobotRepository;
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::id::{CompanyId, RobotId};
use freight_terminal_domain::robot::{Robot, RobotStatus};

use crate::decode::parsed;
use crate::error::StorageError;

struct Wrapper(Robot);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Robot {
            id: parsed(row, "id")?,
            company_id: parsed(row, "company_id")?,
            model: row.try_get("model")?,
            kind: parsed(row, "type")?,
            status: parsed(row, "status")?,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO robots (id, company_id, model, type, status) VALUES (?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM robots WHERE id = ?";
const SELECT_BY_COMPANY: &str = "SELECT * FROM robots WHERE company_id = ? ORDER BY rowid";
const UPDATE: &str = "UPDATE robots SET model = ?, type = ?, status = ? WHERE id = ?";
const UPDATE_STATUS: &str = "UPDATE robots SET status = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM robots WHERE id = ?";

pub(crate) fn set_status(
    id: RobotId,
    status: RobotStatus,
) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(UPDATE_STATUS)
        .bind(status.as_str())
        .bind(id.to_string())
}

/// `SQLite`-backed robot repository.
#[derive(Clone)]
pub struct SqliteRobotRepository {
    pool: SqlitePool,
}

impl SqliteRobotRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RobotRepository for SqliteRobotRepository {
    fn create(&self, robot: Robot) -> impl Future<Output = Result<Robot, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(robot.id.to_string())
                .bind(robot.company_id.to_string())
                .bind(&robot.model)
                .bind(robot.kind.as_str())
                .bind(robot.status.as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(robot)
        }
    }

    fn get_by_id(
        &self,
        id: RobotId,
    ) -> impl Future<Output = Result<Option<Robot>, TerminalError>> + Send {
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

    fn find_by_company(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<Robot>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_COMPANY)
                .bind(company_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(&self, robot: Robot) -> impl Future<Output = Result<Robot, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&robot.model)
                .bind(robot.kind.as_str())
                .bind(robot.status.as_str())
                .bind(robot.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(robot)
        }
    }

    fn delete(&self, id: RobotId) -> impl Future<Output = Result<(), TerminalError>> + Send {
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
