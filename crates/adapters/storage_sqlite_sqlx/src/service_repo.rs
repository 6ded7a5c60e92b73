//! `SQLite` implementation of [`ServiceRepository`].
//!
//! Services are inserted and change status through the unit of work only,
//! the builders for those statements live here next to the row mapping.

use std::future::Future;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Row, Sqlite, SqlitePool};

use freight_terminal_app::ports::ServiceRepository;
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::id::{RobotId, ServiceId};
use freight_terminal_domain::service::{Service, ServiceStatus};

use crate::decode::{parsed, timestamp};
use crate::error::StorageError;

struct Wrapper(Service);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Service {
            id: parsed(row, "id")?,
            robot_id: parsed(row, "robot_id")?,
            kind: parsed(row, "type")?,
            arrival_datetime: timestamp(row, "arrival_datetime")?,
            delay_time: row.try_get("delay_time")?,
            status: parsed(row, "status")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO services (id, robot_id, type, arrival_datetime, delay_time, status) VALUES (?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM services WHERE id = ?";
const SELECT_BY_ROBOT: &str = "SELECT * FROM services WHERE robot_id = ? ORDER BY rowid";
const UPDATE_SCHEDULE: &str =
    "UPDATE services SET arrival_datetime = ?, delay_time = ? WHERE id = ?";
const UPDATE_STATUS: &str = "UPDATE services SET status = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM services WHERE id = ?";

pub(crate) fn insert(service: &Service) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(INSERT)
        .bind(service.id.to_string())
        .bind(service.robot_id.to_string())
        .bind(service.kind.as_str())
        .bind(service.arrival_datetime.to_rfc3339())
        .bind(service.delay_time)
        .bind(service.status.as_str())
}

pub(crate) fn set_status(
    id: ServiceId,
    status: ServiceStatus,
) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(UPDATE_STATUS)
        .bind(status.as_str())
        .bind(id.to_string())
}

/// `SQLite`-backed service repository.
#[derive(Clone)]
pub struct SqliteServiceRepository {
    pool: SqlitePool,
}

impl SqliteServiceRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ServiceRepository for SqliteServiceRepository {
    fn get_by_id(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<Service>, TerminalError>> + Send {
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

    fn find_by_robot(
        &self,
        robot_id: RobotId,
    ) -> impl Future<Output = Result<Vec<Service>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_ROBOT)
                .bind(robot_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        service: Service,
    ) -> impl Future<Output = Result<Service, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE_SCHEDULE)
                .bind(service.arrival_datetime.to_rfc3339())
                .bind(service.delay_time)
                .bind(service.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(service)
        }
    }

    fn delete(&self, id: ServiceId) -> impl Future<Output = Result<(), TerminalError>> + Send {
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
    use crate::testing::{database, seed_robot, seed_service};
    use freight_terminal_domain::service::ServiceType;

    #[tokio::test]
    async fn should_roundtrip_service_columns() {
        let pool = database().await;
        let robot = seed_robot(&pool).await;
        let service = seed_service(&pool, robot.id, ServiceType::Reception).await;
        let repo = SqliteServiceRepository::new(pool);

        assert_eq!(repo.get_by_id(service.id).await.unwrap(), Some(service.clone()));
        assert_eq!(repo.find_by_robot(robot.id).await.unwrap(), [service]);
    }

    #[tokio::test]
    async fn should_only_update_schedule() {
        let pool = database().await;
        let robot = seed_robot(&pool).await;
        let service = seed_service(&pool, robot.id, ServiceType::Delivery).await;
        let repo = SqliteServiceRepository::new(pool);

        let mut changed = service.clone();
        changed.delay_time = 600;
        changed.status = ServiceStatus::Done;
        repo.update(changed).await.unwrap();

        let stored = repo.get_by_id(service.id).await.unwrap().unwrap();
        assert_eq!(stored.delay_time, 600);
        assert_eq!(stored.status, ServiceStatus::NotStarted);
    }
}
