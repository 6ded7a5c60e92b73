//! `SQLite` implementation of [`FreightRepository`].

use std::future::Future;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{FromRow, Row, Sqlite, SqlitePool};

use freight_terminal_app::ports::FreightRepository;
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::freight::{Freight, FreightStatus};
use freight_terminal_domain::id::FreightId;

use crate::decode::{parsed, parsed_opt};
use crate::error::StorageError;

struct Wrapper(Freight);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Freight {
            id: parsed(row, "id")?,
            name: row.try_get("name")?,
            status: parsed(row, "status")?,
            transfer_id: parsed_opt(row, "transfer_id")?,
            is_damaged: row.try_get("is_damaged")?,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO freights (id, name, status, transfer_id, is_damaged) VALUES (?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM freights WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM freights ORDER BY rowid";
const UPDATE: &str = "UPDATE freights \
    SET name = ?, status = ?, transfer_id = ?, is_damaged = is_damaged OR ? \
    WHERE id = ? AND status = ?";
const EXISTS: &str = "SELECT COUNT(*) FROM freights WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM freights WHERE id = ?";

pub(crate) fn insert(freight: &Freight) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(INSERT)
        .bind(freight.id.to_string())
        .bind(freight.name.clone())
        .bind(freight.status.as_str())
        .bind(freight.transfer_id.map(|id| id.to_string()))
        .bind(freight.is_damaged)
}

/// Matches no row when the stored status is no longer `from`.
pub(crate) fn update(
    freight: &Freight,
    from: FreightStatus,
) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(UPDATE)
        .bind(freight.name.clone())
        .bind(freight.status.as_str())
        .bind(freight.transfer_id.map(|id| id.to_string()))
        .bind(freight.is_damaged)
        .bind(freight.id.to_string())
        .bind(from.as_str())
}

pub(crate) async fn exists(conn: &mut SqliteConnection, id: FreightId) -> Result<bool, StorageError> {
    let count: i64 = sqlx::query_scalar(EXISTS)
        .bind(id.to_string())
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

/// `SQLite`-backed freight repository. Writes other than deletion go
/// through [`SqliteUnitOfWork`](crate::SqliteUnitOfWork).
#[derive(Clone)]
pub struct SqliteFreightRepository {
    pool: SqlitePool,
}

impl SqliteFreightRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl FreightRepository for SqliteFreightRepository {
    fn get_by_id(
        &self,
        id: FreightId,
    ) -> impl Future<Output = Result<Option<Freight>, TerminalError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Freight>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn delete(&self, id: FreightId) -> impl Future<Output = Result<(), TerminalError>> + Send {
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
