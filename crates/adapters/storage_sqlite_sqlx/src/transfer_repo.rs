//! `SQLite` implementation of [`TransferRepository`].

use std::future::Future;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool};

use freight_terminal_app::ports::TransferRepository;
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::id::{ServiceId, TransferId};
use freight_terminal_domain::transfer::Transfer;

use crate::decode::parsed;
use crate::error::StorageError;

struct Wrapper(Transfer);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Transfer {
            id: parsed(row, "id")?,
            delivery_service_id: parsed(row, "delivery_service_id")?,
            reception_service_id: parsed(row, "reception_service_id")?,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO transfers (id, delivery_service_id, reception_service_id) VALUES (?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM transfers WHERE id = ?";
const SELECT_BY_SERVICE: &str =
    "SELECT * FROM transfers WHERE delivery_service_id = ?1 OR reception_service_id = ?1";

pub(crate) fn insert(transfer: &Transfer) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(INSERT)
        .bind(transfer.id.to_string())
        .bind(transfer.delivery_service_id.to_string())
        .bind(transfer.reception_service_id.to_string())
}

/// `SQLite`-backed transfer repository.
#[derive(Clone)]
pub struct SqliteTransferRepository {
    pool: SqlitePool,
}

impl SqliteTransferRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TransferRepository for SqliteTransferRepository {
    fn get_by_id(
        &self,
        id: TransferId,
    ) -> impl Future<Output = Result<Option<Transfer>, TerminalError>> + Send {
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

    fn find_by_service(
        &self,
        service_id: ServiceId,
    ) -> impl Future<Output = Result<Option<Transfer>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_SERVICE)
                .bind(service_id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }
}
