//! `SQLite` implementation of [`CompanyRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use freight_terminal_app::ports::CompanyRepository;
use freight_terminal_domain::company::Company;
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::id::CompanyId;

use crate::decode::parsed;
use crate::error::StorageError;

struct Wrapper(Company);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Company {
            id: parsed(row, "id")?,
            name: row.try_get("name")?,
            kind: parsed(row, "type")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO companies (id, name, type) VALUES (?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM companies WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM companies ORDER BY name";
const UPDATE: &str = "UPDATE companies SET name = ?, type = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM companies WHERE id = ?";

/// `SQLite`-backed company repository.
#[derive(Clone)]
pub struct SqliteCompanyRepository {
    pool: SqlitePool,
}

impl SqliteCompanyRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CompanyRepository for SqliteCompanyRepository {
    fn create(
        &self,
        company: Company,
    ) -> impl Future<Output = Result<Company, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(company.id.to_string())
                .bind(&company.name)
                .bind(company.kind.as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(company)
        }
    }

    fn get_by_id(
        &self,
        id: CompanyId,
    ) -> impl Future<Output = Result<Option<Company>, TerminalError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Company>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        company: Company,
    ) -> impl Future<Output = Result<Company, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&company.name)
                .bind(company.kind.as_str())
                .bind(company.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(company)
        }
    }

    fn delete(&self, id: CompanyId) -> impl Future<Output = Result<(), TerminalError>> + Send {
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
