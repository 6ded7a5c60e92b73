//! Column decoding helpers.
//!
//! Identifiers, labels, and timestamps are stored as text. A value that no
//! longer parses surfaces as [`sqlx::Error::Decode`].

use std::str::FromStr;

use freight_terminal_domain::time::{self, Timestamp};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Read a text column and parse it with [`FromStr`].
pub(crate) fn parsed<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    T::from_str(&raw).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Nullable variant of [`parsed`].
pub(crate) fn parsed_opt<T>(row: &SqliteRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|raw| T::from_str(&raw))
        .transpose()
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub(crate) fn timestamp(row: &SqliteRow, column: &str) -> Result<Timestamp, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    time::parse_rfc3339(&raw).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
