//! Record queries, one module per table.
//!
//! Every module exposes the same five operations (`list`, `get`, `insert`,
//! `update`, `delete`). Timestamps are stored as `TEXT` in
//! `YYYY-MM-DD HH:MM:SS` form (UTC) so that `SQLite`'s `strftime()` can
//! extract date parts for the chart aggregations.

pub mod firefighters;
pub mod incidents;
pub mod locations;
pub mod stations;
pub mod trucks;
pub mod weather;

use chrono::{NaiveDateTime, Timelike as _};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseTransaction, DatabaseValue, Row};

use crate::DbError;

/// Storage format for timestamp columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats accepted when reading a timestamp column back. Rows written by
/// other tools may carry fractional seconds or an ISO `T` separator.
const ACCEPTED_TIMESTAMP_FORMATS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Renders a timestamp in storage format.
#[must_use]
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp, returning `None` if it is in none of the
/// accepted formats.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ACCEPTED_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Current UTC time truncated to whole seconds, matching what a
/// round-trip through the storage format yields.
pub(crate) fn now() -> NaiveDateTime {
    let now = chrono::Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

pub(crate) fn timestamp_value(dt: Option<&NaiveDateTime>) -> DatabaseValue {
    dt.map_or(DatabaseValue::Null, |dt| {
        DatabaseValue::String(format_timestamp(dt))
    })
}

/// Reads a nullable timestamp column.
pub(crate) fn read_optional_timestamp(row: &Row, column: &str) -> Option<NaiveDateTime> {
    let raw: Option<String> = row.to_value(column).unwrap_or(None);
    raw.as_deref().and_then(|s| {
        let parsed = parse_timestamp(s);
        if parsed.is_none() {
            log::warn!("Unparseable timestamp in column {column}: {s:?}");
        }
        parsed
    })
}

/// Reads a non-null timestamp column, defaulting to the epoch if the stored
/// value cannot be parsed.
pub(crate) fn read_timestamp(row: &Row, column: &str) -> NaiveDateTime {
    read_optional_timestamp(row, column).unwrap_or_default()
}

/// Reads the primary key column.
pub(crate) fn read_id(row: &Row) -> Result<i64, DbError> {
    row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse row id: {e}"),
    })
}

/// Extracts the id from the single row returned by `INSERT ... RETURNING id`.
pub(crate) fn returned_id(rows: &[Row]) -> Result<i64, DbError> {
    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "INSERT returned no id".to_string(),
    })?;
    read_id(row)
}

/// Returns whether a row with `id` exists in `table`.
///
/// `table` is always one of the fixed table names in this crate, never user
/// input.
pub(crate) async fn exists(db: &dyn Database, table: &'static str, id: i64) -> Result<bool, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT id FROM {table} WHERE id = $1"),
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    Ok(!rows.is_empty())
}

/// Fails with [`DbError::MissingReference`] unless `id` exists in `table`.
pub(crate) async fn require(
    db: &dyn Database,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> Result<(), DbError> {
    if exists(db, table, id).await? {
        Ok(())
    } else {
        Err(DbError::MissingReference { entity, id })
    }
}

/// Commits `txn` if `result` is `Ok`, otherwise rolls it back and returns
/// the original error.
pub(crate) async fn finish<T>(
    txn: Box<dyn DatabaseTransaction>,
    result: Result<T, DbError>,
) -> Result<T, DbError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                log::warn!("Failed to roll back transaction: {rollback}");
            }
            Err(e)
        }
    }
}
