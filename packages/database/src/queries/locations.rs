//! Queries for the `fire_locations` table.

use fire_map_database_models::{LocationRow, NewLocation};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use super::{finish, now, read_id, read_timestamp, returned_id, timestamp_value};
use crate::DbError;

pub(crate) const TABLE: &str = "fire_locations";

const COLUMNS: &str = "id, name, latitude, longitude, address, city, country, created_at, updated_at";

fn from_row(row: &Row) -> Result<LocationRow, DbError> {
    Ok(LocationRow {
        id: read_id(row)?,
        name: row.to_value("name").unwrap_or_default(),
        latitude: row.to_value("latitude").unwrap_or(0.0),
        longitude: row.to_value("longitude").unwrap_or(0.0),
        address: row.to_value("address").unwrap_or_default(),
        city: row.to_value("city").unwrap_or_default(),
        country: row.to_value("country").unwrap_or_default(),
        created_at: read_timestamp(row, "created_at"),
        updated_at: read_timestamp(row, "updated_at"),
    })
}

/// Lists all locations ordered by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list(db: &dyn Database) -> Result<Vec<LocationRow>, DbError> {
    let rows = db
        .query_raw_params(&format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY id"), &[])
        .await?;
    rows.iter().map(from_row).collect()
}

/// Fetches a single location.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get(db: &dyn Database, id: i64) -> Result<Option<LocationRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1"),
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    rows.first().map(from_row).transpose()
}

/// Inserts a new location and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert(db: &dyn Database, new: &NewLocation) -> Result<LocationRow, DbError> {
    let now = now();
    let rows = db
        .query_raw_params(
            "INSERT INTO fire_locations
                (name, latitude, longitude, address, city, country, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING id",
            &[
                DatabaseValue::String(new.name.clone()),
                DatabaseValue::Real64(new.latitude),
                DatabaseValue::Real64(new.longitude),
                DatabaseValue::String(new.address.clone()),
                DatabaseValue::String(new.city.clone()),
                DatabaseValue::String(new.country.clone()),
                timestamp_value(Some(&now)),
            ],
        )
        .await?;
    let id = returned_id(&rows)?;

    log::debug!("Inserted location {id} ({})", new.name);

    Ok(LocationRow {
        id,
        name: new.name.clone(),
        latitude: new.latitude,
        longitude: new.longitude,
        address: new.address.clone(),
        city: new.city.clone(),
        country: new.country.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Replaces the fields of an existing location. Returns `None` if no
/// location has the given id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update(
    db: &dyn Database,
    id: i64,
    new: &NewLocation,
) -> Result<Option<LocationRow>, DbError> {
    let updated = db
        .exec_raw_params(
            "UPDATE fire_locations SET
                name = $1, latitude = $2, longitude = $3,
                address = $4, city = $5, country = $6, updated_at = $7
             WHERE id = $8",
            &[
                DatabaseValue::String(new.name.clone()),
                DatabaseValue::Real64(new.latitude),
                DatabaseValue::Real64(new.longitude),
                DatabaseValue::String(new.address.clone()),
                DatabaseValue::String(new.city.clone()),
                DatabaseValue::String(new.country.clone()),
                timestamp_value(Some(&now())),
                DatabaseValue::Int64(id),
            ],
        )
        .await?;

    if updated == 0 {
        return Ok(None);
    }
    get(db, id).await
}

/// Deletes a location together with its incidents and their weather
/// records. Returns whether the location existed.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete(db: &dyn Database, id: i64) -> Result<bool, DbError> {
    let txn = db.begin_transaction().await?;
    let result = delete_cascade(txn.as_ref(), id).await;
    finish(txn, result).await
}

async fn delete_cascade(db: &dyn Database, id: i64) -> Result<bool, DbError> {
    let params = [DatabaseValue::Int64(id)];

    db.exec_raw_params(
        "DELETE FROM fire_weatherconditions WHERE incident_id IN
            (SELECT id FROM fire_incident WHERE location_id = $1)",
        &params,
    )
    .await?;
    let incidents = db
        .exec_raw_params("DELETE FROM fire_incident WHERE location_id = $1", &params)
        .await?;
    let deleted = db
        .exec_raw_params("DELETE FROM fire_locations WHERE id = $1", &params)
        .await?;

    if deleted > 0 {
        log::debug!("Deleted location {id} and {incidents} incident(s)");
    }
    Ok(deleted > 0)
}
