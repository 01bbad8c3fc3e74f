//! Queries for the `fire_firestation` table.

use fire_map_database_models::{FireStationRow, NewFireStation};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use super::{finish, now, read_id, read_timestamp, returned_id, timestamp_value};
use crate::DbError;

pub(crate) const TABLE: &str = "fire_firestation";

const COLUMNS: &str = "id, name, latitude, longitude, address, city, country, created_at, updated_at";

fn from_row(row: &Row) -> Result<FireStationRow, DbError> {
    Ok(FireStationRow {
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

/// Lists all fire stations ordered by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list(db: &dyn Database) -> Result<Vec<FireStationRow>, DbError> {
    let rows = db
        .query_raw_params(&format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY id"), &[])
        .await?;
    rows.iter().map(from_row).collect()
}

/// Fetches a single fire station.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get(db: &dyn Database, id: i64) -> Result<Option<FireStationRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1"),
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    rows.first().map(from_row).transpose()
}

/// Inserts a new fire station and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert(db: &dyn Database, new: &NewFireStation) -> Result<FireStationRow, DbError> {
    let now = now();
    let rows = db
        .query_raw_params(
            "INSERT INTO fire_firestation
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

    log::debug!("Inserted fire station {id} ({})", new.name);

    Ok(FireStationRow {
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

/// Replaces the fields of an existing fire station. Returns `None` if no
/// station has the given id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update(
    db: &dyn Database,
    id: i64,
    new: &NewFireStation,
) -> Result<Option<FireStationRow>, DbError> {
    let updated = db
        .exec_raw_params(
            "UPDATE fire_firestation SET
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

/// Deletes a fire station and its trucks. Firefighters assigned to the
/// station are kept but unassigned. Returns whether the station existed.
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

    db.exec_raw_params("DELETE FROM fire_firetruck WHERE station_id = $1", &params)
        .await?;
    db.exec_raw_params(
        "UPDATE fire_firefighters SET station_id = NULL WHERE station_id = $1",
        &params,
    )
    .await?;
    let deleted = db
        .exec_raw_params("DELETE FROM fire_firestation WHERE id = $1", &params)
        .await?;

    Ok(deleted > 0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::test_support::TempDb;

    pub(crate) fn sample(name: &str) -> NewFireStation {
        NewFireStation {
            name: name.to_string(),
            latitude: 9.7445,
            longitude: 118.7389,
            address: "Malvar St".to_string(),
            city: "Puerto Princesa".to_string(),
            country: "Philippines".to_string(),
        }
    }

    #[tokio::test]
    async fn crud_cycle() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();

        let station = insert(db, &sample("Central")).await.unwrap();
        assert_eq!(get(db, station.id).await.unwrap().as_ref(), Some(&station));

        let renamed = update(db, station.id, &sample("Central Station"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Central Station");

        assert_eq!(list(db).await.unwrap().len(), 1);
        assert!(delete(db, station.id).await.unwrap());
        assert!(list(db).await.unwrap().is_empty());
    }
}
