//! Queries for the `fire_firetruck` table.

use fire_map_database_models::{FireTruckRow, NewFireTruck};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use super::{
    exists, finish, now, read_id, read_timestamp, require, returned_id, stations, timestamp_value,
};
use crate::DbError;

const TABLE: &str = "fire_firetruck";

const COLUMNS: &str = "id, truck_number, model, capacity, station_id, created_at, updated_at";

fn from_row(row: &Row) -> Result<FireTruckRow, DbError> {
    Ok(FireTruckRow {
        id: read_id(row)?,
        truck_number: row.to_value("truck_number").unwrap_or_default(),
        model: row.to_value("model").unwrap_or_default(),
        capacity: row.to_value("capacity").unwrap_or_default(),
        station_id: row.to_value("station_id").unwrap_or(0),
        created_at: read_timestamp(row, "created_at"),
        updated_at: read_timestamp(row, "updated_at"),
    })
}

/// Lists all fire trucks ordered by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list(db: &dyn Database) -> Result<Vec<FireTruckRow>, DbError> {
    let rows = db
        .query_raw_params(&format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY id"), &[])
        .await?;
    rows.iter().map(from_row).collect()
}

/// Fetches a single fire truck.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get(db: &dyn Database, id: i64) -> Result<Option<FireTruckRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1"),
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    rows.first().map(from_row).transpose()
}

/// Inserts a new fire truck and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::MissingReference`] if the station does not exist, or
/// another [`DbError`] if the database operation fails.
pub async fn insert(db: &dyn Database, new: &NewFireTruck) -> Result<FireTruckRow, DbError> {
    let txn = db.begin_transaction().await?;
    let result = insert_row(txn.as_ref(), new).await;
    finish(txn, result).await
}

async fn insert_row(db: &dyn Database, new: &NewFireTruck) -> Result<FireTruckRow, DbError> {
    require(db, stations::TABLE, "Fire station", new.station_id).await?;

    let now = now();
    let rows = db
        .query_raw_params(
            "INSERT INTO fire_firetruck
                (truck_number, model, capacity, station_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING id",
            &[
                DatabaseValue::String(new.truck_number.clone()),
                DatabaseValue::String(new.model.clone()),
                DatabaseValue::String(new.capacity.clone()),
                DatabaseValue::Int64(new.station_id),
                timestamp_value(Some(&now)),
            ],
        )
        .await?;
    let id = returned_id(&rows)?;

    Ok(FireTruckRow {
        id,
        truck_number: new.truck_number.clone(),
        model: new.model.clone(),
        capacity: new.capacity.clone(),
        station_id: new.station_id,
        created_at: now,
        updated_at: now,
    })
}

/// Replaces the fields of an existing fire truck. Returns `None` if no
/// truck has the given id, whatever the station is.
///
/// # Errors
///
/// Returns [`DbError::MissingReference`] if the station does not exist, or
/// another [`DbError`] if the database operation fails.
pub async fn update(
    db: &dyn Database,
    id: i64,
    new: &NewFireTruck,
) -> Result<Option<FireTruckRow>, DbError> {
    let txn = db.begin_transaction().await?;
    let result = update_row(txn.as_ref(), id, new).await;
    finish(txn, result).await
}

async fn update_row(
    db: &dyn Database,
    id: i64,
    new: &NewFireTruck,
) -> Result<Option<FireTruckRow>, DbError> {
    if !exists(db, TABLE, id).await? {
        return Ok(None);
    }
    require(db, stations::TABLE, "Fire station", new.station_id).await?;

    let updated = db
        .exec_raw_params(
            "UPDATE fire_firetruck SET
                truck_number = $1, model = $2, capacity = $3,
                station_id = $4, updated_at = $5
             WHERE id = $6",
            &[
                DatabaseValue::String(new.truck_number.clone()),
                DatabaseValue::String(new.model.clone()),
                DatabaseValue::String(new.capacity.clone()),
                DatabaseValue::Int64(new.station_id),
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

/// Deletes a fire truck. Returns whether the row existed.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete(db: &dyn Database, id: i64) -> Result<bool, DbError> {
    let deleted = db
        .exec_raw_params(
            "DELETE FROM fire_firetruck WHERE id = $1",
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::TempDb;

    fn sample(station_id: i64) -> NewFireTruck {
        NewFireTruck {
            truck_number: "BFP-PPC-07".to_string(),
            model: "Isuzu FVR".to_string(),
            capacity: "4000 L".to_string(),
            station_id,
        }
    }

    #[tokio::test]
    async fn truck_requires_station() {
        let tmp = TempDb::new().await;
        let err = insert(tmp.db.as_ref(), &sample(1)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::MissingReference {
                entity: "Fire station",
                id: 1
            }
        ));
    }

    #[tokio::test]
    async fn deleting_station_removes_trucks() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();
        let station = stations::insert(db, &stations::tests::sample("Central"))
            .await
            .unwrap();
        let truck = insert(db, &sample(station.id)).await.unwrap();
        assert_eq!(list(db).await.unwrap(), vec![truck]);

        stations::delete(db, station.id).await.unwrap();
        assert!(list(db).await.unwrap().is_empty());
    }
}
