//! Queries for the `fire_firefighters` table.

use fire_map_database_models::{FirefighterRow, NewFirefighter};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use super::{
    exists, finish, now, read_id, read_timestamp, require, returned_id, stations, timestamp_value,
};
use crate::DbError;

const TABLE: &str = "fire_firefighters";

const COLUMNS: &str = "id, name, rank, experience_level, station_id, created_at, updated_at";

fn from_row(row: &Row) -> Result<FirefighterRow, DbError> {
    Ok(FirefighterRow {
        id: read_id(row)?,
        name: row.to_value("name").unwrap_or_default(),
        rank: row.to_value("rank").unwrap_or_default(),
        experience_level: row.to_value("experience_level").unwrap_or_default(),
        station_id: row.to_value("station_id").unwrap_or(None),
        created_at: read_timestamp(row, "created_at"),
        updated_at: read_timestamp(row, "updated_at"),
    })
}

fn station_value(station_id: Option<i64>) -> DatabaseValue {
    station_id.map_or(DatabaseValue::Null, DatabaseValue::Int64)
}

async fn require_station(db: &dyn Database, station_id: Option<i64>) -> Result<(), DbError> {
    if let Some(id) = station_id {
        require(db, stations::TABLE, "Fire station", id).await?;
    }
    Ok(())
}

/// Lists all firefighters ordered by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list(db: &dyn Database) -> Result<Vec<FirefighterRow>, DbError> {
    let rows = db
        .query_raw_params(&format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY id"), &[])
        .await?;
    rows.iter().map(from_row).collect()
}

/// Fetches a single firefighter.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get(db: &dyn Database, id: i64) -> Result<Option<FirefighterRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1"),
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    rows.first().map(from_row).transpose()
}

/// Inserts a new firefighter and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::MissingReference`] if the station does not exist, or
/// another [`DbError`] if the database operation fails.
pub async fn insert(db: &dyn Database, new: &NewFirefighter) -> Result<FirefighterRow, DbError> {
    let txn = db.begin_transaction().await?;
    let result = insert_row(txn.as_ref(), new).await;
    finish(txn, result).await
}

async fn insert_row(db: &dyn Database, new: &NewFirefighter) -> Result<FirefighterRow, DbError> {
    require_station(db, new.station_id).await?;

    let now = now();
    let rows = db
        .query_raw_params(
            "INSERT INTO fire_firefighters
                (name, rank, experience_level, station_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING id",
            &[
                DatabaseValue::String(new.name.clone()),
                DatabaseValue::String(new.rank.clone()),
                DatabaseValue::String(new.experience_level.clone()),
                station_value(new.station_id),
                timestamp_value(Some(&now)),
            ],
        )
        .await?;
    let id = returned_id(&rows)?;

    Ok(FirefighterRow {
        id,
        name: new.name.clone(),
        rank: new.rank.clone(),
        experience_level: new.experience_level.clone(),
        station_id: new.station_id,
        created_at: now,
        updated_at: now,
    })
}

/// Replaces the fields of an existing firefighter. Returns `None` if no
/// firefighter has the given id, whatever the station is.
///
/// # Errors
///
/// Returns [`DbError::MissingReference`] if the station does not exist, or
/// another [`DbError`] if the database operation fails.
pub async fn update(
    db: &dyn Database,
    id: i64,
    new: &NewFirefighter,
) -> Result<Option<FirefighterRow>, DbError> {
    let txn = db.begin_transaction().await?;
    let result = update_row(txn.as_ref(), id, new).await;
    finish(txn, result).await
}

async fn update_row(
    db: &dyn Database,
    id: i64,
    new: &NewFirefighter,
) -> Result<Option<FirefighterRow>, DbError> {
    if !exists(db, TABLE, id).await? {
        return Ok(None);
    }
    require_station(db, new.station_id).await?;

    let updated = db
        .exec_raw_params(
            "UPDATE fire_firefighters SET
                name = $1, rank = $2, experience_level = $3,
                station_id = $4, updated_at = $5
             WHERE id = $6",
            &[
                DatabaseValue::String(new.name.clone()),
                DatabaseValue::String(new.rank.clone()),
                DatabaseValue::String(new.experience_level.clone()),
                station_value(new.station_id),
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

/// Deletes a firefighter. Returns whether the row existed.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete(db: &dyn Database, id: i64) -> Result<bool, DbError> {
    let deleted = db
        .exec_raw_params(
            "DELETE FROM fire_firefighters WHERE id = $1",
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::TempDb;

    fn sample(station_id: Option<i64>) -> NewFirefighter {
        NewFirefighter {
            name: "Maria Santos".to_string(),
            rank: "Fire Officer I".to_string(),
            experience_level: "Intermediate".to_string(),
            station_id,
        }
    }

    #[tokio::test]
    async fn unassigned_firefighter_roundtrips() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();

        let row = insert(db, &sample(None)).await.unwrap();
        assert_eq!(get(db, row.id).await.unwrap(), Some(row));
    }

    #[tokio::test]
    async fn rejects_unknown_station() {
        let tmp = TempDb::new().await;
        let err = insert(tmp.db.as_ref(), &sample(Some(5))).await.unwrap_err();
        assert!(matches!(err, DbError::MissingReference { id: 5, .. }));
    }

    #[tokio::test]
    async fn deleting_station_unassigns_firefighter() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();
        let station = stations::insert(db, &stations::tests::sample("Central"))
            .await
            .unwrap();

        let row = insert(db, &sample(Some(station.id))).await.unwrap();
        assert!(stations::delete(db, station.id).await.unwrap());

        let row = get(db, row.id).await.unwrap().unwrap();
        assert_eq!(row.station_id, None);
        assert!(delete(db, row.id).await.unwrap());
    }
}
