//! Queries for the `fire_incident` table.

use fire_map_database_models::{IncidentRow, NewIncident};
use fire_map_fire_models::FireSeverity;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use super::{
    exists, finish, locations, now, read_id, read_optional_timestamp, read_timestamp, require, returned_id,
    timestamp_value,
};
use crate::DbError;

pub(crate) const TABLE: &str = "fire_incident";

const COLUMNS: &str =
    "id, location_id, date_time, severity_level, description, created_at, updated_at";

fn from_row(row: &Row) -> Result<IncidentRow, DbError> {
    let id = read_id(row)?;
    let severity: i64 = row.to_value("severity_level").unwrap_or(0);
    let severity_level = FireSeverity::from_i64(severity).map_err(|e| DbError::Conversion {
        message: format!("Incident {id}: {e}"),
    })?;

    Ok(IncidentRow {
        id,
        location_id: row.to_value("location_id").unwrap_or(0),
        date_time: read_optional_timestamp(row, "date_time"),
        severity_level,
        description: row.to_value("description").unwrap_or_default(),
        created_at: read_timestamp(row, "created_at"),
        updated_at: read_timestamp(row, "updated_at"),
    })
}

/// Lists all incidents ordered by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a stored severity
/// is out of range.
pub async fn list(db: &dyn Database) -> Result<Vec<IncidentRow>, DbError> {
    let rows = db
        .query_raw_params(&format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY id"), &[])
        .await?;
    rows.iter().map(from_row).collect()
}

/// Fetches a single incident.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or the stored
/// severity is out of range.
pub async fn get(db: &dyn Database, id: i64) -> Result<Option<IncidentRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1"),
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    rows.first().map(from_row).transpose()
}

/// Inserts a new incident and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::MissingReference`] if the location does not exist,
/// or another [`DbError`] if the database operation fails.
pub async fn insert(db: &dyn Database, new: &NewIncident) -> Result<IncidentRow, DbError> {
    let txn = db.begin_transaction().await?;
    let result = insert_row(txn.as_ref(), new).await;
    finish(txn, result).await
}

async fn insert_row(db: &dyn Database, new: &NewIncident) -> Result<IncidentRow, DbError> {
    require(db, locations::TABLE, "Location", new.location_id).await?;

    let now = now();
    let rows = db
        .query_raw_params(
            "INSERT INTO fire_incident
                (location_id, date_time, severity_level, description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING id",
            &[
                DatabaseValue::Int64(new.location_id),
                timestamp_value(new.date_time.as_ref()),
                DatabaseValue::Int32(i32::from(new.severity_level.value())),
                DatabaseValue::String(new.description.clone()),
                timestamp_value(Some(&now)),
            ],
        )
        .await?;
    let id = returned_id(&rows)?;

    log::debug!(
        "Inserted incident {id} at location {} ({})",
        new.location_id,
        new.severity_level
    );

    Ok(IncidentRow {
        id,
        location_id: new.location_id,
        date_time: new.date_time,
        severity_level: new.severity_level,
        description: new.description.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Replaces the fields of an existing incident. Returns `None` if no
/// incident has the given id, whatever the new location is.
///
/// # Errors
///
/// Returns [`DbError::MissingReference`] if the new location does not
/// exist, or another [`DbError`] if the database operation fails.
pub async fn update(
    db: &dyn Database,
    id: i64,
    new: &NewIncident,
) -> Result<Option<IncidentRow>, DbError> {
    let txn = db.begin_transaction().await?;
    let result = update_row(txn.as_ref(), id, new).await;
    finish(txn, result).await
}

async fn update_row(
    db: &dyn Database,
    id: i64,
    new: &NewIncident,
) -> Result<Option<IncidentRow>, DbError> {
    if !exists(db, TABLE, id).await? {
        return Ok(None);
    }
    require(db, locations::TABLE, "Location", new.location_id).await?;

    let updated = db
        .exec_raw_params(
            "UPDATE fire_incident SET
                location_id = $1, date_time = $2, severity_level = $3,
                description = $4, updated_at = $5
             WHERE id = $6",
            &[
                DatabaseValue::Int64(new.location_id),
                timestamp_value(new.date_time.as_ref()),
                DatabaseValue::Int32(i32::from(new.severity_level.value())),
                DatabaseValue::String(new.description.clone()),
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

/// Deletes an incident and its weather records. Returns whether the
/// incident existed.
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
        "DELETE FROM fire_weatherconditions WHERE incident_id = $1",
        &params,
    )
    .await?;
    let deleted = db
        .exec_raw_params("DELETE FROM fire_incident WHERE id = $1", &params)
        .await?;

    Ok(deleted > 0)
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::db::test_support::TempDb;
    use crate::queries::locations;

    pub(crate) fn at(s: &str) -> Option<NaiveDateTime> {
        Some(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap())
    }

    pub(crate) fn sample(
        location_id: i64,
        date_time: Option<NaiveDateTime>,
        severity_level: FireSeverity,
    ) -> NewIncident {
        NewIncident {
            location_id,
            date_time,
            severity_level,
            description: "Grass fire near the highway".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_requires_existing_location() {
        let tmp = TempDb::new().await;
        let err = insert(tmp.db.as_ref(), &sample(99, None, FireSeverity::Minor))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::MissingReference {
                entity: "Location",
                id: 99
            }
        ));
    }

    #[tokio::test]
    async fn roundtrips_nullable_date_and_severity() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();
        let loc = locations::insert(db, &locations::tests::sample("Cebu", "Philippines"))
            .await
            .unwrap();

        let dated = insert(
            db,
            &sample(loc.id, at("2026-02-15 08:30:00"), FireSeverity::Major),
        )
        .await
        .unwrap();
        let undated = insert(db, &sample(loc.id, None, FireSeverity::Minor))
            .await
            .unwrap();

        let fetched = get(db, dated.id).await.unwrap().unwrap();
        assert_eq!(fetched, dated);
        assert_eq!(fetched.severity_level, FireSeverity::Major);

        let fetched = get(db, undated.id).await.unwrap().unwrap();
        assert_eq!(fetched.date_time, None);

        assert_eq!(list(db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_can_clear_date() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();
        let loc = locations::insert(db, &locations::tests::sample("Cebu", "Philippines"))
            .await
            .unwrap();
        let row = insert(
            db,
            &sample(loc.id, at("2026-03-01 10:00:00"), FireSeverity::Moderate),
        )
        .await
        .unwrap();

        let updated = update(db, row.id, &sample(loc.id, None, FireSeverity::Major))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.date_time, None);
        assert_eq!(updated.severity_level, FireSeverity::Major);
    }

    #[tokio::test]
    async fn deleting_location_cascades_to_incidents() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();
        let loc = locations::insert(db, &locations::tests::sample("Cebu", "Philippines"))
            .await
            .unwrap();
        insert(db, &sample(loc.id, None, FireSeverity::Minor))
            .await
            .unwrap();

        assert!(locations::delete(db, loc.id).await.unwrap());
        assert!(list(db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_incident_is_none_even_with_unknown_location() {
        let tmp = TempDb::new().await;
        let result = update(tmp.db.as_ref(), 99, &sample(42, None, FireSeverity::Minor))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn rejected_write_leaves_no_partial_state() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();
        let loc = locations::insert(db, &locations::tests::sample("Cebu", "Philippines"))
            .await
            .unwrap();
        let row = insert(db, &sample(loc.id, None, FireSeverity::Minor))
            .await
            .unwrap();

        assert!(insert(db, &sample(loc.id + 1, None, FireSeverity::Major)).await.is_err());
        assert!(update(db, row.id, &sample(loc.id + 1, None, FireSeverity::Major))
            .await
            .is_err());

        let all = list(db).await.unwrap();
        assert_eq!(all, vec![row]);

        let second = insert(db, &sample(loc.id, None, FireSeverity::Moderate))
            .await
            .unwrap();
        assert_eq!(list(db).await.unwrap().len(), 2);
        assert!(delete(db, second.id).await.unwrap());
    }
}
