//! Queries for the `fire_weatherconditions` table.

use fire_map_database_models::{NewWeatherCondition, WeatherConditionRow};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use super::{
    exists, finish, incidents, now, read_id, read_timestamp, require, returned_id, timestamp_value,
};
use crate::DbError;

const TABLE: &str = "fire_weatherconditions";

const COLUMNS: &str = "id, incident_id, temperature, humidity, wind_speed, weather_description, \
                       created_at, updated_at";

fn from_row(row: &Row) -> Result<WeatherConditionRow, DbError> {
    Ok(WeatherConditionRow {
        id: read_id(row)?,
        incident_id: row.to_value("incident_id").unwrap_or(0),
        temperature: row.to_value("temperature").unwrap_or(0.0),
        humidity: row.to_value("humidity").unwrap_or(0.0),
        wind_speed: row.to_value("wind_speed").unwrap_or(0.0),
        weather_description: row.to_value("weather_description").unwrap_or_default(),
        created_at: read_timestamp(row, "created_at"),
        updated_at: read_timestamp(row, "updated_at"),
    })
}

/// Lists all weather conditions ordered by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list(db: &dyn Database) -> Result<Vec<WeatherConditionRow>, DbError> {
    let rows = db
        .query_raw_params(&format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY id"), &[])
        .await?;
    rows.iter().map(from_row).collect()
}

/// Fetches a single weather condition record.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get(db: &dyn Database, id: i64) -> Result<Option<WeatherConditionRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1"),
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    rows.first().map(from_row).transpose()
}

/// Inserts a new weather condition and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::MissingReference`] if the incident does not exist,
/// or another [`DbError`] if the database operation fails.
pub async fn insert(
    db: &dyn Database,
    new: &NewWeatherCondition,
) -> Result<WeatherConditionRow, DbError> {
    let txn = db.begin_transaction().await?;
    let result = insert_row(txn.as_ref(), new).await;
    finish(txn, result).await
}

async fn insert_row(
    db: &dyn Database,
    new: &NewWeatherCondition,
) -> Result<WeatherConditionRow, DbError> {
    require(db, incidents::TABLE, "Incident", new.incident_id).await?;

    let now = now();
    let rows = db
        .query_raw_params(
            "INSERT INTO fire_weatherconditions
                (incident_id, temperature, humidity, wind_speed, weather_description,
                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING id",
            &[
                DatabaseValue::Int64(new.incident_id),
                DatabaseValue::Real64(new.temperature),
                DatabaseValue::Real64(new.humidity),
                DatabaseValue::Real64(new.wind_speed),
                DatabaseValue::String(new.weather_description.clone()),
                timestamp_value(Some(&now)),
            ],
        )
        .await?;
    let id = returned_id(&rows)?;

    Ok(WeatherConditionRow {
        id,
        incident_id: new.incident_id,
        temperature: new.temperature,
        humidity: new.humidity,
        wind_speed: new.wind_speed,
        weather_description: new.weather_description.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Replaces the fields of an existing weather condition. Returns `None`
/// if no record has the given id, whatever the incident is.
///
/// # Errors
///
/// Returns [`DbError::MissingReference`] if the incident does not exist,
/// or another [`DbError`] if the database operation fails.
pub async fn update(
    db: &dyn Database,
    id: i64,
    new: &NewWeatherCondition,
) -> Result<Option<WeatherConditionRow>, DbError> {
    let txn = db.begin_transaction().await?;
    let result = update_row(txn.as_ref(), id, new).await;
    finish(txn, result).await
}

async fn update_row(
    db: &dyn Database,
    id: i64,
    new: &NewWeatherCondition,
) -> Result<Option<WeatherConditionRow>, DbError> {
    if !exists(db, TABLE, id).await? {
        return Ok(None);
    }
    require(db, incidents::TABLE, "Incident", new.incident_id).await?;

    let updated = db
        .exec_raw_params(
            "UPDATE fire_weatherconditions SET
                incident_id = $1, temperature = $2, humidity = $3,
                wind_speed = $4, weather_description = $5, updated_at = $6
             WHERE id = $7",
            &[
                DatabaseValue::Int64(new.incident_id),
                DatabaseValue::Real64(new.temperature),
                DatabaseValue::Real64(new.humidity),
                DatabaseValue::Real64(new.wind_speed),
                DatabaseValue::String(new.weather_description.clone()),
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

/// Deletes a weather condition record. Returns whether the row existed.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete(db: &dyn Database, id: i64) -> Result<bool, DbError> {
    let deleted = db
        .exec_raw_params(
            "DELETE FROM fire_weatherconditions WHERE id = $1",
            &[DatabaseValue::Int64(id)],
        )
        .await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use fire_map_fire_models::FireSeverity;

    use super::*;
    use crate::db::test_support::TempDb;
    use crate::queries::locations;

    fn sample(incident_id: i64) -> NewWeatherCondition {
        NewWeatherCondition {
            incident_id,
            temperature: 31.5,
            humidity: 64.0,
            wind_speed: 12.0,
            weather_description: "Hot and gusty".to_string(),
        }
    }

    #[tokio::test]
    async fn weather_follows_incident_lifecycle() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();
        let loc = locations::insert(db, &locations::tests::sample("Cebu", "Philippines"))
            .await
            .unwrap();
        let incident = incidents::insert(
            db,
            &incidents::tests::sample(loc.id, None, FireSeverity::Moderate),
        )
        .await
        .unwrap();

        let weather = insert(db, &sample(incident.id)).await.unwrap();
        assert_eq!(get(db, weather.id).await.unwrap(), Some(weather.clone()));

        let mut changed = sample(incident.id);
        changed.humidity = 80.0;
        let updated = update(db, weather.id, &changed).await.unwrap().unwrap();
        assert!((updated.humidity - 80.0).abs() < f64::EPSILON);

        assert!(incidents::delete(db, incident.id).await.unwrap());
        assert!(list(db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_incident() {
        let tmp = TempDb::new().await;
        let err = insert(tmp.db.as_ref(), &sample(3)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::MissingReference {
                entity: "Incident",
                id: 3
            }
        ));
    }
}
