//! Flatteners feeding the station and incident map pages.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use fire_map_analytics_models::{IncidentMap, IncidentMarker, StationMarker};
use fire_map_database::queries::parse_timestamp;
use fire_map_fire_models::FireSeverity;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::Database;

use crate::AnalyticsError;

/// Shown instead of a date for incidents that have none.
pub const MISSING_DATE: &str = "N/A";

/// Formats an incident date as `YYYY-MM-DD HH:MM`.
#[must_use]
pub fn format_incident_date(date_time: Option<&NaiveDateTime>) -> String {
    date_time.map_or_else(
        || MISSING_DATE.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn parse_stored_date(raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        log::warn!("Unparseable incident date_time '{raw}', showing as {MISSING_DATE}");
    }
    parsed
}

/// Distinct cities across the markers, sorted.
#[must_use]
pub fn distinct_cities(markers: &[IncidentMarker]) -> Vec<String> {
    markers
        .iter()
        .map(|m| m.city.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Builds an incident marker from raw joined columns. Returns `None` (and
/// logs) when the stored severity is out of range.
#[must_use]
pub fn incident_marker(
    city: String,
    latitude: f64,
    longitude: f64,
    description: String,
    date_time: Option<&str>,
    severity: i64,
) -> Option<IncidentMarker> {
    let severity = match FireSeverity::from_i64(severity) {
        Ok(severity) => severity,
        Err(e) => {
            log::warn!("Skipping incident marker: {e}");
            return None;
        }
    };

    Some(IncidentMarker {
        city,
        latitude,
        longitude,
        description,
        date: format_incident_date(parse_stored_date(date_time).as_ref()),
        severity,
    })
}

/// All fire stations as map markers, in id order.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the database query fails.
pub async fn station_markers(db: &dyn Database) -> Result<Vec<StationMarker>, AnalyticsError> {
    let rows = db
        .query_raw_params(
            "SELECT name, latitude, longitude FROM fire_firestation ORDER BY id",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| StationMarker {
            name: row.to_value("name").unwrap_or_default(),
            latitude: row.to_value("latitude").unwrap_or(0.0),
            longitude: row.to_value("longitude").unwrap_or(0.0),
        })
        .collect())
}

/// Every incident joined to its location, plus the distinct city list.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the database query fails.
pub async fn incident_map(db: &dyn Database) -> Result<IncidentMap, AnalyticsError> {
    let rows = db
        .query_raw_params(
            "SELECT l.city AS city, l.latitude AS latitude, l.longitude AS longitude,
                    i.description AS description, i.date_time AS date_time,
                    i.severity_level AS severity_level
             FROM fire_incident i
             JOIN fire_locations l ON i.location_id = l.id
             ORDER BY i.id",
            &[],
        )
        .await?;

    let incidents: Vec<IncidentMarker> = rows
        .iter()
        .filter_map(|row| {
            let date_time: Option<String> = row.to_value("date_time").unwrap_or(None);
            incident_marker(
                row.to_value("city").unwrap_or_default(),
                row.to_value("latitude").unwrap_or(0.0),
                row.to_value("longitude").unwrap_or(0.0),
                row.to_value("description").unwrap_or_default(),
                date_time.as_deref(),
                row.to_value("severity_level").unwrap_or(0),
            )
        })
        .collect();

    log::debug!("incident_map: {} marker(s)", incidents.len());

    let cities = distinct_cities(&incidents);
    Ok(IncidentMap { incidents, cities })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDb;

    fn marker(city: &str) -> IncidentMarker {
        incident_marker(
            city.to_string(),
            1.0,
            2.0,
            "Grass fire".to_string(),
            None,
            1,
        )
        .unwrap()
    }

    #[test]
    fn undated_incident_shows_na() {
        let m = incident_marker(
            "Cebu".to_string(),
            10.3,
            123.9,
            "Warehouse".to_string(),
            None,
            3,
        )
        .unwrap();
        assert_eq!(m.date, "N/A");
        assert_eq!(m.severity, FireSeverity::Major);
    }

    #[test]
    fn dated_incident_drops_seconds() {
        let m = incident_marker(
            "Cebu".to_string(),
            10.3,
            123.9,
            "Warehouse".to_string(),
            Some("2024-03-05 14:07:59"),
            2,
        )
        .unwrap();
        assert_eq!(m.date, "2024-03-05 14:07");
    }

    #[test]
    fn unparseable_date_shows_na() {
        let m = incident_marker(
            "Cebu".to_string(),
            0.0,
            0.0,
            String::new(),
            Some("not a date"),
            1,
        )
        .unwrap();
        assert_eq!(m.date, MISSING_DATE);
    }

    #[test]
    fn out_of_range_severity_is_skipped() {
        assert!(incident_marker("Cebu".to_string(), 0.0, 0.0, String::new(), None, 7).is_none());
    }

    #[test]
    fn cities_are_distinct_and_sorted() {
        let markers = vec![marker("Manila"), marker("Cebu"), marker("Manila")];
        assert_eq!(distinct_cities(&markers), vec!["Cebu", "Manila"]);
    }

    #[tokio::test]
    async fn incident_map_from_store() {
        let tmp = TempDb::new().await;
        let cebu = tmp.location("Cebu", "Philippines").await;
        let davao = tmp.location("Davao", "Philippines").await;
        tmp.incident(cebu, Some("2024-01-15 08:30:00"), 1).await;
        tmp.incident(davao, None, 3).await;
        tmp.incident(cebu, Some("2024-02-01 22:10:00"), 2).await;

        let map = incident_map(tmp.db.as_ref()).await.unwrap();
        assert_eq!(map.incidents.len(), 3);
        assert_eq!(map.incidents[0].date, "2024-01-15 08:30");
        assert_eq!(map.incidents[1].date, "N/A");
        assert_eq!(map.incidents[1].city, "Davao");
        assert!((map.incidents[1].latitude - 10.3157).abs() < 1e-9);
        assert_eq!(map.cities, vec!["Cebu", "Davao"]);
    }

    #[tokio::test]
    async fn station_markers_in_id_order() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();
        for (name, lat) in [("Central", 10.29), ("Mabolo", 10.32)] {
            fire_map_database::queries::stations::insert(
                db,
                &fire_map_database_models::NewFireStation {
                    name: name.to_string(),
                    latitude: lat,
                    longitude: 123.9,
                    address: "N/A".to_string(),
                    city: "Cebu".to_string(),
                    country: "Philippines".to_string(),
                },
            )
            .await
            .unwrap();
        }

        let markers = station_markers(db).await.unwrap();
        let names: Vec<&str> = markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Central", "Mabolo"]);
        assert!((markers[1].latitude - 10.32).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_store_gives_empty_maps() {
        let tmp = TempDb::new().await;
        let db = tmp.db.as_ref();
        assert!(station_markers(db).await.unwrap().is_empty());
        assert_eq!(incident_map(db).await.unwrap(), IncidentMap::default());
    }
}
