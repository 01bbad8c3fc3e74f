#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types and insert/update payloads.
//!
//! `*Row` types are records as read back from the `SQLite` store. `New*`
//! types carry already-validated field values into an insert or update;
//! validation of raw form input lives in `fire_map_server_models`.

use chrono::NaiveDateTime;
use fire_map_fire_models::FireSeverity;
use serde::{Deserialize, Serialize};

/// A registered location where incidents occur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRow {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Country.
    pub country: String,
    /// When the row was created (UTC).
    pub created_at: NaiveDateTime,
    /// When the row was last modified (UTC).
    pub updated_at: NaiveDateTime,
}

/// Field values for inserting or updating a [`LocationRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub country: String,
}

/// A fire incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRow {
    /// Primary key.
    pub id: i64,
    /// Location the incident occurred at.
    pub location_id: i64,
    /// When the incident occurred, if known.
    pub date_time: Option<NaiveDateTime>,
    /// Severity code.
    pub severity_level: FireSeverity,
    /// Short description.
    pub description: String,
    /// When the row was created (UTC).
    pub created_at: NaiveDateTime,
    /// When the row was last modified (UTC).
    pub updated_at: NaiveDateTime,
}

/// Field values for inserting or updating an [`IncidentRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    pub location_id: i64,
    pub date_time: Option<NaiveDateTime>,
    pub severity_level: FireSeverity,
    pub description: String,
}

/// A fire station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireStationRow {
    /// Primary key.
    pub id: i64,
    /// Station name.
    pub name: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Country.
    pub country: String,
    /// When the row was created (UTC).
    pub created_at: NaiveDateTime,
    /// When the row was last modified (UTC).
    pub updated_at: NaiveDateTime,
}

/// Field values for inserting or updating a [`FireStationRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFireStation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub country: String,
}

/// A firefighter, optionally assigned to a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirefighterRow {
    /// Primary key.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// Rank title.
    pub rank: String,
    /// Experience level.
    pub experience_level: String,
    /// Assigned station, if any.
    pub station_id: Option<i64>,
    /// When the row was created (UTC).
    pub created_at: NaiveDateTime,
    /// When the row was last modified (UTC).
    pub updated_at: NaiveDateTime,
}

/// Field values for inserting or updating a [`FirefighterRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFirefighter {
    pub name: String,
    pub rank: String,
    pub experience_level: String,
    pub station_id: Option<i64>,
}

/// A fire truck stationed at a fire station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireTruckRow {
    /// Primary key.
    pub id: i64,
    /// Truck number painted on the vehicle.
    pub truck_number: String,
    /// Vehicle model.
    pub model: String,
    /// Water/crew capacity as entered by staff.
    pub capacity: String,
    /// Home station.
    pub station_id: i64,
    /// When the row was created (UTC).
    pub created_at: NaiveDateTime,
    /// When the row was last modified (UTC).
    pub updated_at: NaiveDateTime,
}

/// Field values for inserting or updating a [`FireTruckRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFireTruck {
    pub truck_number: String,
    pub model: String,
    pub capacity: String,
    pub station_id: i64,
}

/// Weather recorded for an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConditionRow {
    /// Primary key.
    pub id: i64,
    /// Incident the observation belongs to.
    pub incident_id: i64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// Free-text description ("clear", "gusty", ...).
    pub weather_description: String,
    /// When the row was created (UTC).
    pub created_at: NaiveDateTime,
    /// When the row was last modified (UTC).
    pub updated_at: NaiveDateTime,
}

/// Field values for inserting or updating a [`WeatherConditionRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWeatherCondition {
    pub incident_id: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub weather_description: String,
}
