#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the fire map server.
//!
//! Form types are what clients post to the record endpoints. Each one
//! validates itself into the matching `New*` payload from
//! `fire_map_database_models`, collecting every field problem instead of
//! stopping at the first.

use chrono::NaiveDateTime;
use fire_map_database_models::{
    NewFireStation, NewFireTruck, NewFirefighter, NewIncident, NewLocation, NewWeatherCondition,
};
use fire_map_fire_models::FireSeverity;
use serde::{Deserialize, Serialize};

/// Maximum length of names, addresses, cities, countries and other short
/// text fields.
pub const MAX_TEXT_LEN: usize = 150;

/// Maximum length of free-form descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 250;

/// Formats accepted for an incident's `dateTime` field.
pub const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Query parameters accepted by the year-scoped chart endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuery {
    /// Reporting year. Defaults to the current year.
    pub year: Option<i32>,
}

/// Body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

/// Body of a successful create or update.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRecord<T> {
    pub message: String,
    pub record: T,
}

/// A problem with a single submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears in the request body.
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Body of a 422 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    /// Always `"validation failed"`.
    pub error: String,
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new(fields: Vec<FieldError>) -> Self {
        Self {
            error: "validation failed".to_string(),
            fields,
        }
    }

    /// A single-field failure.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}: {}", self.error, fields.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects field errors while a form is being checked.
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn text(&mut self, field: &str, value: &str, max: usize) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.fail(field, "This field is required.");
        } else if trimmed.chars().count() > max {
            self.fail(
                field,
                format!("Ensure this value has at most {max} characters."),
            );
        }
        trimmed.to_string()
    }

    fn range(&mut self, field: &str, value: f64, min: f64, max: f64) -> f64 {
        if !(min..=max).contains(&value) {
            self.fail(field, format!("Must be between {min} and {max}."));
        }
        value
    }

    fn non_negative(&mut self, field: &str, value: f64) -> f64 {
        if !(value.is_finite() && value >= 0.0) {
            self.fail(field, "Must be zero or greater.");
        }
        value
    }

    fn finite(&mut self, field: &str, value: f64) -> f64 {
        if !value.is_finite() {
            self.fail(field, "Must be a number.");
        }
        value
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationErrors::new(self.errors))
        }
    }
}

/// Parses a submitted date-time in any of [`DATE_TIME_FORMATS`].
#[must_use]
pub fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Location form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationForm {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl LocationForm {
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<NewLocation, ValidationErrors> {
        let mut c = Checker::default();
        let new = NewLocation {
            name: c.text("name", &self.name, MAX_TEXT_LEN),
            latitude: c.range("latitude", self.latitude, -90.0, 90.0),
            longitude: c.range("longitude", self.longitude, -180.0, 180.0),
            address: c.text("address", &self.address, MAX_TEXT_LEN),
            city: c.text("city", &self.city, MAX_TEXT_LEN),
            country: c.text("country", &self.country, MAX_TEXT_LEN),
        };
        c.finish(new)
    }
}

/// Incident form. `dateTime` may be omitted or blank.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentForm {
    pub location_id: i64,
    #[serde(default)]
    pub date_time: Option<String>,
    pub severity_level: i64,
    pub description: String,
}

impl IncidentForm {
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<NewIncident, ValidationErrors> {
        let mut c = Checker::default();

        let date_time = match self.date_time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_date_time(raw);
                if parsed.is_none() {
                    c.fail(
                        "dateTime",
                        "Enter a valid date/time as YYYY-MM-DDTHH:MM or YYYY-MM-DD HH:MM[:SS].",
                    );
                }
                parsed
            }
        };

        let severity_level = match FireSeverity::from_i64(self.severity_level) {
            Ok(severity) => severity,
            Err(e) => {
                c.fail("severityLevel", e.to_string());
                FireSeverity::Minor
            }
        };

        let description = c.text("description", &self.description, MAX_DESCRIPTION_LEN);

        c.finish(NewIncident {
            location_id: self.location_id,
            date_time,
            severity_level,
            description,
        })
    }
}

/// Fire station form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireStationForm {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl FireStationForm {
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<NewFireStation, ValidationErrors> {
        let mut c = Checker::default();
        let new = NewFireStation {
            name: c.text("name", &self.name, MAX_TEXT_LEN),
            latitude: c.range("latitude", self.latitude, -90.0, 90.0),
            longitude: c.range("longitude", self.longitude, -180.0, 180.0),
            address: c.text("address", &self.address, MAX_TEXT_LEN),
            city: c.text("city", &self.city, MAX_TEXT_LEN),
            country: c.text("country", &self.country, MAX_TEXT_LEN),
        };
        c.finish(new)
    }
}

/// Firefighter form. `stationId` may be omitted for an unassigned
/// firefighter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirefighterForm {
    pub name: String,
    pub rank: String,
    pub experience_level: String,
    #[serde(default)]
    pub station_id: Option<i64>,
}

impl FirefighterForm {
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<NewFirefighter, ValidationErrors> {
        let mut c = Checker::default();
        let new = NewFirefighter {
            name: c.text("name", &self.name, MAX_TEXT_LEN),
            rank: c.text("rank", &self.rank, MAX_TEXT_LEN),
            experience_level: c.text("experienceLevel", &self.experience_level, MAX_TEXT_LEN),
            station_id: self.station_id,
        };
        c.finish(new)
    }
}

/// Fire truck form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireTruckForm {
    pub truck_number: String,
    pub model: String,
    pub capacity: String,
    pub station_id: i64,
}

impl FireTruckForm {
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<NewFireTruck, ValidationErrors> {
        let mut c = Checker::default();
        let new = NewFireTruck {
            truck_number: c.text("truckNumber", &self.truck_number, MAX_TEXT_LEN),
            model: c.text("model", &self.model, MAX_TEXT_LEN),
            capacity: c.text("capacity", &self.capacity, MAX_TEXT_LEN),
            station_id: self.station_id,
        };
        c.finish(new)
    }
}

/// Weather condition form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConditionForm {
    pub incident_id: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub weather_description: String,
}

impl WeatherConditionForm {
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<NewWeatherCondition, ValidationErrors> {
        let mut c = Checker::default();
        let new = NewWeatherCondition {
            incident_id: self.incident_id,
            temperature: c.finite("temperature", self.temperature),
            humidity: c.range("humidity", self.humidity, 0.0, 100.0),
            wind_speed: c.non_negative("windSpeed", self.wind_speed),
            weather_description: c.text(
                "weatherDescription",
                &self.weather_description,
                MAX_TEXT_LEN,
            ),
        };
        c.finish(new)
    }
}
