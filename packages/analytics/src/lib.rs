#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chart aggregations and map flatteners over fire incident records.
//!
//! Every public query function is a read-only pass over the store: it runs
//! a grouped SQL query through `switchy_database` and hands the raw rows
//! to a pure reshaping function that produces a dense, fixed-shape result
//! from `fire_map_analytics_models`. The reshaping functions are public so
//! they can be exercised without a database.

pub mod charts;
pub mod maps;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use fire_map_database::queries::{incidents, locations};
    use fire_map_database_models::{NewIncident, NewLocation};
    use fire_map_fire_models::FireSeverity;
    use switchy_database::Database;

    pub struct TempDb {
        pub db: Box<dyn Database>,
        path: PathBuf,
    }

    impl TempDb {
        pub async fn new() -> Self {
            let path = std::env::temp_dir()
                .join(format!("fire_map_analytics_test_{}.db", uuid::Uuid::new_v4()));
            let db = fire_map_database::db::open_db(&path).await.unwrap();
            Self { db, path }
        }

        pub async fn location(&self, city: &str, country: &str) -> i64 {
            locations::insert(
                self.db.as_ref(),
                &NewLocation {
                    name: format!("{city} site"),
                    latitude: 10.3157,
                    longitude: 123.8854,
                    address: "N/A".to_string(),
                    city: city.to_string(),
                    country: country.to_string(),
                },
            )
            .await
            .unwrap()
            .id
        }

        pub async fn incident(&self, location_id: i64, date_time: Option<&str>, severity: u8) -> i64 {
            incidents::insert(
                self.db.as_ref(),
                &NewIncident {
                    location_id,
                    date_time: date_time.map(|s| {
                        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
                    }),
                    severity_level: FireSeverity::from_value(severity).unwrap(),
                    description: "Structure fire".to_string(),
                },
            )
            .await
            .unwrap()
            .id
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
