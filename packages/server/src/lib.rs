#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the fire map application.
//!
//! Serves the dashboard chart data as JSON, the station and incident map
//! pages, and a JSON CRUD API for every record type. All state lives in a
//! single `SQLite` database opened at startup.

pub mod config;
mod handlers;
pub mod pages;
mod records;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, error, middleware, web};
use fire_map_server_models::ValidationErrors;
use switchy_database::Database;

pub use config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Records database.
    pub db: Arc<dyn Database>,
}

/// Answers undecodable JSON bodies with the same 422 shape as a failed
/// form validation.
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ValidationErrors::single("body", err.to_string());
    error::InternalError::from_response(err, HttpResponse::UnprocessableEntity().json(body)).into()
}

/// Registers every route. Expects an `AppState` in the app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/", web::get().to(handlers::home))
        .route("/dashboard_chart", web::get().to(handlers::dashboard))
        .route("/chart/", web::get().to(handlers::severity_chart))
        .route("/lineChart/", web::get().to(handlers::monthly_chart))
        .route("/multilineChart/", web::get().to(handlers::country_trend_chart))
        .route("/multiBarChart/", web::get().to(handlers::severity_month_chart))
        .route("/stations", web::get().to(handlers::station_map))
        .route("/incidents", web::get().to(handlers::incident_map))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .configure(records::configure),
        );
}

/// Starts the fire map server.
///
/// Reads [`ServerConfig`] from the environment, opens (and migrates) the
/// database, and runs the Actix-Web HTTP server until shutdown. The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database cannot be opened,
/// or if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    log::info!("Opening database at {}...", config.database_path.display());
    let db = fire_map_database::db::open_db(&config.database_path)
        .await
        .map_err(|e| {
            log::error!("Failed to open database: {e}");
            std::io::Error::other(e.to_string())
        })?;

    let state = web::Data::new(AppState { db: Arc::from(db) });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
