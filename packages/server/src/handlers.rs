#![allow(clippy::future_not_send)]
//! HTTP handler functions for the chart endpoints and HTML pages.

use actix_web::{HttpResponse, web};
use fire_map_analytics::{AnalyticsError, charts, maps};
use fire_map_database::queries;
use fire_map_server_models::{ApiError, ApiHealth, ChartQuery};
use serde::Serialize;

use crate::{AppState, pages};

fn json_or_500<T: Serialize>(what: &str, result: Result<T, AnalyticsError>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => {
            log::error!("Failed to compute {what}: {e}");
            HttpResponse::InternalServerError()
                .json(ApiError::new(format!("Failed to compute {what}")))
        }
    }
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn page_failure(page: &str, e: &dyn std::fmt::Display) -> HttpResponse {
    log::error!("Failed to render {page}: {e}");
    HttpResponse::InternalServerError().json(ApiError::new(format!("Failed to render {page}")))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /chart/`
///
/// Incident counts keyed by severity code.
pub async fn severity_chart(state: web::Data<AppState>) -> HttpResponse {
    json_or_500(
        "severity counts",
        charts::severity_counts(state.db.as_ref()).await,
    )
}

/// `GET /lineChart/`
///
/// Incident counts per month of the reporting year.
pub async fn monthly_chart(
    state: web::Data<AppState>,
    params: web::Query<ChartQuery>,
) -> HttpResponse {
    let year = params.year.unwrap_or_else(charts::current_year);
    json_or_500(
        "monthly counts",
        charts::monthly_counts(state.db.as_ref(), year).await,
    )
}

/// `GET /multilineChart/`
///
/// Monthly trends for the top three countries of the reporting year.
pub async fn country_trend_chart(
    state: web::Data<AppState>,
    params: web::Query<ChartQuery>,
) -> HttpResponse {
    let year = params.year.unwrap_or_else(charts::current_year);
    json_or_500(
        "country trends",
        charts::top_country_trends(state.db.as_ref(), year).await,
    )
}

/// `GET /multiBarChart/`
///
/// Monthly counts for each severity level.
pub async fn severity_month_chart(state: web::Data<AppState>) -> HttpResponse {
    json_or_500(
        "severity breakdown",
        charts::severity_month_breakdown(state.db.as_ref()).await,
    )
}

/// `GET /`
pub async fn home(state: web::Data<AppState>) -> HttpResponse {
    match queries::locations::list(state.db.as_ref()).await {
        Ok(locations) => html(pages::home_page(&locations)),
        Err(e) => page_failure("home page", &e),
    }
}

/// `GET /dashboard_chart`
pub async fn dashboard() -> HttpResponse {
    html(pages::dashboard_page())
}

/// `GET /stations`
pub async fn station_map(state: web::Data<AppState>) -> HttpResponse {
    let stations = match maps::station_markers(state.db.as_ref()).await {
        Ok(stations) => stations,
        Err(e) => return page_failure("station map", &e),
    };
    match pages::station_map_page(&stations) {
        Ok(body) => html(body),
        Err(e) => page_failure("station map", &e),
    }
}

/// `GET /incidents`
pub async fn incident_map(state: web::Data<AppState>) -> HttpResponse {
    let map = match maps::incident_map(state.db.as_ref()).await {
        Ok(map) => map,
        Err(e) => return page_failure("incident map", &e),
    };
    match pages::incident_map_page(&map) {
        Ok(body) => html(body),
        Err(e) => page_failure("incident map", &e),
    }
}
