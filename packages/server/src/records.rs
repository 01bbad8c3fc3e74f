#![allow(clippy::future_not_send)]
//! JSON CRUD endpoints for the six record types.
//!
//! Each record type is described once by a [`Resource`] impl; the handlers
//! are generic over it and are registered per type in [`configure`].

use actix_web::{HttpResponse, web};
use fire_map_database::{DbError, queries};
use fire_map_database_models::{
    FireStationRow, FireTruckRow, FirefighterRow, IncidentRow, LocationRow, NewFireStation,
    NewFireTruck, NewFirefighter, NewIncident, NewLocation, NewWeatherCondition,
    WeatherConditionRow,
};
use fire_map_server_models::{
    ApiError, ApiMessage, ApiRecord, FireStationForm, FireTruckForm, FirefighterForm,
    IncidentForm, LocationForm, ValidationErrors, WeatherConditionForm,
};
use serde::{Serialize, de::DeserializeOwned};
use switchy_database::Database;

use crate::AppState;

/// A record type exposed under `/api/{PATH}`.
pub(crate) trait Resource: 'static {
    /// Path segment under `/api`.
    const PATH: &'static str;
    /// Name used in messages, e.g. `"Fire Station"`.
    const LABEL: &'static str;
    /// Request field holding the parent id, if the record has a parent.
    const PARENT_FIELD: Option<&'static str>;

    type Form: DeserializeOwned + 'static;
    type New;
    type Row: Serialize;

    fn validate(form: &Self::Form) -> Result<Self::New, ValidationErrors>;
    async fn list(db: &dyn Database) -> Result<Vec<Self::Row>, DbError>;
    async fn get(db: &dyn Database, id: i64) -> Result<Option<Self::Row>, DbError>;
    async fn insert(db: &dyn Database, new: &Self::New) -> Result<Self::Row, DbError>;
    async fn update(
        db: &dyn Database,
        id: i64,
        new: &Self::New,
    ) -> Result<Option<Self::Row>, DbError>;
    async fn delete(db: &dyn Database, id: i64) -> Result<bool, DbError>;
}

macro_rules! resource {
    (
        $name:ident, $module:ident, $path:literal, $label:literal, $parent:expr,
        $form:ty, $new:ty, $row:ty
    ) => {
        pub(crate) struct $name;

        impl Resource for $name {
            const PATH: &'static str = $path;
            const LABEL: &'static str = $label;
            const PARENT_FIELD: Option<&'static str> = $parent;

            type Form = $form;
            type New = $new;
            type Row = $row;

            fn validate(form: &Self::Form) -> Result<Self::New, ValidationErrors> {
                form.validate()
            }

            async fn list(db: &dyn Database) -> Result<Vec<Self::Row>, DbError> {
                queries::$module::list(db).await
            }

            async fn get(db: &dyn Database, id: i64) -> Result<Option<Self::Row>, DbError> {
                queries::$module::get(db, id).await
            }

            async fn insert(db: &dyn Database, new: &Self::New) -> Result<Self::Row, DbError> {
                queries::$module::insert(db, new).await
            }

            async fn update(
                db: &dyn Database,
                id: i64,
                new: &Self::New,
            ) -> Result<Option<Self::Row>, DbError> {
                queries::$module::update(db, id, new).await
            }

            async fn delete(db: &dyn Database, id: i64) -> Result<bool, DbError> {
                queries::$module::delete(db, id).await
            }
        }
    };
}

resource!(
    Locations, locations, "locations", "Location", None,
    LocationForm, NewLocation, LocationRow
);
resource!(
    Incidents, incidents, "incidents", "Incident", Some("locationId"),
    IncidentForm, NewIncident, IncidentRow
);
resource!(
    Stations, stations, "stations", "Fire Station", None,
    FireStationForm, NewFireStation, FireStationRow
);
resource!(
    Firefighters, firefighters, "firefighters", "Firefighter", Some("stationId"),
    FirefighterForm, NewFirefighter, FirefighterRow
);
resource!(
    Trucks, trucks, "trucks", "Fire Truck", Some("stationId"),
    FireTruckForm, NewFireTruck, FireTruckRow
);
resource!(
    Weather, weather, "weather", "Weather condition", Some("incidentId"),
    WeatherConditionForm, NewWeatherCondition, WeatherConditionRow
);

/// Registers the collection and item routes for `R`.
fn routes<R: Resource>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(format!("/{}", R::PATH))
            .route(web::get().to(list::<R>))
            .route(web::post().to(create::<R>)),
    )
    .service(
        web::resource(format!("/{}/{{id}}", R::PATH))
            .route(web::get().to(get::<R>))
            .route(web::put().to(update::<R>))
            .route(web::delete().to(delete::<R>)),
    );
}

/// Registers every record type. Mounted under `/api`.
pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    routes::<Locations>(cfg);
    routes::<Incidents>(cfg);
    routes::<Stations>(cfg);
    routes::<Firefighters>(cfg);
    routes::<Trucks>(cfg);
    routes::<Weather>(cfg);
}

fn not_found<R: Resource>(id: i64) -> HttpResponse {
    HttpResponse::NotFound().json(ApiError::new(format!("{} {id} not found", R::LABEL)))
}

/// Maps a store error to a response. A dangling parent id is the client's
/// mistake and is reported like a validation failure.
fn store_failure<R: Resource>(action: &str, e: &DbError) -> HttpResponse {
    if let DbError::MissingReference { .. } = e {
        log::debug!("Rejected {} {action}: {e}", R::LABEL);
        return HttpResponse::UnprocessableEntity()
            .json(ValidationErrors::single(R::PARENT_FIELD.unwrap_or("id"), e.to_string()));
    }

    log::error!("Failed to {action} {}: {e}", R::LABEL);
    HttpResponse::InternalServerError().json(ApiError::new(format!(
        "Failed to {action} {}",
        R::LABEL.to_lowercase()
    )))
}

/// `GET /api/{PATH}`
async fn list<R: Resource>(state: web::Data<AppState>) -> HttpResponse {
    match R::list(state.db.as_ref()).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => store_failure::<R>("list", &e),
    }
}

/// `GET /api/{PATH}/{id}`
async fn get<R: Resource>(state: web::Data<AppState>, id: web::Path<i64>) -> HttpResponse {
    let id = id.into_inner();
    match R::get(state.db.as_ref(), id).await {
        Ok(Some(row)) => HttpResponse::Ok().json(row),
        Ok(None) => not_found::<R>(id),
        Err(e) => store_failure::<R>("fetch", &e),
    }
}

/// `POST /api/{PATH}`
async fn create<R: Resource>(
    state: web::Data<AppState>,
    form: web::Json<R::Form>,
) -> HttpResponse {
    let new = match R::validate(&form) {
        Ok(new) => new,
        Err(errors) => return HttpResponse::UnprocessableEntity().json(errors),
    };

    match R::insert(state.db.as_ref(), &new).await {
        Ok(record) => {
            log::info!("Created {}", R::LABEL);
            HttpResponse::Created().json(ApiRecord {
                message: format!("{} successfully added.", R::LABEL),
                record,
            })
        }
        Err(e) => store_failure::<R>("create", &e),
    }
}

/// `PUT /api/{PATH}/{id}`
async fn update<R: Resource>(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Json<R::Form>,
) -> HttpResponse {
    let id = id.into_inner();
    let new = match R::validate(&form) {
        Ok(new) => new,
        Err(errors) => return HttpResponse::UnprocessableEntity().json(errors),
    };

    match R::update(state.db.as_ref(), id, &new).await {
        Ok(Some(record)) => HttpResponse::Ok().json(ApiRecord {
            message: format!("{} successfully updated.", R::LABEL),
            record,
        }),
        Ok(None) => not_found::<R>(id),
        Err(e) => store_failure::<R>("update", &e),
    }
}

/// `DELETE /api/{PATH}/{id}`
async fn delete<R: Resource>(state: web::Data<AppState>, id: web::Path<i64>) -> HttpResponse {
    let id = id.into_inner();
    match R::delete(state.db.as_ref(), id).await {
        Ok(true) => HttpResponse::Ok().json(ApiMessage {
            message: format!("{} successfully deleted.", R::LABEL),
        }),
        Ok(false) => not_found::<R>(id),
        Err(e) => store_failure::<R>("delete", &e),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    use crate::test_support::TempDb;

    fn location() -> Value {
        json!({
            "name": "Pier 4 warehouse",
            "latitude": 10.2926,
            "longitude": 123.9022,
            "address": "Pier 4, North Reclamation",
            "city": "Cebu",
            "country": "Philippines"
        })
    }

    #[actix_web::test]
    async fn location_crud_round_trip() {
        let tmp = TempDb::new().await;
        let app = test::init_service(App::new().configure(|cfg| tmp.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/locations")
            .set_json(location())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Location successfully added.");
        let id = body["record"]["id"].as_i64().unwrap();

        let mut changed = location();
        changed["city"] = json!("Mandaue");
        let req = test::TestRequest::put()
            .uri(&format!("/api/locations/{id}"))
            .set_json(changed)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Location successfully updated.");
        assert_eq!(body["record"]["city"], "Mandaue");

        let req = test::TestRequest::get().uri("/api/locations").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/locations/{id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"message": "Location successfully deleted."}));

        let req = test::TestRequest::get()
            .uri(&format!("/api/locations/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn invalid_form_is_unprocessable() {
        let tmp = TempDb::new().await;
        let app = test::init_service(App::new().configure(|cfg| tmp.configure(cfg))).await;

        let mut bad = location();
        bad["name"] = json!("  ");
        bad["latitude"] = json!(120.0);
        let req = test::TestRequest::post()
            .uri("/api/stations")
            .set_json(bad)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation failed");
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "latitude"]);
    }

    #[actix_web::test]
    async fn malformed_body_is_unprocessable() {
        let tmp = TempDb::new().await;
        let app = test::init_service(App::new().configure(|cfg| tmp.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/incidents")
            .set_json(json!({"description": "no location"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn incident_with_missing_location_is_unprocessable() {
        let tmp = TempDb::new().await;
        let app = test::init_service(App::new().configure(|cfg| tmp.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/incidents")
            .set_json(json!({
                "locationId": 42,
                "dateTime": "2024-02-15T09:30",
                "severityLevel": 2,
                "description": "Kitchen fire"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"][0]["field"], "locationId");
    }

    #[actix_web::test]
    async fn update_of_missing_incident_is_not_found_before_parent_check() {
        let tmp = TempDb::new().await;
        let app = test::init_service(App::new().configure(|cfg| tmp.configure(cfg))).await;

        let req = test::TestRequest::put()
            .uri("/api/incidents/99")
            .set_json(json!({
                "locationId": 42,
                "severityLevel": 1,
                "description": "Kitchen fire"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn station_delete_message_and_missing_update() {
        let tmp = TempDb::new().await;
        let app = test::init_service(App::new().configure(|cfg| tmp.configure(cfg))).await;

        let req = test::TestRequest::put()
            .uri("/api/stations/7")
            .set_json(location())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/stations")
            .set_json(location())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["record"]["id"].as_i64().unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/stations/{id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Fire Station successfully deleted.");
    }
}
