use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ServiceError,
    geocode::GeocodeService,
    models::{
        DailyForecast, HourlyForecast, LocationRequest, NamedPoint, User, UserLocation,
        WeatherOverview,
    },
    store::LocationStore,
    weather::WeatherService,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
    pub geocode: Arc<GeocodeService>,
    pub locations: Arc<dyn LocationStore>,
}

#[derive(Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

/// Reply of the location endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LocationResponse {
    Success { location: NamedPoint },
    Error { message: String },
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/overview", post(get_overview))
        .route("/forecast/hourly", post(get_hourly))
        .route("/forecast/daily", post(get_daily))
        .route("/location/search", post(search_location))
        .route("/location", post(get_location).put(set_location))
        .with_state(state)
}

async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello, Weather Microservice!".to_string(),
    })
}

async fn get_overview(
    State(state): State<AppState>,
    Json(point): Json<NamedPoint>,
) -> Result<Json<WeatherOverview>, ServiceError> {
    Ok(Json(state.weather.overview(&point).await?))
}

async fn get_hourly(
    State(state): State<AppState>,
    Json(point): Json<NamedPoint>,
) -> Result<Json<HourlyForecast>, ServiceError> {
    Ok(Json(state.weather.hourly(&point).await?))
}

async fn get_daily(
    State(state): State<AppState>,
    Json(point): Json<NamedPoint>,
) -> Result<Json<DailyForecast>, ServiceError> {
    Ok(Json(state.weather.daily(&point).await?))
}

async fn search_location(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> Result<Json<Vec<NamedPoint>>, ServiceError> {
    Ok(Json(state.geocode.search(&request).await?))
}

async fn set_location(
    State(state): State<AppState>,
    Json(payload): Json<UserLocation>,
) -> Result<Json<LocationResponse>, ServiceError> {
    state
        .locations
        .save(&payload.username, &payload.location)
        .await?;
    Ok(Json(LocationResponse::Success {
        location: payload.location,
    }))
}

async fn get_location(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<LocationResponse>, ServiceError> {
    let response = match state.locations.fetch(&user.username).await? {
        Some(location) => LocationResponse::Success { location },
        None => LocationResponse::Error {
            message: "no location found".to_string(),
        },
    };
    Ok(Json(response))
}
