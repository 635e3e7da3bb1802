//! HTTP handlers for weather endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::weather::evaluate_alerts;
use crate::AppState;
use shared::models::{DailySummary, WeatherAlertNotice, WeatherSample};
use shared::types::GpsCoordinates;
use shared::validation::validate_coordinates;

/// Query parameters naming a site; the configured project coordinates apply
/// when omitted
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}

impl LocationQuery {
    /// Resolve the query against the configured default site
    pub fn resolve(&self, state: &AppState) -> AppResult<GpsCoordinates> {
        let latitude = self.latitude.unwrap_or(state.config.project.latitude);
        let longitude = self.longitude.unwrap_or(state.config.project.longitude);

        validate_coordinates(latitude, longitude).map_err(|msg| AppError::Validation {
            field: "latitude/longitude".to_string(),
            message: msg.to_string(),
        })?;

        Ok(GpsCoordinates::new(latitude, longitude))
    }
}

/// Get current conditions
pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<WeatherSample>> {
    let site = query.resolve(&state)?;
    let sample = state.weather.current(site.latitude, site.longitude).await?;
    Ok(Json(sample))
}

/// Get the hourly forecast series
pub async fn get_hourly_forecast(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<WeatherSample>>> {
    let site = query.resolve(&state)?;
    let samples = state.weather.hourly(site.latitude, site.longitude).await?;
    Ok(Json(samples))
}

/// Get daily forecast summaries
pub async fn get_daily_forecast(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<DailySummary>>> {
    let site = query.resolve(&state)?;
    let summaries = state.weather.daily(site.latitude, site.longitude).await?;
    Ok(Json(summaries))
}

/// Combined current-plus-forecast response
#[derive(Debug, serde::Serialize)]
pub struct WeatherSnapshotResponse {
    pub current: WeatherSample,
    pub hourly: Vec<WeatherSample>,
}

/// Get current conditions and the hourly series in one call
///
/// The two fetches run concurrently; they are independent provider calls.
pub async fn get_weather_snapshot(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<WeatherSnapshotResponse>> {
    let site = query.resolve(&state)?;
    let (current, hourly) = state.weather.snapshot(site.latitude, site.longitude).await;
    Ok(Json(WeatherSnapshotResponse {
        current: current?,
        hourly: hourly?,
    }))
}

/// Get forecast alerts for the coming days
pub async fn get_weather_alerts(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<WeatherAlertNotice>>> {
    let site = query.resolve(&state)?;
    let summaries = state.weather.daily(site.latitude, site.longitude).await?;
    let alerts = evaluate_alerts(&summaries, &state.config.scheduling);
    Ok(Json(alerts))
}
