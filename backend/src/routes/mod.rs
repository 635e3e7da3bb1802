//! Route definitions for the SiteCast scheduling engine

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Weather ingestion and aggregation
        .nest("/weather", weather_routes())
        // Work-window and suitability engine
        .nest("/schedule", schedule_routes())
        // Historical analytics
        .nest("/analytics", analytics_routes())
}

/// Weather routes
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/current", get(handlers::get_current_weather))
        .route("/hourly", get(handlers::get_hourly_forecast))
        .route("/snapshot", get(handlers::get_weather_snapshot))
        .route("/daily", get(handlers::get_daily_forecast))
        .route("/alerts", get(handlers::get_weather_alerts))
}

/// Scheduling routes
fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/packages", get(handlers::list_packages))
        .route("/windows/:package_id", get(handlers::get_work_windows))
        .route("/suitability", get(handlers::get_day_suitability))
}

/// Analytics routes (history supplied in the request body)
fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/production", post(handlers::get_production_metrics))
        .route("/efficiency", post(handlers::get_crew_efficiency))
        .route("/weather-impact", post(handlers::get_weather_impact))
}
