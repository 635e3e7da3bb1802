//! SiteCast - Weather-Sensitive Construction Scheduling Engine
//!
//! Ingests hourly forecasts from multiple providers with fallback,
//! aggregates them into timezone-correct daily summaries, and evaluates a
//! work-package catalog against them to produce GO/CAUTION/HOLD verdicts,
//! ranked work windows, and weather-impact analytics.

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono_tz::Tz;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use error::AppResult;
use external::{ForecastProvider, NwsClient, OwmClient, SunriseClient};
use services::{AnalyticsService, ScheduleService, WeatherService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather: WeatherService,
    pub schedule: Arc<ScheduleService>,
    pub analytics: AnalyticsService,
}

impl AppState {
    /// Build the provider chain and services from configuration
    pub fn new(config: Config) -> AppResult<Self> {
        let providers: Vec<Arc<dyn ForecastProvider>> = vec![
            Arc::new(NwsClient::new(&config.weather)?),
            Arc::new(OwmClient::new(&config.weather)?),
        ];
        let sunrise = SunriseClient::new(&config.weather)?;

        let fallback_timezone: Option<Tz> = config.project.timezone.parse().ok();
        if fallback_timezone.is_none() {
            tracing::warn!(
                timezone = %config.project.timezone,
                "unrecognized project timezone, daily aggregation will fall back to UTC"
            );
        }

        let weather = WeatherService::new(providers, sunrise, fallback_timezone);
        let schedule = Arc::new(ScheduleService::new(config.scheduling.clone()));
        let analytics = AnalyticsService::new(config.scheduling.clone());

        Ok(Self {
            config: Arc::new(config),
            weather,
            schedule,
            analytics,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "SiteCast Scheduling Engine API v1.0"
}
