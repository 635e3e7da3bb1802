//! SiteCast - Weather-Sensitive Construction Scheduling Engine
//!
//! Serves forecast ingestion, daily aggregation, work-window finding,
//! suitability classification, and historical weather-impact analytics
//! over a thin JSON API.

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitecast_backend::{create_app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitecast_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting SiteCast Scheduling Engine");
    tracing::info!("Environment: {}", config.environment);
    if config.weather.owm_api_key.is_none() {
        tracing::info!("Fallback provider key not set; running on the primary provider only");
    }

    let port = config.server.port;
    let state = AppState::new(config)?;

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
