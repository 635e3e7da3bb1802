//! Configuration management for the SiteCast scheduling engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SITECAST_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Default project site
    pub project: ProjectConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Scheduling policy thresholds
    pub scheduling: SchedulingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Default coordinates used when a request does not name a site
#[derive(Debug, Deserialize, Clone)]
pub struct ProjectConfig {
    pub latitude: Decimal,
    pub longitude: Decimal,

    /// IANA timezone applied when no sample carries one
    pub timezone: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Primary provider (National Weather Service) base URL
    pub nws_base_url: String,

    /// User-Agent the primary provider requires on every request
    pub nws_user_agent: String,

    /// Fallback provider (OpenWeatherMap) base URL
    pub owm_base_url: String,

    /// Fallback provider API key; the fallback adapter is skipped entirely
    /// when unset
    pub owm_api_key: Option<String>,

    /// Sunrise/sunset enrichment base URL
    pub sunrise_base_url: String,

    /// Per-request timeout for provider calls, seconds
    pub request_timeout_secs: u64,

    /// Freshness intervals consumed by external caching layers; the engine
    /// itself never caches
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub current_minutes: u64,
    pub forecast_minutes: u64,
    pub point_minutes: u64,
}

/// Scheduling policy thresholds
///
/// These are reference policy values, not constants derived from any single
/// authority; deployments tune them per trade and region.
#[derive(Debug, Deserialize, Clone)]
pub struct SchedulingConfig {
    /// Degrees F from a temperature bound that downgrade GO to CAUTION
    pub temp_caution_margin_f: Decimal,

    /// mph from the wind bound that downgrade GO to CAUTION
    pub wind_caution_margin_mph: Decimal,

    /// Hourly pop (0-100 percent) at or above which a sample fails a
    /// no-precip constraint
    pub precip_window_percent: i32,

    /// Daily precip probability percent at which a no-precip day is CAUTION
    pub precip_caution_percent: i32,

    /// Daily precip probability percent at which a no-precip day is HOLD
    pub precip_hold_percent: i32,

    /// Maximum ranked windows returned per package
    pub max_windows: usize,

    /// Hours of forecast horizon per point of confidence penalty
    pub confidence_horizon_divisor: u32,

    /// Daily standby cost of an idle crew, used for weather-impact estimates
    pub standby_rate_per_day: Decimal,

    /// Production target, sqft per crew member per day
    pub production_target_sqft: Decimal,

    /// Percent change between trend windows considered a real move
    pub trend_threshold_percent: Decimal,

    /// Forecast alert thresholds
    pub frost_warning_f: Decimal,
    pub heat_warning_f: Decimal,
    pub wind_warning_mph: Decimal,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SITECAST_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            // Denver metro reference site
            .set_default("project.latitude", "39.7392")?
            .set_default("project.longitude", "-104.9903")?
            .set_default("project.timezone", "America/Denver")?
            .set_default("weather.nws_base_url", "https://api.weather.gov")?
            .set_default(
                "weather.nws_user_agent",
                "sitecast/0.1 (ops@sitecast.example)",
            )?
            .set_default(
                "weather.owm_base_url",
                "https://api.openweathermap.org/data/2.5",
            )?
            .set_default(
                "weather.sunrise_base_url",
                "https://api.sunrise-sunset.org/json",
            )?
            .set_default("weather.request_timeout_secs", 10)?
            .set_default("weather.cache.current_minutes", 5)?
            .set_default("weather.cache.forecast_minutes", 30)?
            .set_default("weather.cache.point_minutes", 30)?
            .set_default("scheduling.temp_caution_margin_f", "5")?
            .set_default("scheduling.wind_caution_margin_mph", "5")?
            .set_default("scheduling.precip_window_percent", 30)?
            .set_default("scheduling.precip_caution_percent", 30)?
            .set_default("scheduling.precip_hold_percent", 60)?
            .set_default("scheduling.max_windows", 2)?
            .set_default("scheduling.confidence_horizon_divisor", 4)?
            .set_default("scheduling.standby_rate_per_day", "2400")?
            .set_default("scheduling.production_target_sqft", "200")?
            .set_default("scheduling.trend_threshold_percent", "10")?
            .set_default("scheduling.frost_warning_f", "32")?
            .set_default("scheduling.heat_warning_f", "95")?
            .set_default("scheduling.wind_warning_mph", "30")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SITECAST_ prefix)
            .add_source(
                Environment::with_prefix("SITECAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
