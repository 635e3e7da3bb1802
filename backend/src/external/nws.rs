//! National Weather Service API client (primary provider)
//!
//! Two-step fetch against api.weather.gov: resolve the point to its hourly
//! grid endpoint, then map the forecast periods into canonical samples.
//! The NWS encodes wind as prose ("10 to 20 mph") and direction as compass
//! points, so normalization happens here at ingestion.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::external::ForecastProvider;
use shared::models::WeatherSample;

/// NWS API client
#[derive(Clone)]
pub struct NwsClient {
    client: Client,
    base_url: String,
}

/// Point-to-grid resolution response
#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    #[serde(rename = "forecastHourly")]
    forecast_hourly: String,
    #[serde(rename = "timeZone")]
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
struct ForecastPeriod {
    #[serde(rename = "startTime")]
    start_time: DateTime<FixedOffset>,
    temperature: f64,
    #[serde(rename = "temperatureUnit")]
    temperature_unit: String,
    #[serde(rename = "windSpeed")]
    wind_speed: Option<String>,
    #[serde(rename = "windDirection")]
    wind_direction: Option<String>,
    #[serde(rename = "shortForecast")]
    short_forecast: String,
    icon: Option<String>,
    #[serde(rename = "probabilityOfPrecipitation")]
    probability_of_precipitation: Option<QuantitativeValue>,
    #[serde(rename = "relativeHumidity")]
    relative_humidity: Option<QuantitativeValue>,
}

#[derive(Debug, Deserialize)]
struct QuantitativeValue {
    value: Option<f64>,
}

impl NwsClient {
    /// Create a new NwsClient
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(&config.nws_user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.nws_base_url.clone(),
        })
    }

    /// Create a new NwsClient with custom base URL (for testing)
    pub fn with_base_url(config: &WeatherConfig, base_url: String) -> AppResult<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url;
        Ok(client)
    }

    /// Resolve a coordinate pair to its hourly grid endpoint
    async fn resolve_point(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<PointsProperties> {
        let url = format!(
            "{}/points/{},{}",
            self.base_url,
            latitude.round_dp(4),
            longitude.round_dp(4)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("NWS points request: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ProviderUnavailable(format!(
                "NWS points request returned {}",
                response.status()
            )));
        }

        let points: PointsResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamData(format!("NWS points response: {}", e)))?;

        Ok(points.properties)
    }

    fn convert_period(period: &ForecastPeriod, timezone: Option<&str>) -> WeatherSample {
        let temperature_f = if period.temperature_unit.eq_ignore_ascii_case("C") {
            celsius_to_fahrenheit(
                Decimal::from_f64_retain(period.temperature).unwrap_or_default(),
            )
        } else {
            Decimal::from_f64_retain(period.temperature).unwrap_or_default()
        };

        let pop = period
            .probability_of_precipitation
            .as_ref()
            .and_then(|q| q.value)
            .map(|v| Decimal::from_f64_retain(v / 100.0).unwrap_or_default())
            .unwrap_or_default();

        let humidity_percent = period
            .relative_humidity
            .as_ref()
            .and_then(|q| q.value)
            .map(|v| v.round() as i32)
            .unwrap_or(0);

        WeatherSample {
            timestamp: period.start_time.to_utc(),
            temperature_f,
            // The hourly grid carries no apparent temperature
            feels_like_f: temperature_f,
            humidity_percent,
            wind_speed_mph: parse_wind_speed(period.wind_speed.as_deref().unwrap_or("")),
            wind_direction_deg: compass_to_degrees(period.wind_direction.as_deref().unwrap_or("")),
            conditions: period.short_forecast.clone(),
            icon: period.icon.clone().unwrap_or_default(),
            pop,
            timezone: timezone.map(str::to_owned),
            sunrise: None,
            sunset: None,
        }
    }
}

#[async_trait]
impl ForecastProvider for NwsClient {
    fn name(&self) -> &'static str {
        "nws"
    }

    async fn fetch_hourly(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<Vec<WeatherSample>> {
        let point = self.resolve_point(latitude, longitude).await?;

        let response = self
            .client
            .get(&point.forecast_hourly)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("NWS hourly request: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ProviderUnavailable(format!(
                "NWS hourly request returned {}",
                response.status()
            )));
        }

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamData(format!("NWS hourly response: {}", e)))?;

        if forecast.properties.periods.is_empty() {
            return Err(AppError::ProviderUnavailable(
                "NWS returned no forecast periods".to_string(),
            ));
        }

        let mut samples: Vec<WeatherSample> = forecast
            .properties
            .periods
            .iter()
            .map(|p| Self::convert_period(p, point.time_zone.as_deref()))
            .collect();
        samples.sort_by_key(|s| s.timestamp);

        Ok(samples)
    }

    async fn fetch_current(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<WeatherSample> {
        // The first hourly period covers the current hour
        let samples = self.fetch_hourly(latitude, longitude).await?;
        samples.into_iter().next().ok_or_else(|| {
            AppError::ProviderUnavailable("NWS returned no forecast periods".to_string())
        })
    }
}

/// Convert Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(celsius: Decimal) -> Decimal {
    celsius * Decimal::from(9) / Decimal::from(5) + Decimal::from(32)
}

/// Parse NWS wind-speed prose into mph
///
/// The provider encodes gust ranges as text ("10 to 20 mph"), so every
/// embedded integer is extracted and the maximum wins. No digits parse to
/// zero.
pub fn parse_wind_speed(text: &str) -> Decimal {
    let mut max: u32 = 0;
    let mut current: Option<u32> = None;

    for c in text.chars() {
        if let Some(d) = c.to_digit(10) {
            current = Some(current.unwrap_or(0) * 10 + d);
        } else if let Some(n) = current.take() {
            max = max.max(n);
        }
    }
    if let Some(n) = current {
        max = max.max(n);
    }

    Decimal::from(max)
}

/// 16-point compass rose at 22.5 degree increments
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Convert a compass direction to degrees
///
/// Numeric strings pass through; anything unrecognized defaults to 0.
pub fn compass_to_degrees(direction: &str) -> i32 {
    let trimmed = direction.trim();
    if let Ok(deg) = trimmed.parse::<i32>() {
        return deg;
    }
    COMPASS_POINTS
        .iter()
        .position(|p| p.eq_ignore_ascii_case(trimmed))
        .map(|i| (i as f64 * 22.5).round() as i32)
        .unwrap_or(0)
}
