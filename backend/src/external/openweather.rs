//! OpenWeatherMap API client (fallback provider)
//!
//! Used only when the primary provider fails or yields an empty series.
//! Requests imperial units so temperature and wind arrive in the canonical
//! Fahrenheit/mph already; precipitation probability is a 0-1 fraction in
//! the payload.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::external::ForecastProvider;
use shared::models::WeatherSample;

/// OpenWeatherMap API client
#[derive(Clone)]
pub struct OwmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    weather: Vec<OwmWeather>,
    main: OwmMain,
    wind: OwmWind,
    dt: i64,
    sys: Option<OwmSys>,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    deg: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    weather: Vec<OwmWeather>,
    wind: OwmWind,
    pop: Option<f64>,
}

impl OwmClient {
    /// Create a new OwmClient
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.owm_api_key.clone(),
            base_url: config.owm_base_url.clone(),
        })
    }

    /// Create a new OwmClient with custom base URL (for testing)
    pub fn with_base_url(config: &WeatherConfig, base_url: String) -> AppResult<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url;
        Ok(client)
    }

    fn key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::ConfigMissing("OpenWeatherMap API key".to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("OWM request: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ProviderUnavailable(format!(
                "OWM request returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamData(format!("OWM response: {}", e)))
    }

    fn convert_current(data: OwmCurrentResponse) -> WeatherSample {
        let weather = data.weather.first();
        let epoch = |secs| DateTime::<Utc>::from_timestamp(secs, 0);

        WeatherSample {
            timestamp: epoch(data.dt).unwrap_or_else(Utc::now),
            temperature_f: Decimal::from_f64_retain(data.main.temp).unwrap_or_default(),
            feels_like_f: Decimal::from_f64_retain(data.main.feels_like).unwrap_or_default(),
            humidity_percent: data.main.humidity,
            wind_speed_mph: Decimal::from_f64_retain(data.wind.speed).unwrap_or_default(),
            wind_direction_deg: data.wind.deg.unwrap_or(0),
            conditions: weather.map(|w| w.description.clone()).unwrap_or_default(),
            icon: weather.map(|w| w.icon.clone()).unwrap_or_default(),
            pop: Decimal::ZERO,
            timezone: None,
            sunrise: data
                .sys
                .as_ref()
                .and_then(|s| s.sunrise)
                .and_then(epoch),
            sunset: data
                .sys
                .as_ref()
                .and_then(|s| s.sunset)
                .and_then(epoch),
        }
    }

    fn convert_forecast_item(item: OwmForecastItem) -> WeatherSample {
        let weather = item.weather.first();

        WeatherSample {
            timestamp: DateTime::<Utc>::from_timestamp(item.dt, 0).unwrap_or_else(Utc::now),
            temperature_f: Decimal::from_f64_retain(item.main.temp).unwrap_or_default(),
            feels_like_f: Decimal::from_f64_retain(item.main.feels_like).unwrap_or_default(),
            humidity_percent: item.main.humidity,
            wind_speed_mph: Decimal::from_f64_retain(item.wind.speed).unwrap_or_default(),
            wind_direction_deg: item.wind.deg.unwrap_or(0),
            conditions: weather.map(|w| w.description.clone()).unwrap_or_default(),
            icon: weather.map(|w| w.icon.clone()).unwrap_or_default(),
            pop: item
                .pop
                .map(|p| Decimal::from_f64_retain(p).unwrap_or_default())
                .unwrap_or_default(),
            timezone: None,
            sunrise: None,
            sunset: None,
        }
    }
}

#[async_trait]
impl ForecastProvider for OwmClient {
    fn name(&self) -> &'static str {
        "openweathermap"
    }

    fn configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn fetch_hourly(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<Vec<WeatherSample>> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=imperial",
            self.base_url,
            latitude,
            longitude,
            self.key()?
        );

        let data: OwmForecastResponse = self.get_json(&url).await?;

        if data.list.is_empty() {
            return Err(AppError::ProviderUnavailable(
                "OWM returned no forecast entries".to_string(),
            ));
        }

        let mut samples: Vec<WeatherSample> = data
            .list
            .into_iter()
            .map(Self::convert_forecast_item)
            .collect();
        samples.sort_by_key(|s| s.timestamp);

        Ok(samples)
    }

    async fn fetch_current(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<WeatherSample> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=imperial",
            self.base_url,
            latitude,
            longitude,
            self.key()?
        );

        let data: OwmCurrentResponse = self.get_json(&url).await?;
        Ok(Self::convert_current(data))
    }
}
