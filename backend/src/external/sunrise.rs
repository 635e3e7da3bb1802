//! Sunrise/sunset enrichment client
//!
//! Best-effort only: any failure (network, status, payload shape) collapses
//! to `None` and the caller proceeds with the fields unset. This is the one
//! place a provider error is deliberately swallowed.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Sunrise/sunset lookup client
#[derive(Clone)]
pub struct SunriseClient {
    client: Client,
    base_url: String,
}

/// Resolved sun times for one date
#[derive(Debug, Clone, Copy)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SunriseResponse {
    results: SunriseResults,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SunriseResults {
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
}

impl SunriseClient {
    /// Create a new SunriseClient
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.sunrise_base_url.clone(),
        })
    }

    /// Look up sun times for a date, or `None` on any failure
    pub async fn fetch(
        &self,
        latitude: Decimal,
        longitude: Decimal,
        date: NaiveDate,
    ) -> Option<SunTimes> {
        match self.try_fetch(latitude, longitude, date).await {
            Ok(times) => Some(times),
            Err(e) => {
                tracing::debug!("Sunrise enrichment skipped: {}", e);
                None
            }
        }
    }

    async fn try_fetch(
        &self,
        latitude: Decimal,
        longitude: Decimal,
        date: NaiveDate,
    ) -> AppResult<SunTimes> {
        let url = format!(
            "{}?lat={}&lng={}&date={}&formatted=0",
            self.base_url, latitude, longitude, date
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("sunrise request: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "sunrise request returned {}",
                response.status()
            )));
        }

        let data: SunriseResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("sunrise response: {}", e)))?;

        if data.status != "OK" {
            return Err(AppError::ExternalService(format!(
                "sunrise lookup status {}",
                data.status
            )));
        }

        Ok(SunTimes {
            sunrise: data.results.sunrise,
            sunset: data.results.sunset,
        })
    }
}
