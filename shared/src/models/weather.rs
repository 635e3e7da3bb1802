//! Canonical weather data models
//!
//! Every provider payload is normalized into these records at ingestion:
//! temperatures in Fahrenheit, wind in mph, precipitation probability as a
//! 0-1 fraction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One normalized hourly observation or forecast period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_f: Decimal,
    pub feels_like_f: Decimal,
    pub humidity_percent: i32,
    pub wind_speed_mph: Decimal,
    pub wind_direction_deg: i32,
    pub conditions: String,
    pub icon: String,
    /// Probability of precipitation, 0-1
    pub pop: Decimal,
    /// IANA timezone name for the forecast location, when the provider
    /// reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<DateTime<Utc>>,
}

/// Aggregate of one local calendar day's samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    /// Calendar date in the forecast location's timezone
    pub date: NaiveDate,
    pub high_f: Decimal,
    pub low_f: Decimal,
    pub avg_temp_f: Decimal,
    pub max_wind_mph: Decimal,
    pub avg_humidity_percent: i32,
    /// Max precipitation probability across the day, as a 0-100 percentage
    pub precip_probability: i32,
    /// Most frequent condition description (ties keep the earliest seen)
    pub conditions: String,
    /// Icon of the sample nearest local midday, else the day's first sample
    pub icon: String,
    pub samples: Vec<WeatherSample>,
}

/// Stateless alert derived from a daily forecast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherAlertNotice {
    pub date: NaiveDate,
    pub kind: WeatherAlertKind,
    pub message: String,
}

/// Types of forecast alerts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeatherAlertKind {
    FrostWarning,
    HeatWarning,
    WindWarning,
    RainForecast,
}
