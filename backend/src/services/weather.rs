//! Weather service: provider fallback chain and daily aggregation
//!
//! The service walks an ordered adapter chain until one provider succeeds;
//! aggregation into daily summaries is a pure function of the sample
//! sequence and is safe to call concurrently from any number of tasks.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Timelike};
use chrono_tz::Tz;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::SchedulingConfig;
use crate::error::{AppError, AppResult};
use crate::external::{ForecastProvider, SunriseClient};
use shared::models::{DailySummary, WeatherAlertKind, WeatherAlertNotice, WeatherSample};

/// Weather service holding the provider fallback chain
#[derive(Clone)]
pub struct WeatherService {
    providers: Vec<Arc<dyn ForecastProvider>>,
    sunrise: SunriseClient,
    fallback_timezone: Option<Tz>,
}

impl WeatherService {
    /// Create a new WeatherService from an ordered provider chain
    pub fn new(
        providers: Vec<Arc<dyn ForecastProvider>>,
        sunrise: SunriseClient,
        fallback_timezone: Option<Tz>,
    ) -> Self {
        Self {
            providers,
            sunrise,
            fallback_timezone,
        }
    }

    /// Names of the providers currently configured, in fallback order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .filter(|p| p.configured())
            .map(|p| p.name())
            .collect()
    }

    /// Fetch current conditions, enriched with sun times when the lookup
    /// succeeds
    pub async fn current(&self, latitude: Decimal, longitude: Decimal) -> AppResult<WeatherSample> {
        let mut sample = self.current_from_chain(latitude, longitude).await?;

        // Best-effort enrichment; a failed lookup leaves the fields unset
        if sample.sunrise.is_none() {
            if let Some(times) = self
                .sunrise
                .fetch(latitude, longitude, sample.timestamp.date_naive())
                .await
            {
                sample.sunrise = Some(times.sunrise);
                sample.sunset = Some(times.sunset);
            }
        }

        Ok(sample)
    }

    /// Fetch the hourly forecast series, ascending by timestamp
    pub async fn hourly(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<Vec<WeatherSample>> {
        self.hourly_from_chain(latitude, longitude).await
    }

    /// Fetch the hourly forecast and aggregate it into daily summaries
    pub async fn daily(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<Vec<DailySummary>> {
        let samples = self.hourly(latitude, longitude).await?;
        Ok(group_by_day(&samples, self.fallback_timezone))
    }

    /// Fetch current conditions and the hourly series concurrently
    ///
    /// The two fetches are independent; one failing does not poison the
    /// other.
    pub async fn snapshot(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> (AppResult<WeatherSample>, AppResult<Vec<WeatherSample>>) {
        tokio::join!(
            self.current(latitude, longitude),
            self.hourly(latitude, longitude)
        )
    }

    async fn hourly_from_chain(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<Vec<WeatherSample>> {
        let mut last_err: Option<AppError> = None;

        for provider in &self.providers {
            if !provider.configured() {
                tracing::debug!(provider = provider.name(), "skipping unconfigured provider");
                continue;
            }
            match provider.fetch_hourly(latitude, longitude).await {
                Ok(samples) => {
                    tracing::debug!(
                        provider = provider.name(),
                        samples = samples.len(),
                        "hourly forecast fetched"
                    );
                    return Ok(samples);
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "provider failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            AppError::ProviderUnavailable("no weather provider is configured".to_string())
        }))
    }

    async fn current_from_chain(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<WeatherSample> {
        let mut last_err: Option<AppError> = None;

        for provider in &self.providers {
            if !provider.configured() {
                tracing::debug!(provider = provider.name(), "skipping unconfigured provider");
                continue;
            }
            match provider.fetch_current(latitude, longitude).await {
                Ok(sample) => return Ok(sample),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "provider failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            AppError::ProviderUnavailable("no weather provider is configured".to_string())
        }))
    }
}

/// Group an hourly sequence into timezone-aware daily summaries
///
/// The applicable timezone is taken from the first sample that carries one,
/// else the supplied fallback, else UTC. Bucketing uses the local calendar
/// date so samples near midnight land on the correct day. Pure and
/// idempotent: the same input always produces identical output.
pub fn group_by_day(samples: &[WeatherSample], fallback: Option<Tz>) -> Vec<DailySummary> {
    let tz = samples
        .iter()
        .find_map(|s| s.timezone.as_deref())
        .and_then(|name| name.parse::<Tz>().ok())
        .or(fallback)
        .unwrap_or(chrono_tz::UTC);

    let mut buckets: BTreeMap<NaiveDate, Vec<WeatherSample>> = BTreeMap::new();
    for sample in samples {
        let local_date = sample.timestamp.with_timezone(&tz).date_naive();
        buckets.entry(local_date).or_default().push(sample.clone());
    }

    buckets
        .into_iter()
        .map(|(date, mut day)| {
            day.sort_by_key(|s| s.timestamp);
            summarize_day(date, day, tz)
        })
        .collect()
}

fn summarize_day(date: NaiveDate, samples: Vec<WeatherSample>, tz: Tz) -> DailySummary {
    let len = Decimal::from(samples.len().max(1));

    let high_f = samples
        .iter()
        .map(|s| s.temperature_f)
        .max()
        .unwrap_or_default();
    let low_f = samples
        .iter()
        .map(|s| s.temperature_f)
        .min()
        .unwrap_or_default();
    let avg_temp_f = samples.iter().map(|s| s.temperature_f).sum::<Decimal>() / len;
    let max_wind_mph = samples
        .iter()
        .map(|s| s.wind_speed_mph)
        .max()
        .unwrap_or_default();

    let humidity_sum: i64 = samples.iter().map(|s| i64::from(s.humidity_percent)).sum();
    let avg_humidity_percent = (humidity_sum as f64 / samples.len().max(1) as f64).round() as i32;

    let max_pop = samples.iter().map(|s| s.pop).max().unwrap_or_default();
    let precip_probability = (max_pop * Decimal::from(100))
        .round()
        .to_i32()
        .unwrap_or(0);

    DailySummary {
        date,
        high_f,
        low_f,
        avg_temp_f,
        max_wind_mph,
        avg_humidity_percent,
        precip_probability,
        conditions: dominant_condition(&samples),
        icon: representative_icon(&samples, tz),
        samples,
    }
}

/// Most frequent condition description; ties keep the earliest seen
fn dominant_condition(samples: &[WeatherSample]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for sample in samples {
        match counts.iter_mut().find(|(c, _)| *c == sample.conditions) {
            Some((_, n)) => *n += 1,
            None => counts.push((&sample.conditions, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (condition, count) in counts {
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((condition, count));
        }
    }
    best.map(|(c, _)| c.to_string()).unwrap_or_default()
}

/// Icon of the sample closest to local midday within [10, 14], else the
/// day's first sample
fn representative_icon(samples: &[WeatherSample], tz: Tz) -> String {
    samples
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            let hour = s.timestamp.with_timezone(&tz).hour();
            (10..=14).contains(&hour)
        })
        .min_by_key(|(i, s)| {
            let hour = s.timestamp.with_timezone(&tz).hour() as i32;
            ((hour - 12).abs(), *i)
        })
        .map(|(_, s)| s.icon.clone())
        .or_else(|| samples.first().map(|s| s.icon.clone()))
        .unwrap_or_default()
}

/// Evaluate stateless forecast alerts against the configured thresholds
pub fn evaluate_alerts(
    days: &[DailySummary],
    policy: &SchedulingConfig,
) -> Vec<WeatherAlertNotice> {
    let mut alerts = Vec::new();

    for day in days {
        if day.low_f <= policy.frost_warning_f {
            alerts.push(WeatherAlertNotice {
                date: day.date,
                kind: WeatherAlertKind::FrostWarning,
                message: format!("Frost risk: low of {}°F on {}", day.low_f, day.date),
            });
        }
        if day.high_f >= policy.heat_warning_f {
            alerts.push(WeatherAlertNotice {
                date: day.date,
                kind: WeatherAlertKind::HeatWarning,
                message: format!("Heat stress: high of {}°F on {}", day.high_f, day.date),
            });
        }
        if day.max_wind_mph >= policy.wind_warning_mph {
            alerts.push(WeatherAlertNotice {
                date: day.date,
                kind: WeatherAlertKind::WindWarning,
                message: format!(
                    "Strong wind: gusts to {} mph on {}",
                    day.max_wind_mph, day.date
                ),
            });
        }
        if day.precip_probability >= policy.precip_hold_percent {
            alerts.push(WeatherAlertNotice {
                date: day.date,
                kind: WeatherAlertKind::RainForecast,
                message: format!(
                    "Precipitation likely: {}% chance on {}",
                    day.precip_probability, day.date
                ),
            });
        }
    }

    alerts
}
