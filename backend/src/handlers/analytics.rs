//! HTTP handlers for analytics endpoints
//!
//! Historical work logs and classified days arrive in the request body;
//! the engine keeps no store of its own.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::analytics::AnalyticsService;
use crate::AppState;
use shared::models::{CrewEfficiency, DaySuitability, ProductionMetrics, WorkLogEntry};
use shared::types::DateRange;
use shared::validation::validate_log_entry;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

/// Request body carrying the work-log history
#[derive(Debug, Deserialize)]
pub struct WorkLogRequest {
    pub entries: Vec<WorkLogEntry>,
    /// Restrict the reduction to an inclusive date range
    pub range: Option<DateRange>,
}

impl WorkLogRequest {
    fn entries_in_range(&self) -> Vec<WorkLogEntry> {
        filter_by_range(&self.entries, self.range.as_ref(), |e| e.date)
    }
}

/// Request body carrying classified suitability history
#[derive(Debug, Deserialize)]
pub struct WeatherImpactRequest {
    pub days: Vec<DaySuitability>,
    pub range: Option<DateRange>,
    pub standby_rate_per_day: Option<Decimal>,
}

fn filter_by_range<T: Clone>(
    items: &[T],
    range: Option<&DateRange>,
    date_of: impl Fn(&T) -> chrono::NaiveDate,
) -> Vec<T> {
    match range {
        Some(range) => items
            .iter()
            .filter(|item| {
                let date = date_of(item);
                date >= range.start && date <= range.end
            })
            .cloned()
            .collect(),
        None => items.to_vec(),
    }
}

fn validate_entries(entries: &[WorkLogEntry]) -> AppResult<()> {
    for entry in entries {
        validate_log_entry(entry).map_err(|msg| AppError::Validation {
            field: "entries".to_string(),
            message: format!("{} ({})", msg, entry.date),
        })?;
    }
    Ok(())
}

/// Compute production metrics from the supplied work log
pub async fn get_production_metrics(
    State(state): State<AppState>,
    Json(request): Json<WorkLogRequest>,
) -> AppResult<Json<ProductionMetrics>> {
    validate_entries(&request.entries)?;
    let entries = request.entries_in_range();
    Ok(Json(state.analytics.production_metrics(&entries)))
}

/// Compute crew efficiency from the supplied work log
pub async fn get_crew_efficiency(
    State(state): State<AppState>,
    Json(request): Json<WorkLogRequest>,
) -> AppResult<Json<CrewEfficiency>> {
    validate_entries(&request.entries)?;
    let entries = request.entries_in_range();
    Ok(Json(state.analytics.crew_efficiency(&entries)))
}

/// Compute weather-impact metrics from classified suitability history
///
/// `?format=csv` returns the monthly hold breakdown as CSV.
pub async fn get_weather_impact(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
    Json(request): Json<WeatherImpactRequest>,
) -> AppResult<impl IntoResponse> {
    let days = filter_by_range(&request.days, request.range.as_ref(), |d| d.date);
    let metrics = state
        .analytics
        .weather_impact(&days, request.standby_rate_per_day);

    if query.format.as_deref() == Some("csv") {
        let csv = AnalyticsService::export_to_csv(&metrics.monthly)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"weather_impact_monthly.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(metrics).into_response())
    }
}
