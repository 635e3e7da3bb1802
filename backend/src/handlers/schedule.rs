//! HTTP handlers for scheduling endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::weather::LocationQuery;
use crate::AppState;
use shared::models::{DaySuitability, WorkPackage, WorkWindow};

/// List the work-package catalog
pub async fn list_packages(State(state): State<AppState>) -> Json<Vec<WorkPackage>> {
    Json(state.schedule.packages().to_vec())
}

/// Get ranked work windows for a package
///
/// An empty list is a meaningful answer: no viable window exists in the
/// forecast horizon and the hold plan applies.
pub async fn get_work_windows(
    State(state): State<AppState>,
    Path(package_id): Path<String>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<WorkWindow>>> {
    let package = state
        .schedule
        .package(&package_id)
        .ok_or_else(|| AppError::NotFound(format!("Work package '{}'", package_id)))?
        .clone();

    let site = query.resolve(&state)?;
    let samples = state.weather.hourly(site.latitude, site.longitude).await?;
    let windows = state.schedule.find_windows(&samples, &package, Utc::now());

    Ok(Json(windows))
}

/// Query parameters for day suitability
#[derive(Debug, Deserialize)]
pub struct SuitabilityQuery {
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    /// Restrict to one package; all packages when omitted
    pub package_id: Option<String>,
}

/// Classify each forecast day for each work package
pub async fn get_day_suitability(
    State(state): State<AppState>,
    Query(query): Query<SuitabilityQuery>,
) -> AppResult<Json<Vec<DaySuitability>>> {
    let location = LocationQuery {
        latitude: query.latitude,
        longitude: query.longitude,
    };
    let site = location.resolve(&state)?;

    let packages: Vec<WorkPackage> = match &query.package_id {
        Some(id) => vec![state
            .schedule
            .package(id)
            .ok_or_else(|| AppError::NotFound(format!("Work package '{}'", id)))?
            .clone()],
        None => state.schedule.packages().to_vec(),
    };

    let summaries = state.weather.daily(site.latitude, site.longitude).await?;

    let mut verdicts = Vec::with_capacity(summaries.len() * packages.len());
    for summary in &summaries {
        for package in &packages {
            verdicts.push(state.schedule.classify_day(summary, package));
        }
    }

    Ok(Json(verdicts))
}
