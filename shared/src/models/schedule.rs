//! Work-package and scheduling verdict models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Environmental constraints for a work package
///
/// Absent bounds are unconstrained. `rising_required` compares each hour
/// against the previous one; `no_precip` gates on precipitation probability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_temp_f: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temp_f: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wind_mph: Option<Decimal>,
    #[serde(default)]
    pub rising_required: bool,
    #[serde(default)]
    pub no_precip: bool,
}

/// A material/system-specific unit of work with its own environmental
/// tolerance and scheduling requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPackage {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Continuous hours the work needs once started
    pub required_hours: u32,
    /// Preparation hours before a window's start (material staging, crew
    /// mobilization)
    pub lead_time_hours: u32,
    pub constraints: ConstraintSet,
}

/// A maximal contiguous span of forecast hours during which a package's
/// constraints hold continuously
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkWindow {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub duration_hours: u32,
    pub avg_temp_f: Decimal,
    /// Forecast reliability for this window, 0-100
    pub confidence: i32,
}

/// Tri-state verdict for performing a work package on a given day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Suitability {
    Go,
    Caution,
    Hold,
}

/// Dominant cause of a HOLD verdict
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HoldReason {
    Temperature,
    Wind,
    Precipitation,
}

/// Per-day, per-package suitability verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySuitability {
    pub date: NaiveDate,
    pub package_id: String,
    pub status: Suitability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_reason: Option<HoldReason>,
}
