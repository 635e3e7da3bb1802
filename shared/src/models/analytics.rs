//! Derived analytics records
//!
//! All of these are computed from caller-supplied history on each query and
//! never mutated in place.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::HoldReason;

/// One day of the historical work log, supplied wholesale by an external
/// store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkLogEntry {
    pub date: NaiveDate,
    pub crew_size: u32,
    pub total_labor_hours: Decimal,
    pub sqft_completed: Decimal,
    /// Category label -> hours. Labels repeat across entries; values are
    /// additive when reduced.
    #[serde(default)]
    pub categories: HashMap<String, Decimal>,
}

/// Direction of the recent production trend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Single best production day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestDay {
    pub date: NaiveDate,
    pub sqft: Decimal,
}

/// Production output metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionMetrics {
    pub total_sqft: Decimal,
    pub rolling_7day_avg: Decimal,
    pub rolling_30day_avg: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_day: Option<BestDay>,
    pub trend: TrendDirection,
    /// Labor hours summed per category label across the whole log
    pub hours_by_category: HashMap<String, Decimal>,
}

/// Qualitative crew efficiency band against the production target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// Crew efficiency metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewEfficiency {
    pub sqft_per_crew_day: Decimal,
    pub sqft_per_hour: Decimal,
    /// Output as a percentage of the configured sqft/crew/day target
    pub percent_of_target: i32,
    pub rating: EfficiencyRating,
}

/// HOLD days bucketed by calendar month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyHolds {
    /// "YYYY-MM"
    pub month: String,
    pub hold_days: u32,
    pub total_days: u32,
}

/// Weather-caused delay metrics over a classified history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherImpactMetrics {
    pub total_hold_days: u32,
    /// HOLD days as a percentage of total work days
    pub hold_percentage: Decimal,
    /// hold days x daily standby rate
    pub estimated_cost: Decimal,
    /// Longest run of HOLD days on consecutive calendar dates
    pub longest_hold_streak: u32,
    pub holds_by_reason: HashMap<HoldReason, u32>,
    pub monthly: Vec<MonthlyHolds>,
}
