//! Analytics service: production, crew efficiency, and weather impact
//!
//! Pure reducers over caller-supplied history. The engine owns no store;
//! every metric is recomputed from the inputs on each call.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::SchedulingConfig;
use crate::error::{AppError, AppResult};
use shared::models::{
    BestDay, CrewEfficiency, DaySuitability, EfficiencyRating, HoldReason, MonthlyHolds,
    ProductionMetrics, Suitability, TrendDirection, WeatherImpactMetrics, WorkLogEntry,
};

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    policy: SchedulingConfig,
}

impl AnalyticsService {
    /// Create a new AnalyticsService
    pub fn new(policy: SchedulingConfig) -> Self {
        Self { policy }
    }

    /// Production metrics over a dated series of completed-work entries
    ///
    /// Rolling averages are per calendar day over the window ending at the
    /// latest logged date; days without an entry count as zero output.
    pub fn production_metrics(&self, entries: &[WorkLogEntry]) -> ProductionMetrics {
        let mut entries: Vec<&WorkLogEntry> = entries.iter().collect();
        entries.sort_by_key(|e| e.date);

        let total_sqft: Decimal = entries.iter().map(|e| e.sqft_completed).sum();

        // Category labels repeat across entries; hours are additive
        let mut hours_by_category: HashMap<String, Decimal> = HashMap::new();
        for entry in &entries {
            for (label, hours) in &entry.categories {
                *hours_by_category
                    .entry(label.clone())
                    .or_insert(Decimal::ZERO) += *hours;
            }
        }

        let Some(latest) = entries.last().map(|e| e.date) else {
            return ProductionMetrics {
                total_sqft,
                rolling_7day_avg: Decimal::ZERO,
                rolling_30day_avg: Decimal::ZERO,
                best_day: None,
                trend: TrendDirection::Stable,
                hours_by_category,
            };
        };

        let window_avg = |days: i64, end: NaiveDate| -> Decimal {
            let start = end - Duration::days(days - 1);
            let sum: Decimal = entries
                .iter()
                .filter(|e| e.date >= start && e.date <= end)
                .map(|e| e.sqft_completed)
                .sum();
            sum / Decimal::from(days)
        };

        let rolling_7day_avg = window_avg(7, latest);
        let rolling_30day_avg = window_avg(30, latest);

        let best_day = entries
            .iter()
            .max_by_key(|e| e.sqft_completed)
            .map(|e| BestDay {
                date: e.date,
                sqft: e.sqft_completed,
            });

        // Compare the latest 7 days against the 7 before them
        let recent = rolling_7day_avg;
        let prior = window_avg(7, latest - Duration::days(7));
        let trend = if prior.is_zero() {
            if recent > Decimal::ZERO {
                TrendDirection::Increasing
            } else {
                TrendDirection::Stable
            }
        } else {
            let change_percent = (recent - prior) / prior * Decimal::from(100);
            if change_percent > self.policy.trend_threshold_percent {
                TrendDirection::Increasing
            } else if change_percent < -self.policy.trend_threshold_percent {
                TrendDirection::Decreasing
            } else {
                TrendDirection::Stable
            }
        };

        ProductionMetrics {
            total_sqft,
            rolling_7day_avg,
            rolling_30day_avg,
            best_day,
            trend,
            hours_by_category,
        }
    }

    /// Crew efficiency against the configured production target
    pub fn crew_efficiency(&self, entries: &[WorkLogEntry]) -> CrewEfficiency {
        if entries.is_empty() {
            return CrewEfficiency {
                sqft_per_crew_day: Decimal::ZERO,
                sqft_per_hour: Decimal::ZERO,
                percent_of_target: 0,
                rating: EfficiencyRating::Poor,
            };
        }

        let per_crew_sum: Decimal = entries
            .iter()
            .map(|e| e.sqft_completed / Decimal::from(e.crew_size.max(1)))
            .sum();
        let sqft_per_crew_day = per_crew_sum / Decimal::from(entries.len());

        let total_sqft: Decimal = entries.iter().map(|e| e.sqft_completed).sum();
        let total_hours: Decimal = entries.iter().map(|e| e.total_labor_hours).sum();
        let sqft_per_hour = if total_hours.is_zero() {
            Decimal::ZERO
        } else {
            total_sqft / total_hours
        };

        let percent_of_target = if self.policy.production_target_sqft.is_zero() {
            0
        } else {
            (sqft_per_crew_day / self.policy.production_target_sqft * Decimal::from(100))
                .round()
                .to_i32()
                .unwrap_or(0)
        };

        CrewEfficiency {
            sqft_per_crew_day,
            sqft_per_hour,
            percent_of_target,
            rating: rate_efficiency(percent_of_target),
        }
    }

    /// Weather-impact metrics over a classified suitability history
    ///
    /// `standby_rate` overrides the configured per-day standby cost when
    /// supplied.
    pub fn weather_impact(
        &self,
        days: &[DaySuitability],
        standby_rate: Option<Decimal>,
    ) -> WeatherImpactMetrics {
        let rate = standby_rate.unwrap_or(self.policy.standby_rate_per_day);

        let mut days: Vec<&DaySuitability> = days.iter().collect();
        days.sort_by_key(|d| d.date);

        let total_days = days.len() as u32;
        let total_hold_days = days
            .iter()
            .filter(|d| d.status == Suitability::Hold)
            .count() as u32;

        let hold_percentage = if total_days == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(total_hold_days * 100) / Decimal::from(total_days)
        };

        let mut holds_by_reason: HashMap<HoldReason, u32> = HashMap::new();
        let mut monthly: BTreeMap<String, (u32, u32)> = BTreeMap::new();
        let mut longest_streak: u32 = 0;
        let mut streak: u32 = 0;
        let mut prev_hold_date: Option<NaiveDate> = None;

        for day in &days {
            let bucket = monthly
                .entry(day.date.format("%Y-%m").to_string())
                .or_insert((0, 0));
            bucket.1 += 1;

            if day.status == Suitability::Hold {
                bucket.0 += 1;

                if let Some(reason) = day.hold_reason {
                    *holds_by_reason.entry(reason).or_insert(0) += 1;
                }

                // A gap in the calendar breaks the streak
                streak = match prev_hold_date {
                    Some(prev) if day.date - prev == Duration::days(1) => streak + 1,
                    _ => 1,
                };
                longest_streak = longest_streak.max(streak);
                prev_hold_date = Some(day.date);
            }
        }

        WeatherImpactMetrics {
            total_hold_days,
            hold_percentage,
            estimated_cost: Decimal::from(total_hold_days) * rate,
            longest_hold_streak: longest_streak,
            holds_by_reason,
            monthly: monthly
                .into_iter()
                .map(|(month, (hold_days, total))| MonthlyHolds {
                    month,
                    hold_days,
                    total_days: total,
                })
                .collect(),
        }
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

/// Band a percent-of-target value into a qualitative rating
///
/// Declared policy: 115% and up is excellent, making target is good, 85% is
/// fair, anything less is poor.
pub fn rate_efficiency(percent_of_target: i32) -> EfficiencyRating {
    if percent_of_target >= 115 {
        EfficiencyRating::Excellent
    } else if percent_of_target >= 100 {
        EfficiencyRating::Good
    } else if percent_of_target >= 85 {
        EfficiencyRating::Fair
    } else {
        EfficiencyRating::Poor
    }
}
