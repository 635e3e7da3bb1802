//! Scheduling engine: work-package catalog, window finder, day classifier
//!
//! All methods are pure functions of their inputs plus the immutable policy
//! captured at startup; the service is a read-only handle safe to share
//! across tasks without synchronization.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::SchedulingConfig;
use shared::models::{
    ConstraintSet, DailySummary, DaySuitability, HoldReason, Suitability, WeatherSample,
    WorkPackage, WorkWindow,
};

/// Scheduling engine over the static work-package catalog
#[derive(Clone)]
pub struct ScheduleService {
    policy: SchedulingConfig,
    packages: Vec<WorkPackage>,
}

impl ScheduleService {
    /// Create a new ScheduleService with the built-in catalog
    pub fn new(policy: SchedulingConfig) -> Self {
        Self {
            policy,
            packages: default_catalog(),
        }
    }

    /// Create a new ScheduleService with a custom catalog (for testing)
    pub fn with_catalog(policy: SchedulingConfig, packages: Vec<WorkPackage>) -> Self {
        Self { policy, packages }
    }

    /// The work-package catalog, in display order
    pub fn packages(&self) -> &[WorkPackage] {
        &self.packages
    }

    /// Look up a package by id
    pub fn package(&self, id: &str) -> Option<&WorkPackage> {
        self.packages.iter().find(|p| p.id == id)
    }

    /// Whether one hourly sample satisfies a constraint set
    ///
    /// `prev` is the previous sample in the sequence; the rising check
    /// passes vacuously at the head of a series.
    pub fn satisfies(
        &self,
        sample: &WeatherSample,
        prev: Option<&WeatherSample>,
        constraints: &ConstraintSet,
    ) -> bool {
        let precip_threshold =
            Decimal::from(self.policy.precip_window_percent) / Decimal::from(100);

        constraints
            .min_temp_f
            .map_or(true, |min| sample.temperature_f >= min)
            && constraints
                .max_temp_f
                .map_or(true, |max| sample.temperature_f <= max)
            && (!constraints.rising_required
                || prev.map_or(true, |p| sample.temperature_f >= p.temperature_f))
            && constraints
                .max_wind_mph
                .map_or(true, |max| sample.wind_speed_mph <= max)
            && (!constraints.no_precip || sample.pop < precip_threshold)
    }

    /// Scan an hourly series for ranked work windows
    ///
    /// Accumulates maximal contiguous runs of satisfying samples; a run
    /// qualifies only when it covers the package's required hours. Returned
    /// windows are in ascending chronological order, capped to the
    /// configured count (soonest first). An empty result is a valid
    /// outcome, not an error: it means "no viable window, use the hold
    /// plan".
    pub fn find_windows(
        &self,
        samples: &[WeatherSample],
        package: &WorkPackage,
        now: DateTime<Utc>,
    ) -> Vec<WorkWindow> {
        let mut windows = Vec::new();
        let mut run: Vec<&WeatherSample> = Vec::new();
        let mut prev: Option<&WeatherSample> = None;

        for sample in samples {
            if self.satisfies(sample, prev, &package.constraints) {
                run.push(sample);
            } else {
                if let Some(window) = self.close_run(&run, package, now) {
                    windows.push(window);
                }
                run.clear();
            }
            prev = Some(sample);
        }
        if let Some(window) = self.close_run(&run, package, now) {
            windows.push(window);
        }

        windows.truncate(self.policy.max_windows);
        windows
    }

    /// Turn a finished run into a window if it covers the required hours
    ///
    /// Hours inside the package's lead time are not actionable (prep has to
    /// happen first), so the run is trimmed to its reachable portion before
    /// the duration check.
    fn close_run(
        &self,
        run: &[&WeatherSample],
        package: &WorkPackage,
        now: DateTime<Utc>,
    ) -> Option<WorkWindow> {
        let earliest_start = now + chrono::Duration::hours(i64::from(package.lead_time_hours));
        let start_idx = run.iter().position(|s| s.timestamp >= earliest_start)?;
        let run = &run[start_idx..];

        let first = run.first()?;
        let last = run.last()?;

        // Each sample covers its hour, so a run spans last - first + 1h
        let duration_hours = ((last.timestamp - first.timestamp).num_hours() + 1).max(0) as u32;
        if duration_hours < package.required_hours {
            return None;
        }

        let avg_temp_f = run.iter().map(|s| s.temperature_f).sum::<Decimal>()
            / Decimal::from(run.len().max(1));

        Some(WorkWindow {
            starts_at: first.timestamp,
            ends_at: last.timestamp + chrono::Duration::hours(1),
            duration_hours,
            avg_temp_f,
            confidence: self.confidence(run, package, now),
        })
    }

    /// Confidence score for a run, 0-100
    ///
    /// Starts from a full score and subtracts penalties as the run's
    /// averages sit close to the package's bounds, then a horizon penalty
    /// as the window start moves further from `now` (forecast uncertainty
    /// grows with lead distance).
    fn confidence(
        &self,
        run: &[&WeatherSample],
        package: &WorkPackage,
        now: DateTime<Utc>,
    ) -> i32 {
        let constraints = &package.constraints;
        let len = Decimal::from(run.len().max(1));
        let avg_temp = run.iter().map(|s| s.temperature_f).sum::<Decimal>() / len;
        let avg_wind = run.iter().map(|s| s.wind_speed_mph).sum::<Decimal>() / len;
        let avg_pop = run.iter().map(|s| s.pop).sum::<Decimal>() / len;

        let mut score: i32 = 100;

        if let Some(min) = constraints.min_temp_f {
            let margin = avg_temp - min;
            if margin < self.policy.temp_caution_margin_f {
                score -= 25;
            } else if margin < self.policy.temp_caution_margin_f * Decimal::from(2) {
                score -= 10;
            }
        }
        if let Some(max) = constraints.max_temp_f {
            let margin = max - avg_temp;
            if margin < self.policy.temp_caution_margin_f {
                score -= 25;
            } else if margin < self.policy.temp_caution_margin_f * Decimal::from(2) {
                score -= 10;
            }
        }
        if let Some(max) = constraints.max_wind_mph {
            let margin = max - avg_wind;
            if margin < self.policy.wind_caution_margin_mph {
                score -= 15;
            } else if margin < self.policy.wind_caution_margin_mph * Decimal::from(2) {
                score -= 5;
            }
        }
        if constraints.no_precip {
            let pop_percent = (avg_pop * Decimal::from(100)).to_i32().unwrap_or(0);
            if pop_percent >= self.policy.precip_caution_percent {
                score -= 10;
            }
        }

        if let Some(first) = run.first() {
            let hours_out = (first.timestamp - now).num_hours().max(0);
            let divisor = i64::from(self.policy.confidence_horizon_divisor.max(1));
            score -= (hours_out / divisor).min(40) as i32;
        }

        score.clamp(0, 100)
    }

    /// Classify one day's suitability for a package
    ///
    /// Pure and stateless; precedence HOLD > CAUTION > GO. The hold reason
    /// records the dominant cause in temperature, wind, precipitation
    /// order.
    pub fn classify_day(&self, summary: &DailySummary, package: &WorkPackage) -> DaySuitability {
        let constraints = &package.constraints;
        let mut status = Suitability::Go;
        let mut hold_reason = None;

        let escalate = |status: &mut Suitability,
                        hold_reason: &mut Option<HoldReason>,
                        verdict: Suitability,
                        reason: HoldReason| {
            if verdict == Suitability::Hold && *status != Suitability::Hold {
                *status = Suitability::Hold;
                *hold_reason = Some(reason);
            } else if verdict == Suitability::Caution && *status == Suitability::Go {
                *status = Suitability::Caution;
            }
        };

        if let Some(min) = constraints.min_temp_f {
            if summary.avg_temp_f < min {
                escalate(&mut status, &mut hold_reason, Suitability::Hold, HoldReason::Temperature);
            } else if summary.low_f < min
                || summary.avg_temp_f - min < self.policy.temp_caution_margin_f
            {
                escalate(
                    &mut status,
                    &mut hold_reason,
                    Suitability::Caution,
                    HoldReason::Temperature,
                );
            }
        }
        if let Some(max) = constraints.max_temp_f {
            if summary.avg_temp_f > max {
                escalate(&mut status, &mut hold_reason, Suitability::Hold, HoldReason::Temperature);
            } else if summary.high_f > max
                || max - summary.avg_temp_f < self.policy.temp_caution_margin_f
            {
                escalate(
                    &mut status,
                    &mut hold_reason,
                    Suitability::Caution,
                    HoldReason::Temperature,
                );
            }
        }
        if constraints.rising_required && day_trend_falling(summary) {
            escalate(&mut status, &mut hold_reason, Suitability::Hold, HoldReason::Temperature);
        }

        if let Some(max) = constraints.max_wind_mph {
            if summary.max_wind_mph > max {
                escalate(&mut status, &mut hold_reason, Suitability::Hold, HoldReason::Wind);
            } else if max - summary.max_wind_mph < self.policy.wind_caution_margin_mph {
                escalate(&mut status, &mut hold_reason, Suitability::Caution, HoldReason::Wind);
            }
        }

        if constraints.no_precip {
            if summary.precip_probability >= self.policy.precip_hold_percent {
                escalate(
                    &mut status,
                    &mut hold_reason,
                    Suitability::Hold,
                    HoldReason::Precipitation,
                );
            } else if summary.precip_probability >= self.policy.precip_caution_percent {
                escalate(
                    &mut status,
                    &mut hold_reason,
                    Suitability::Caution,
                    HoldReason::Precipitation,
                );
            }
        }

        DaySuitability {
            date: summary.date,
            package_id: package.id.clone(),
            status,
            hold_reason,
        }
    }
}

/// Whether the day's temperature trend is falling, first sample to last
fn day_trend_falling(summary: &DailySummary) -> bool {
    match (summary.samples.first(), summary.samples.last()) {
        (Some(first), Some(last)) => last.temperature_f < first.temperature_f,
        _ => false,
    }
}

/// The built-in work-package catalog
///
/// Constraint values follow common trade practice (cold-weather masonry at
/// 40°F and rising, coatings inside their cure range, membranes dry and
/// calm); deployments with different specs swap the catalog, not the
/// engine.
pub fn default_catalog() -> Vec<WorkPackage> {
    vec![
        WorkPackage {
            id: "masonry".to_string(),
            name: "Masonry - Brick & Block".to_string(),
            description: "Mortar placement; temperature must hold above 40°F and be rising"
                .to_string(),
            required_hours: 4,
            lead_time_hours: 24,
            constraints: ConstraintSet {
                min_temp_f: Some(Decimal::from(40)),
                max_temp_f: None,
                max_wind_mph: Some(Decimal::from(25)),
                rising_required: true,
                no_precip: true,
            },
        },
        WorkPackage {
            id: "concrete-flatwork".to_string(),
            name: "Concrete Flatwork".to_string(),
            description: "Pour and finish; needs a dry day inside the cure range".to_string(),
            required_hours: 6,
            lead_time_hours: 12,
            constraints: ConstraintSet {
                min_temp_f: Some(Decimal::from(40)),
                max_temp_f: Some(Decimal::from(90)),
                max_wind_mph: None,
                rising_required: false,
                no_precip: true,
            },
        },
        WorkPackage {
            id: "exterior-framing".to_string(),
            name: "Exterior Framing".to_string(),
            description: "Structural framing and sheathing; crane limits govern wind".to_string(),
            required_hours: 8,
            lead_time_hours: 8,
            constraints: ConstraintSet {
                min_temp_f: None,
                max_temp_f: None,
                max_wind_mph: Some(Decimal::from(30)),
                rising_required: false,
                no_precip: false,
            },
        },
        WorkPackage {
            id: "roofing-membrane".to_string(),
            name: "Roofing Membrane".to_string(),
            description: "Single-ply membrane; adhesive needs warmth, dry deck, light wind"
                .to_string(),
            required_hours: 6,
            lead_time_hours: 24,
            constraints: ConstraintSet {
                min_temp_f: Some(Decimal::from(45)),
                max_temp_f: None,
                max_wind_mph: Some(Decimal::from(20)),
                rising_required: false,
                no_precip: true,
            },
        },
        WorkPackage {
            id: "exterior-coatings".to_string(),
            name: "Exterior Painting & Coatings".to_string(),
            description: "Paint and sealant application within manufacturer temperature range"
                .to_string(),
            required_hours: 4,
            lead_time_hours: 4,
            constraints: ConstraintSet {
                min_temp_f: Some(Decimal::from(50)),
                max_temp_f: Some(Decimal::from(90)),
                max_wind_mph: Some(Decimal::from(15)),
                rising_required: false,
                no_precip: true,
            },
        },
        WorkPackage {
            id: "earthwork".to_string(),
            name: "Excavation & Earthwork".to_string(),
            description: "Grading and trenching; rain shuts it down, temperature does not"
                .to_string(),
            required_hours: 8,
            lead_time_hours: 8,
            constraints: ConstraintSet {
                min_temp_f: None,
                max_temp_f: None,
                max_wind_mph: None,
                rising_required: false,
                no_precip: true,
            },
        },
    ]
}
