//! Scheduling engine tests
//!
//! Window-finder invariants, the reference scenarios for the constraint
//! predicate, and the GO/CAUTION/HOLD classifier precedence.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use sitecast_backend::config::SchedulingConfig;
use sitecast_backend::services::weather::group_by_day;
use sitecast_backend::services::ScheduleService;
use shared::models::{
    ConstraintSet, HoldReason, Suitability, WeatherSample, WorkPackage,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn policy() -> SchedulingConfig {
    SchedulingConfig {
        temp_caution_margin_f: dec("5"),
        wind_caution_margin_mph: dec("5"),
        precip_window_percent: 30,
        precip_caution_percent: 30,
        precip_hold_percent: 60,
        max_windows: 2,
        confidence_horizon_divisor: 4,
        standby_rate_per_day: dec("2400"),
        production_target_sqft: dec("200"),
        trend_threshold_percent: dec("10"),
        frost_warning_f: dec("32"),
        heat_warning_f: dec("95"),
        wind_warning_mph: dec("30"),
    }
}

fn service() -> ScheduleService {
    ScheduleService::new(policy())
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
}

fn sample(hour_offset: i64, temp: &str) -> WeatherSample {
    WeatherSample {
        timestamp: base_time() + Duration::hours(hour_offset),
        temperature_f: dec(temp),
        feels_like_f: dec(temp),
        humidity_percent: 50,
        wind_speed_mph: dec("5"),
        wind_direction_deg: 270,
        conditions: "Sunny".to_string(),
        icon: "day/skc".to_string(),
        pop: dec("0.05"),
        timezone: None,
        sunrise: None,
        sunset: None,
    }
}

fn package(constraints: ConstraintSet, required_hours: u32) -> WorkPackage {
    WorkPackage {
        id: "test-package".to_string(),
        name: "Test Package".to_string(),
        description: String::new(),
        required_hours,
        lead_time_hours: 0,
        constraints,
    }
}

fn min_temp_package(min: &str, required_hours: u32) -> WorkPackage {
    package(
        ConstraintSet {
            min_temp_f: Some(dec(min)),
            ..Default::default()
        },
        required_hours,
    )
}

// ============================================================================
// Window Finder Tests
// ============================================================================

mod window_tests {
    use super::*;

    /// Five hours at 35F against a 40F floor: no window, and that is a
    /// valid empty result rather than an error
    #[test]
    fn test_all_cold_yields_no_window() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        let samples: Vec<WeatherSample> = (0..5).map(|h| sample(h, "35")).collect();

        let windows = svc.find_windows(&samples, &pkg, base_time());
        assert!(windows.is_empty());
    }

    /// The reference run: one five-hour window over indices 1-5
    #[test]
    fn test_single_window_over_contiguous_run() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        let temps = ["38", "41", "42", "43", "44", "45", "39", "38"];
        let samples: Vec<WeatherSample> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| sample(i as i64, t))
            .collect();

        let windows = svc.find_windows(&samples, &pkg, base_time());
        assert_eq!(windows.len(), 1);

        let window = &windows[0];
        assert_eq!(window.duration_hours, 5);
        assert_eq!(window.starts_at, samples[1].timestamp);
        assert_eq!(window.ends_at, samples[5].timestamp + Duration::hours(1));
        assert_eq!(window.avg_temp_f, dec("43"));
    }

    /// A run shorter than the required hours is discarded
    #[test]
    fn test_short_run_discarded() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        let temps = ["38", "41", "42", "43", "38", "38"];
        let samples: Vec<WeatherSample> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| sample(i as i64, t))
            .collect();

        assert!(svc.find_windows(&samples, &pkg, base_time()).is_empty());
    }

    /// Rising-required packages reject an hour that cools off
    #[test]
    fn test_rising_requirement_breaks_run() {
        let svc = service();
        let pkg = package(
            ConstraintSet {
                min_temp_f: Some(dec("40")),
                rising_required: true,
                ..Default::default()
            },
            3,
        );
        // 48 drops to 45 mid-series, splitting the run
        let temps = ["44", "46", "48", "45", "46", "47"];
        let samples: Vec<WeatherSample> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| sample(i as i64, t))
            .collect();

        let windows = svc.find_windows(&samples, &pkg, base_time());
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].starts_at, samples[0].timestamp);
        assert_eq!(windows[0].duration_hours, 3);
    }

    /// Windows never exceed the configured cap and stay chronological
    #[test]
    fn test_windows_capped_and_ordered() {
        let svc = service();
        let pkg = min_temp_package("40", 2);
        // Three qualifying runs separated by cold hours
        let temps = [
            "45", "45", "35", "46", "46", "35", "47", "47",
        ];
        let samples: Vec<WeatherSample> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| sample(i as i64, t))
            .collect();

        let windows = svc.find_windows(&samples, &pkg, base_time());
        assert_eq!(windows.len(), 2);
        assert!(windows[0].starts_at < windows[1].starts_at);
        assert_eq!(windows[0].starts_at, samples[0].timestamp);
    }

    /// Every covered sample satisfies the constraint predicate
    #[test]
    fn test_window_samples_all_satisfy() {
        let svc = service();
        let pkg = package(
            ConstraintSet {
                min_temp_f: Some(dec("40")),
                max_wind_mph: Some(dec("20")),
                no_precip: true,
                ..Default::default()
            },
            2,
        );
        let mut samples: Vec<WeatherSample> = (0..10).map(|h| sample(h, "50")).collect();
        samples[3].wind_speed_mph = dec("25");
        samples[7].pop = dec("0.8");

        for window in svc.find_windows(&samples, &pkg, base_time()) {
            let covered: Vec<&WeatherSample> = samples
                .iter()
                .filter(|s| s.timestamp >= window.starts_at && s.timestamp < window.ends_at)
                .collect();
            assert!(!covered.is_empty());
            for (i, s) in covered.iter().enumerate() {
                let prev = if i == 0 { None } else { Some(covered[i - 1]) };
                assert!(svc.satisfies(s, prev, &pkg.constraints));
            }
        }
    }

    /// Lead time trims a window to the hours a crew can actually reach
    #[test]
    fn test_lead_time_trims_window_start() {
        let svc = service();
        let mut pkg = min_temp_package("40", 4);
        pkg.lead_time_hours = 6;
        let samples: Vec<WeatherSample> = (0..12).map(|h| sample(h, "60")).collect();

        let windows = svc.find_windows(&samples, &pkg, base_time());
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].starts_at, samples[6].timestamp);
        assert_eq!(windows[0].duration_hours, 6);
    }

    /// A viable run entirely inside the lead time is not a window
    #[test]
    fn test_window_inside_lead_time_rejected() {
        let svc = service();
        let mut pkg = min_temp_package("40", 4);
        pkg.lead_time_hours = 24;
        let samples: Vec<WeatherSample> = (0..12).map(|h| sample(h, "60")).collect();

        assert!(svc.find_windows(&samples, &pkg, base_time()).is_empty());
    }

    /// Empty input yields an empty result
    #[test]
    fn test_empty_input_yields_no_windows() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        assert!(svc.find_windows(&[], &pkg, base_time()).is_empty());
    }

    /// Confidence drops as the window sits further out in the forecast
    #[test]
    fn test_confidence_decays_with_horizon() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        let near: Vec<WeatherSample> = (0..6).map(|h| sample(h, "60")).collect();
        let far: Vec<WeatherSample> = (96..102).map(|h| sample(h, "60")).collect();

        let near_window = &svc.find_windows(&near, &pkg, base_time())[0];
        let far_window = &svc.find_windows(&far, &pkg, base_time())[0];
        assert!(near_window.confidence > far_window.confidence);
    }

    /// Thin margins cost confidence
    #[test]
    fn test_confidence_rewards_margin() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        let comfortable: Vec<WeatherSample> = (0..6).map(|h| sample(h, "65")).collect();
        let marginal: Vec<WeatherSample> = (0..6).map(|h| sample(h, "42")).collect();

        let comfortable_window = &svc.find_windows(&comfortable, &pkg, base_time())[0];
        let marginal_window = &svc.find_windows(&marginal, &pkg, base_time())[0];
        assert!(comfortable_window.confidence > marginal_window.confidence);
    }
}

// ============================================================================
// Classifier Tests
// ============================================================================

mod classifier_tests {
    use super::*;

    fn summarize(samples: Vec<WeatherSample>) -> shared::models::DailySummary {
        group_by_day(&samples, None).remove(0)
    }

    /// Five hours at 35F against a 40F floor classifies as HOLD
    #[test]
    fn test_cold_day_is_hold() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        let day = summarize((0..5).map(|h| sample(h, "35")).collect());

        let verdict = svc.classify_day(&day, &pkg);
        assert_eq!(verdict.status, Suitability::Hold);
        assert_eq!(verdict.hold_reason, Some(HoldReason::Temperature));
    }

    /// An average within the caution margin of the floor is CAUTION
    #[test]
    fn test_thin_margin_is_caution() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        let day = summarize((0..5).map(|h| sample(h, "43")).collect());

        let verdict = svc.classify_day(&day, &pkg);
        assert_eq!(verdict.status, Suitability::Caution);
        assert_eq!(verdict.hold_reason, None);
    }

    /// Comfortable margins everywhere classify as GO
    #[test]
    fn test_comfortable_day_is_go() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        let day = summarize((0..5).map(|h| sample(h, "62")).collect());

        assert_eq!(svc.classify_day(&day, &pkg).status, Suitability::Go);
    }

    /// A low dipping under the floor while the average holds is CAUTION
    #[test]
    fn test_low_dip_is_caution() {
        let svc = service();
        let pkg = min_temp_package("40", 4);
        let temps = ["38", "55", "60", "62", "58"];
        let day = summarize(
            temps
                .iter()
                .enumerate()
                .map(|(i, t)| sample(i as i64, t))
                .collect(),
        );

        assert_eq!(svc.classify_day(&day, &pkg).status, Suitability::Caution);
    }

    /// Wind above the bound is HOLD with a wind reason
    #[test]
    fn test_wind_hold() {
        let svc = service();
        let pkg = package(
            ConstraintSet {
                max_wind_mph: Some(dec("20")),
                ..Default::default()
            },
            4,
        );
        let mut samples: Vec<WeatherSample> = (0..5).map(|h| sample(h, "60")).collect();
        samples[2].wind_speed_mph = dec("28");
        let day = summarize(samples);

        let verdict = svc.classify_day(&day, &pkg);
        assert_eq!(verdict.status, Suitability::Hold);
        assert_eq!(verdict.hold_reason, Some(HoldReason::Wind));
    }

    /// Precipitation probability at the hold threshold under no-precip
    #[test]
    fn test_precip_hold_threshold() {
        let svc = service();
        let pkg = package(
            ConstraintSet {
                no_precip: true,
                ..Default::default()
            },
            4,
        );
        let mut samples: Vec<WeatherSample> = (0..5).map(|h| sample(h, "60")).collect();
        samples[1].pop = dec("0.60");
        let day = summarize(samples);

        let verdict = svc.classify_day(&day, &pkg);
        assert_eq!(verdict.status, Suitability::Hold);
        assert_eq!(verdict.hold_reason, Some(HoldReason::Precipitation));

        // Just under the hold threshold drops to CAUTION
        let mut samples: Vec<WeatherSample> = (0..5).map(|h| sample(h, "60")).collect();
        samples[1].pop = dec("0.45");
        let day = summarize(samples);
        assert_eq!(svc.classify_day(&day, &pkg).status, Suitability::Caution);
    }

    /// Falling temperature on a rising-required package is HOLD
    #[test]
    fn test_falling_trend_hold_when_rising_required() {
        let svc = service();
        let pkg = package(
            ConstraintSet {
                min_temp_f: Some(dec("40")),
                rising_required: true,
                ..Default::default()
            },
            4,
        );
        let temps = ["60", "58", "55", "52", "50"];
        let day = summarize(
            temps
                .iter()
                .enumerate()
                .map(|(i, t)| sample(i as i64, t))
                .collect(),
        );

        let verdict = svc.classify_day(&day, &pkg);
        assert_eq!(verdict.status, Suitability::Hold);
        assert_eq!(verdict.hold_reason, Some(HoldReason::Temperature));
    }

    /// HOLD outranks CAUTION; the reason names the hard violation
    #[test]
    fn test_hold_precedence_over_caution() {
        let svc = service();
        let pkg = package(
            ConstraintSet {
                min_temp_f: Some(dec("40")),
                max_wind_mph: Some(dec("20")),
                ..Default::default()
            },
            4,
        );
        // Average 35 busts the floor; wind 18 merely sits inside the margin
        let mut samples: Vec<WeatherSample> = (0..5).map(|h| sample(h, "35")).collect();
        for s in &mut samples {
            s.wind_speed_mph = dec("18");
        }
        let day = summarize(samples);

        let verdict = svc.classify_day(&day, &pkg);
        assert_eq!(verdict.status, Suitability::Hold);
        assert_eq!(verdict.hold_reason, Some(HoldReason::Temperature));
    }

    /// The built-in catalog has evaluable, internally consistent packages
    #[test]
    fn test_default_catalog_is_consistent() {
        let svc = service();
        assert!(!svc.packages().is_empty());
        for pkg in svc.packages() {
            assert!(shared::validation::validate_constraints(&pkg.constraints).is_ok());
            assert!(shared::validation::validate_package_hours(pkg.required_hours).is_ok());
            assert!(svc.package(&pkg.id).is_some());
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn temps_strategy() -> impl Strategy<Value = Vec<i32>> {
        prop::collection::vec(20i32..80, 1..48)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Window invariants: duration covers the requirement, confidence
        /// stays in [0, 100], ordering is chronological, cap is honored
        #[test]
        fn prop_window_invariants(temps in temps_strategy(), required in 1u32..6) {
            let svc = service();
            let pkg = min_temp_package("40", required);
            let samples: Vec<WeatherSample> = temps
                .iter()
                .enumerate()
                .map(|(i, t)| sample(i as i64, &t.to_string()))
                .collect();

            let windows = svc.find_windows(&samples, &pkg, base_time());
            prop_assert!(windows.len() <= 2);

            for pair in windows.windows(2) {
                prop_assert!(pair[0].starts_at < pair[1].starts_at);
            }
            for w in &windows {
                prop_assert!(w.duration_hours >= required);
                prop_assert!((0..=100).contains(&w.confidence));
                prop_assert!(w.ends_at > w.starts_at);
            }
        }

        /// Classification is total: every day gets exactly one verdict and
        /// hold reasons only accompany HOLD
        #[test]
        fn prop_classifier_total(temps in temps_strategy()) {
            let svc = service();
            let pkg = min_temp_package("40", 4);
            let samples: Vec<WeatherSample> = temps
                .iter()
                .enumerate()
                .map(|(i, t)| sample(i as i64, &t.to_string()))
                .collect();

            for day in group_by_day(&samples, None) {
                let verdict = svc.classify_day(&day, &pkg);
                if verdict.hold_reason.is_some() {
                    prop_assert_eq!(verdict.status, Suitability::Hold);
                }
            }
        }
    }
}
