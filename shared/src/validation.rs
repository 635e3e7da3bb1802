//! Validation utilities for the SiteCast scheduling platform

use rust_decimal::Decimal;

use crate::models::{ConstraintSet, WorkLogEntry};

// ============================================================================
// Coordinate Validations
// ============================================================================

/// Validate latitude/longitude are on the globe
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

// ============================================================================
// Work Package Validations
// ============================================================================

/// Validate a constraint set is internally consistent
pub fn validate_constraints(constraints: &ConstraintSet) -> Result<(), &'static str> {
    if let (Some(min), Some(max)) = (constraints.min_temp_f, constraints.max_temp_f) {
        if min >= max {
            return Err("min_temp_f must be below max_temp_f");
        }
    }
    if let Some(wind) = constraints.max_wind_mph {
        if wind < Decimal::ZERO {
            return Err("max_wind_mph cannot be negative");
        }
    }
    Ok(())
}

/// Validate a package's hour requirements
pub fn validate_package_hours(required_hours: u32) -> Result<(), &'static str> {
    if required_hours == 0 {
        return Err("required_hours must be at least 1");
    }
    if required_hours > 24 {
        return Err("required_hours cannot exceed one day of continuous work");
    }
    Ok(())
}

// ============================================================================
// Work Log Validations
// ============================================================================

/// Validate a work log entry holds plausible values
pub fn validate_log_entry(entry: &WorkLogEntry) -> Result<(), &'static str> {
    if entry.crew_size == 0 {
        return Err("crew_size must be at least 1");
    }
    if entry.total_labor_hours < Decimal::ZERO {
        return Err("total_labor_hours cannot be negative");
    }
    if entry.sqft_completed < Decimal::ZERO {
        return Err("sqft_completed cannot be negative");
    }
    if entry.categories.values().any(|h| *h < Decimal::ZERO) {
        return Err("category hours cannot be negative");
    }
    Ok(())
}

/// Validate a percentage value
pub fn validate_percentage(value: i32) -> Result<(), &'static str> {
    if !(0..=100).contains(&value) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// Validate a precipitation probability fraction
pub fn validate_pop(pop: Decimal) -> Result<(), &'static str> {
    if pop < Decimal::ZERO || pop > Decimal::ONE {
        return Err("Precipitation probability must be between 0 and 1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::NaiveDate;

    #[test]
    fn test_constraint_bounds_ordering() {
        let cs = ConstraintSet {
            min_temp_f: Some(Decimal::from(40)),
            max_temp_f: Some(Decimal::from(40)),
            ..Default::default()
        };
        assert!(validate_constraints(&cs).is_err());

        let cs = ConstraintSet {
            min_temp_f: Some(Decimal::from(40)),
            max_temp_f: Some(Decimal::from(90)),
            ..Default::default()
        };
        assert!(validate_constraints(&cs).is_ok());
    }

    #[test]
    fn test_unbounded_constraints_are_valid() {
        assert!(validate_constraints(&ConstraintSet::default()).is_ok());
    }

    #[test]
    fn test_coordinates() {
        assert!(validate_coordinates(Decimal::from(39), Decimal::from(-105)).is_ok());
        assert!(validate_coordinates(Decimal::from(91), Decimal::from(0)).is_err());
        assert!(validate_coordinates(Decimal::from(0), Decimal::from(-181)).is_err());
    }

    #[test]
    fn test_log_entry_rejects_zero_crew() {
        let entry = WorkLogEntry {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            crew_size: 0,
            total_labor_hours: Decimal::from(40),
            sqft_completed: Decimal::from(900),
            categories: HashMap::new(),
        };
        assert!(validate_log_entry(&entry).is_err());
    }

    #[test]
    fn test_pop_fraction_bounds() {
        assert!(validate_pop(Decimal::new(35, 2)).is_ok());
        assert!(validate_pop(Decimal::from(2)).is_err());
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(validate_percentage(0).is_ok());
        assert!(validate_percentage(100).is_ok());
        assert!(validate_percentage(101).is_err());
        assert!(validate_percentage(-1).is_err());
    }
}
