//! Derived health metrics.
//!
//! Pure functions: BMI from raw vitals, BMI banding, and the composite
//! 0-100 health score. No I/O, no side effects.

use crate::{BmiCategory, Error, Result};

/// Ideal systolic blood pressure used by the health score
pub const IDEAL_BP: f64 = 120.0;
/// Ideal glucose level used by the health score
pub const IDEAL_GLUCOSE: f64 = 100.0;
/// Ideal BMI used by the health score
pub const IDEAL_BMI: f64 = 22.5;

/// Compute BMI from weight in kilograms and height in centimeters
///
/// Height is converted to meters internally. Non-positive height is a
/// validation error rather than a division by zero.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Result<f64> {
    if height_cm <= 0.0 {
        return Err(Error::Validation(format!(
            "height must be positive, got {height_cm}"
        )));
    }
    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

/// Band a BMI value; lower bounds are inclusive
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Composite health score in [0, 100]
///
/// Average of three penalty terms, each `max(0, 100 - k * |actual - ideal|)`
/// with ideals BP=120 (k=1), glucose=100 (k=1), BMI=22.5 (k=5).
pub fn health_score(blood_pressure: u32, glucose: u32, bmi: f64) -> f64 {
    let bp_score = (100.0 - (f64::from(blood_pressure) - IDEAL_BP).abs()).max(0.0);
    let glucose_score = (100.0 - (f64::from(glucose) - IDEAL_GLUCOSE).abs()).max(0.0);
    let bmi_score = (100.0 - 5.0 * (bmi - IDEAL_BMI).abs()).max(0.0);
    (bp_score + glucose_score + bmi_score) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_reference_value() {
        let value = bmi(70.0, 175.0).unwrap();
        assert!((value - 22.86).abs() < 0.01);
    }

    #[test]
    fn test_bmi_zero_height_is_error() {
        assert!(bmi(70.0, 0.0).is_err());
        assert!(bmi(70.0, -10.0).is_err());
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(bmi_category(17.0), BmiCategory::Underweight);
        assert_eq!(bmi_category(18.5), BmiCategory::Normal);
        assert_eq!(bmi_category(24.9), BmiCategory::Normal);
        assert_eq!(bmi_category(25.0), BmiCategory::Overweight);
        assert_eq!(bmi_category(29.9), BmiCategory::Overweight);
        assert_eq!(bmi_category(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_perfect_score() {
        assert_eq!(health_score(120, 100, 22.5), 100.0);
    }

    #[test]
    fn test_score_stays_in_range() {
        for bp in [80u32, 120, 200] {
            for glucose in [50u32, 100, 300] {
                for bmi in [10.0, 22.5, 45.0] {
                    let score = health_score(bp, glucose, bmi);
                    assert!((0.0..=100.0).contains(&score), "score {score} out of range");
                }
            }
        }
    }

    #[test]
    fn test_bmi_deviation_weighted_heavier() {
        // One BMI unit off costs as much as five mmHg of blood pressure
        let off_by_bp = health_score(125, 100, 22.5);
        let off_by_bmi = health_score(120, 100, 23.5);
        assert_eq!(off_by_bp, off_by_bmi);
    }
}
