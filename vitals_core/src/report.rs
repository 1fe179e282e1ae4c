//! Report building.
//!
//! Assembles a full report from raw vitals: derived BMI, BMI category,
//! condition flag and recommendation text. Persisting the result is the
//! caller's job.

use crate::{metrics, Condition, Report, Result};
use chrono::NaiveDateTime;

/// Derive the condition flag from the raw vitals and BMI
///
/// NeedsAttention iff blood pressure > 120 OR glucose > 140 OR the BMI
/// falls outside the Normal band.
pub fn evaluate_condition(blood_pressure: u32, glucose: u32, bmi: f64) -> Condition {
    if blood_pressure > 120 || glucose > 140 || bmi < 18.5 || bmi >= 25.0 {
        Condition::NeedsAttention
    } else {
        Condition::Normal
    }
}

/// Build a report from validated vitals, stamped with the given time
///
/// BMI and its category are always recomputed here; the single BMI
/// value feeds both the category/condition derivation and any health
/// score the caller computes afterwards.
pub fn build_report(
    name: &str,
    age: u32,
    blood_pressure: u32,
    glucose: u32,
    weight_kg: f64,
    height_cm: f64,
    now: NaiveDateTime,
) -> Result<Report> {
    let bmi = metrics::bmi(weight_kg, height_cm)?;
    let bmi_category = metrics::bmi_category(bmi);
    let condition = evaluate_condition(blood_pressure, glucose, bmi);

    Ok(Report {
        date: now,
        name: name.to_string(),
        age,
        blood_pressure,
        glucose,
        weight_kg,
        height_cm,
        bmi,
        bmi_category,
        condition,
        recommendation: condition.recommendation().to_string(),
    })
}
