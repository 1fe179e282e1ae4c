//! Core domain types for the Vitalog health tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Reports (one row per generation event)
//! - BMI categories and the normal/needs-attention condition flag
//! - Trend points extracted for charting
//! - Medication log entries

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// Timestamp format used in every patient CSV file
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// BMI Category
// ============================================================================

/// BMI band; lower bounds are inclusive (18.5 is Normal, 25 is Overweight)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        };
        f.write_str(s)
    }
}

impl FromStr for BmiCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "Underweight" => Ok(BmiCategory::Underweight),
            "Normal weight" => Ok(BmiCategory::Normal),
            "Overweight" => Ok(BmiCategory::Overweight),
            "Obese" => Ok(BmiCategory::Obese),
            other => Err(crate::Error::Validation(format!(
                "unknown BMI category: {other}"
            ))),
        }
    }
}

// ============================================================================
// Condition
// ============================================================================

/// Whether a report's vitals are inside normal ranges
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Normal,
    NeedsAttention,
}

impl Condition {
    /// Fixed recommendation text for this condition
    pub fn recommendation(&self) -> &'static str {
        match self {
            Condition::Normal => "Keep up the good work!",
            Condition::NeedsAttention => "Please consult with your doctor.",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Condition::Normal => "Normal",
            Condition::NeedsAttention => "Needs Attention",
        };
        f.write_str(s)
    }
}

impl FromStr for Condition {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "Normal" => Ok(Condition::Normal),
            "Needs Attention" => Ok(Condition::NeedsAttention),
            other => Err(crate::Error::Validation(format!(
                "unknown condition: {other}"
            ))),
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// A generated health report for one patient at one point in time
///
/// BMI, category, condition and recommendation are always derived from
/// the raw vitals; they are never supplied directly.
#[derive(Clone, Debug)]
pub struct Report {
    pub date: NaiveDateTime,
    pub name: String,
    pub age: u32,
    /// Systolic blood pressure, mmHg
    pub blood_pressure: u32,
    pub glucose: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub condition: Condition,
    pub recommendation: String,
}

// ============================================================================
// Trend Point
// ============================================================================

/// One charted sample extracted from a stored report row
///
/// BMI may be absent: files written before the BMI column existed carry
/// Weight/Height instead (recomputed at parse time), and files with
/// neither column yield `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDateTime,
    pub blood_pressure: u32,
    pub glucose: u32,
    pub bmi: Option<f64>,
}

// ============================================================================
// Medication
// ============================================================================

/// One entry in a patient's medication log
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Medication {
    #[serde(rename = "Medication")]
    pub medication: String,
    #[serde(rename = "Dosage")]
    pub dosage: String,
    #[serde(rename = "Frequency")]
    pub frequency: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
}
