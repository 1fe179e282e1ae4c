#![forbid(unsafe_code)]

//! Core domain model and business logic for the Vitalog health tracker.
//!
//! This crate provides:
//! - Domain types (reports, vitals, medications)
//! - Derived metrics (BMI, BMI category, health score)
//! - Report building
//! - Per-patient CSV persistence
//! - Trend extraction and chart rendering

pub mod types;
pub mod error;
pub mod metrics;
pub mod report;
pub mod store;
pub mod trends;
pub mod chart;
pub mod medication;
pub mod tips;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use metrics::{bmi, bmi_category, health_score};
pub use report::build_report;
pub use store::ReportStore;
pub use trends::parse_for_trends;
pub use chart::render_trends;
pub use medication::MedicationLog;
pub use tips::random_tip;
