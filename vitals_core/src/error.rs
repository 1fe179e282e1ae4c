//! Error types for the vitals_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vitals_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No stored records exist for the given patient
    #[error("no records found for {name}")]
    NotFound { name: String },

    /// Report index outside the stored range (1-based)
    #[error("report index {index} out of range (1-{count})")]
    InvalidIndex { index: usize, count: usize },

    /// Stored or supplied field failed validation
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chart rendering error
    #[error("chart error: {0}")]
    Chart(String),
}
