//! Error types for ai-insights
//!
//! Environment-level failures (unreadable files, unopenable databases) surface
//! through [`InsightsError`]. Data-level problems such as a bad cell or a
//! malformed statement are absorbed into reports instead and never reach here.

use thiserror::Error;

/// Main error type for ai-insights operations
#[derive(Error, Debug)]
pub enum InsightsError {
    /// CSV input errors that are not tied to a single record
    #[error("CSV error: {0}")]
    Csv(String),

    /// Conversion output errors
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Dialect translator errors
    #[error("Dialect error: {0}")]
    Dialect(String),

    /// Database/storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Read query errors
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// CSV reader errors
    #[error("CSV reader error: {0}")]
    CsvReader(#[from] csv::Error),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(String),
}

/// Result type alias for ai-insights operations
pub type Result<T> = std::result::Result<T, InsightsError>;

impl From<anyhow::Error> for InsightsError {
    fn from(err: anyhow::Error) -> Self {
        InsightsError::Generic(err.to_string())
    }
}

impl From<regex::Error> for InsightsError {
    fn from(err: regex::Error) -> Self {
        InsightsError::Dialect(err.to_string())
    }
}
