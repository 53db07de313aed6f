//! API layer for ai-insights
//!
//! This module provides the main public interfaces for converting the dataset
//! into SQL and for querying the loaded database.

pub mod catalog;
pub mod converter;

// Re-export main API types
pub use catalog::{ModelCatalog, ResultRow};
pub use converter::{ConversionReport, CsvConverter, RecordFailure};
