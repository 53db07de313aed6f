//! Storage functionality for ai-insights
//!
//! This module provides the table schema, the dialect translator, batch
//! execution of SQL files, and database setup using embedded SQLite.

pub mod database;
pub mod dialect;
pub mod executor;
pub mod inspect;
pub mod schema;

// Re-export main types
pub use database::{Database, SetupReport, TableStats};
pub use dialect::DialectTranslator;
pub use executor::{BatchExecutor, ExecutionMode, ExecutionReport, FileKind};
