//! # ai-insights
//!
//! Turns the notable AI models dataset (CSV) into SQL insert statements, loads
//! schema and data into a local SQLite database, and queries it back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_insights::{CsvConverter, Database, ModelCatalog};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Convert the dataset into an insert file
//!     let converter = CsvConverter::new(None);
//!     let report = converter.convert_file(
//!         "data/models/notable_ai_models.csv",
//!         "data/models/notable_ai_models_insert.sql",
//!     )?;
//!     println!("Wrote {} statements", report.written);
//!
//!     // Load every schema and insert file under ./data
//!     let mut db = Database::new("db/ai_insights.db")?;
//!     db.setup("data")?;
//!
//!     // Query the catalog
//!     let catalog = ModelCatalog::open("db/ai_insights.db")?;
//!     for row in catalog.largest_models(Some(5))? {
//!         println!("{:?}", row.get_str("model"));
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod convert;
pub mod error;
pub mod report;
pub mod storage;
pub mod utils;

// Re-export main API types
pub use api::{ConversionReport, CsvConverter, ModelCatalog, ResultRow};
pub use config::Config;
pub use error::{InsightsError, Result};

// Re-export commonly used types
pub use storage::{Database, DialectTranslator, ExecutionReport, SetupReport};
