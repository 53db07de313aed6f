//! CSV to SQL conversion for ai-insights
//!
//! This module turns dataset cells into SQL literals and dataset rows into
//! `INSERT` statements laid out in table column order.

pub mod coerce;
pub mod record;

// Re-export main types and functions
pub use coerce::{NumericMode, coerce, is_missing, sql_boolean, sql_date, sql_number, sql_string};
pub use record::RecordAssembler;
