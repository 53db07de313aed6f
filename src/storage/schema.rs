//! Database schema definitions
//!
//! [`COLUMNS`] is the single source of truth for the `ai_models` column order.
//! Insert assembly and DDL generation both walk it, so the positional
//! `INSERT ... VALUES` statements always line up with the table.

use crate::error::Result;
use crate::storage::dialect::DialectTranslator;
use std::fmt;

/// Destination table for model records
pub const TABLE_NAME: &str = "ai_models";

/// Column type, expressed in the PostgreSQL dialect the schema is authored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Bounded character column
    Varchar(u16),
    /// Unbounded text
    Text,
    /// 64-bit integer
    BigInt,
    /// Fixed precision decimal (precision, scale)
    Decimal(u8, u8),
    /// ISO 8601 calendar date
    Date,
    /// Boolean flag
    Boolean,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Varchar(len) => write!(f, "VARCHAR({})", len),
            ColumnKind::Text => write!(f, "TEXT"),
            ColumnKind::BigInt => write!(f, "BIGINT"),
            ColumnKind::Decimal(precision, scale) => write!(f, "DECIMAL({},{})", precision, scale),
            ColumnKind::Date => write!(f, "DATE"),
            ColumnKind::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// One column of the model catalog table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name in the database
    pub name: &'static str,
    /// Header of the matching CSV column
    pub header: &'static str,
    pub kind: ColumnKind,
    pub description: &'static str,
}

const fn column(
    name: &'static str,
    header: &'static str,
    kind: ColumnKind,
    description: &'static str,
) -> Column {
    Column {
        name,
        header,
        kind,
        description,
    }
}

/// Ordered columns of the `ai_models` table
pub const COLUMNS: &[Column] = &[
    // Model identification
    column("model", "Model", ColumnKind::Varchar(255), "Name of the AI model"),
    column(
        "organization",
        "Organization",
        ColumnKind::Varchar(500),
        "Organization(s) that developed the model",
    ),
    column(
        "publication_date",
        "Publication date",
        ColumnKind::Date,
        "Date the model was first published",
    ),
    // Capabilities and domain
    column(
        "domain",
        "Domain",
        ColumnKind::Varchar(255),
        "Application domain, e.g. Language or Vision",
    ),
    column("task", "Task", ColumnKind::Text, "Tasks the model was designed for"),
    // Architecture
    column("parameters", "Parameters", ColumnKind::BigInt, "Number of trainable parameters"),
    column(
        "parameters_notes",
        "Parameters notes",
        ColumnKind::Text,
        "How the parameter count was determined",
    ),
    // Training compute
    column(
        "training_compute_flop",
        "Training compute (FLOP)",
        ColumnKind::Decimal(40, 2),
        "Training compute in floating point operations",
    ),
    column(
        "training_compute_notes",
        "Training compute notes",
        ColumnKind::Text,
        "How training compute was estimated",
    ),
    // Training dataset
    column("training_dataset", "Training dataset", ColumnKind::Text, "Datasets used for training"),
    column(
        "training_dataset_size",
        "Training dataset size (datapoints)",
        ColumnKind::BigInt,
        "Training dataset size in datapoints",
    ),
    column(
        "dataset_size_notes",
        "Dataset size notes",
        ColumnKind::Text,
        "How the dataset size was determined",
    ),
    // Confidence and sources
    column(
        "confidence",
        "Confidence",
        ColumnKind::Varchar(100),
        "Confidence in the reported figures",
    ),
    column("link", "Link", ColumnKind::Text, "Link to the publication"),
    column("reference", "Reference", ColumnKind::Text, "Publication title"),
    column("citations", "Citations", ColumnKind::BigInt, "Citation count of the publication"),
    column("authors", "Authors", ColumnKind::Text, "Publication authors"),
    column("abstract", "Abstract", ColumnKind::Text, "Publication abstract"),
    // Organization details
    column(
        "organization_categorization",
        "Organization categorization",
        ColumnKind::Varchar(255),
        "Industry, academia, or both",
    ),
    column(
        "country",
        "Country (of organization)",
        ColumnKind::Varchar(255),
        "Country of the developing organization",
    ),
    // Notability
    column(
        "notability_criteria",
        "Notability criteria",
        ColumnKind::Text,
        "Why the model is considered notable",
    ),
    column(
        "notability_criteria_notes",
        "Notability criteria notes",
        ColumnKind::Text,
        "Details on notability",
    ),
    // Training details
    column("epochs", "Epochs", ColumnKind::Decimal(20, 4), "Number of training epochs"),
    column(
        "training_time_hours",
        "Training time (hours)",
        ColumnKind::Decimal(20, 2),
        "Wall clock training time in hours",
    ),
    column(
        "training_time_notes",
        "Training time notes",
        ColumnKind::Text,
        "How training time was determined",
    ),
    // Hardware
    column(
        "training_hardware",
        "Training hardware",
        ColumnKind::Varchar(255),
        "Accelerator used for training",
    ),
    column(
        "hardware_quantity",
        "Hardware quantity",
        ColumnKind::Decimal(20, 2),
        "Number of accelerators used",
    ),
    column(
        "hardware_utilization",
        "Hardware utilization",
        ColumnKind::Decimal(10, 4),
        "Fraction of peak hardware throughput achieved",
    ),
    // Cost
    column(
        "training_compute_cost_usd",
        "Training compute cost (2023 USD)",
        ColumnKind::Decimal(20, 2),
        "Training compute cost in 2023 US dollars",
    ),
    column(
        "compute_cost_notes",
        "Compute cost notes",
        ColumnKind::Text,
        "How the compute cost was estimated",
    ),
    column(
        "training_power_draw_w",
        "Training power draw (W)",
        ColumnKind::BigInt,
        "Power draw of the training cluster in watts",
    ),
    // Relationships
    column(
        "base_model",
        "Base model",
        ColumnKind::Varchar(255),
        "Model this one was fine-tuned from",
    ),
    column(
        "finetune_compute_flop",
        "Finetune compute (FLOP)",
        ColumnKind::Decimal(40, 2),
        "Fine-tuning compute in floating point operations",
    ),
    column(
        "finetune_compute_notes",
        "Finetune compute notes",
        ColumnKind::Text,
        "How fine-tuning compute was estimated",
    ),
    // Training configuration
    column("batch_size", "Batch size", ColumnKind::BigInt, "Training batch size"),
    column(
        "batch_size_notes",
        "Batch size notes",
        ColumnKind::Text,
        "How the batch size was determined",
    ),
    // Accessibility
    column(
        "model_accessibility",
        "Model accessibility",
        ColumnKind::Varchar(255),
        "Availability of the model weights",
    ),
    column(
        "training_code_accessibility",
        "Training code accessibility",
        ColumnKind::Varchar(255),
        "Availability of the training code",
    ),
    column(
        "inference_code_accessibility",
        "Inference code accessibility",
        ColumnKind::Varchar(255),
        "Availability of the inference code",
    ),
    column(
        "accessibility_notes",
        "Accessibility notes",
        ColumnKind::Text,
        "Details on accessibility",
    ),
    // Technical specifications
    column(
        "numerical_format",
        "Numerical format",
        ColumnKind::Varchar(100),
        "Numerical precision used in training",
    ),
    column(
        "frontier_model",
        "Frontier model",
        ColumnKind::Boolean,
        "Whether the model was at the frontier when published",
    ),
];

/// Column names in table order
pub fn column_names() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.name).collect()
}

/// Position of a column in the table
pub fn column_index(name: &str) -> Option<usize> {
    COLUMNS.iter().position(|c| c.name == name)
}

/// PostgreSQL DDL for the model catalog, including column comments
pub fn create_table_postgres() -> String {
    let mut sql = String::new();
    sql.push_str("-- AI Models catalog schema\n");
    sql.push_str(&format!("CREATE TABLE IF NOT EXISTS {} (\n", TABLE_NAME));

    let definitions: Vec<String> = COLUMNS
        .iter()
        .map(|c| format!("    {} {}", c.name, c.kind))
        .collect();
    sql.push_str(&definitions.join(",\n"));
    sql.push_str("\n);\n\n");

    for c in COLUMNS {
        sql.push_str(&format!(
            "COMMENT ON COLUMN {}.{} IS '{}';\n",
            TABLE_NAME,
            c.name,
            c.description.replace('\'', "''")
        ));
    }

    sql
}

/// SQLite DDL, produced by translating the PostgreSQL schema
pub fn create_table_sqlite() -> Result<String> {
    let translator = DialectTranslator::new()?;
    Ok(translator.translate(&create_table_postgres()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::collections::HashSet;

    #[test]
    fn test_column_names_are_unique() {
        let names: HashSet<_> = column_names().into_iter().collect();
        assert_eq!(names.len(), COLUMNS.len());
        assert_eq!(COLUMNS.len(), 42);
    }

    #[test]
    fn test_column_order_boundaries() {
        assert_eq!(column_index("model"), Some(0));
        assert_eq!(column_index("parameters"), Some(5));
        assert_eq!(column_index("frontier_model"), Some(COLUMNS.len() - 1));
        assert_eq!(column_index("missing"), None);
    }

    #[test]
    fn test_postgres_ddl() {
        let ddl = create_table_postgres();
        assert!(ddl.contains("CREATE TABLE IF NOT EXISTS ai_models ("));
        assert!(ddl.contains("    parameters BIGINT,"));
        assert!(ddl.contains("    training_compute_flop DECIMAL(40,2),"));
        assert!(ddl.contains("    frontier_model BOOLEAN\n);"));
        assert_eq!(ddl.matches("COMMENT ON COLUMN").count(), COLUMNS.len());
    }

    #[test]
    fn test_sqlite_ddl_creates_table() {
        let ddl = create_table_sqlite().unwrap();
        assert!(!ddl.contains("COMMENT ON"));
        assert!(!ddl.contains("VARCHAR"));

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&ddl).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pragma_table_info('ai_models')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count as usize, COLUMNS.len());
    }
}
