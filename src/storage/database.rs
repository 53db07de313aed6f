//! SQLite database operations for ai-insights
//!
//! Setup runs every schema file inside one transaction and every insert file
//! inside a second one, committing after each phase.

use crate::error::{InsightsError, Result};
use crate::storage::dialect::DialectTranslator;
use crate::storage::executor::{BatchExecutor, ExecutionReport};
use crate::storage::schema;
use crate::utils;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Database connection and operations
pub struct Database {
    conn: Connection,
    max_logged_failures: usize,
}

impl Database {
    /// Open (or create) a database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| InsightsError::Storage(format!("Failed to open database: {}", e)))?;

        Ok(Self::with_connection(conn))
    }

    /// Create an in-memory database (for testing)
    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            InsightsError::Storage(format!("Failed to create in-memory database: {}", e))
        })?;

        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            max_logged_failures: 10,
        }
    }

    /// Limit detailed statement failure logging per file
    pub fn with_max_logged_failures(mut self, max: usize) -> Self {
        self.max_logged_failures = max;
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Give up the wrapper and keep the connection
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Create the `ai_models` table from the schema descriptor
    pub fn create_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(&schema::create_table_sqlite()?)
            .map_err(|e| InsightsError::Storage(format!("Failed to create schema: {}", e)))?;
        Ok(())
    }

    /// Execute every SQL file found under `data_dir`
    pub fn setup<P: AsRef<Path>>(&mut self, data_dir: P) -> Result<SetupReport> {
        let data_dir = data_dir.as_ref();
        log::info!("Data directory: {}", data_dir.display());

        let (schema_files, insert_files) = utils::find_sql_files(data_dir)?;
        log::info!(
            "Found {} schema files and {} insert files",
            schema_files.len(),
            insert_files.len()
        );

        if schema_files.is_empty() && insert_files.is_empty() {
            log::warn!("No SQL files found in the data directory");
            return Ok(SetupReport::default());
        }

        self.conn
            .execute_batch("PRAGMA foreign_keys = ON")
            .map_err(|e| InsightsError::Storage(format!("Failed to enable foreign keys: {}", e)))?;

        let translator = DialectTranslator::new()?;

        log::info!("Executing schema files...");
        let schema = self.run_phase(&schema_files, &translator)?;
        log::info!("Schema files executed successfully");

        let mut inserts = Vec::new();
        if !insert_files.is_empty() {
            log::info!("Executing insert files...");
            inserts = self.run_phase(&insert_files, &translator)?;
            log::info!("Insert files executed successfully");
        }

        let tables = self.table_stats()?;
        log::info!("Database setup complete. Created {} tables:", tables.len());
        for table in &tables {
            log::info!("  - {}: {} rows", table.name, table.row_count);
        }

        Ok(SetupReport {
            schema,
            inserts,
            tables,
        })
    }

    /// Execute files in one transaction; a fatal file error rolls it back
    fn run_phase(
        &mut self,
        files: &[PathBuf],
        translator: &DialectTranslator,
    ) -> Result<Vec<ExecutionReport>> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| InsightsError::Storage(format!("Failed to start transaction: {}", e)))?;

        let mut reports = Vec::with_capacity(files.len());
        {
            let executor = BatchExecutor::new(&tx, translator)
                .with_max_logged_failures(self.max_logged_failures);
            for file in files {
                reports.push(executor.execute_file(file)?);
            }
        }

        tx.commit()
            .map_err(|e| InsightsError::Storage(format!("Failed to commit transaction: {}", e)))?;
        Ok(reports)
    }

    /// Row counts for every table
    pub fn table_stats(&self) -> Result<Vec<TableStats>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .map_err(|e| InsightsError::Storage(format!("Failed to prepare query: {}", e)))?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| InsightsError::Storage(format!("Failed to list tables: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stats = Vec::with_capacity(names.len());
        for name in names {
            let row_count: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_identifier(&name)),
                [],
                |row| row.get(0),
            )?;
            stats.push(TableStats {
                name,
                row_count: row_count as usize,
            });
        }

        Ok(stats)
    }
}

/// Double-quote an identifier for interpolation into SQL
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Row count of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    pub name: String,
    pub row_count: usize,
}

/// Outcome of a full database setup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupReport {
    pub schema: Vec<ExecutionReport>,
    pub inserts: Vec<ExecutionReport>,
    pub tables: Vec<TableStats>,
}

impl SetupReport {
    /// Failed statements across all files
    pub fn failure_count(&self) -> usize {
        self.schema
            .iter()
            .chain(&self.inserts)
            .map(ExecutionReport::failure_count)
            .sum()
    }

    /// Rows in a table after setup
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.row_count)
    }
}
