//! Fault-tolerant execution of SQL files
//!
//! Insert files first run as one script inside a savepoint. If anything in the
//! script fails the savepoint is rolled back and the file is replayed one
//! statement at a time, so a single bad row costs one statement, not the file.
//! Schema files always run statement by statement.

use crate::error::{InsightsError, Result};
use crate::storage::dialect::{DialectTranslator, split_statements};
use crate::utils;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

const FAST_PATH_SAVEPOINT: &str = "insights_script";
const PREVIEW_CHARS: usize = 100;

/// Role of a SQL file in database setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// DDL, executed first
    Schema,
    /// Generated `*_insert.sql` data
    Insert,
}

impl FileKind {
    pub fn of<P: AsRef<Path>>(path: P) -> Self {
        if utils::is_insert_file(path) {
            FileKind::Insert
        } else {
            FileKind::Schema
        }
    }
}

/// How a file's statements ended up being executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The whole script committed in one pass
    Script,
    /// Statements were executed independently
    PerStatement,
}

/// A statement that failed and was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct StatementFailure {
    /// 0-based position of the statement in the file
    pub index: usize,
    pub preview: String,
    pub error: String,
}

/// Outcome of executing one SQL file
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub path: PathBuf,
    pub kind: FileKind,
    pub mode: ExecutionMode,
    /// Statements that executed successfully
    pub succeeded: usize,
    pub failures: Vec<StatementFailure>,
}

impl ExecutionReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// True when every statement in the file executed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Executes translated SQL files against one connection
pub struct BatchExecutor<'a> {
    conn: &'a Connection,
    translator: &'a DialectTranslator,
    max_logged_failures: usize,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(conn: &'a Connection, translator: &'a DialectTranslator) -> Self {
        Self {
            conn,
            translator,
            max_logged_failures: 10,
        }
    }

    /// Limit detailed failure logging per file
    pub fn with_max_logged_failures(mut self, max: usize) -> Self {
        self.max_logged_failures = max;
        self
    }

    /// Read, translate and execute one SQL file.
    ///
    /// Failing to read the file is an error; failing statements are not.
    pub fn execute_file<P: AsRef<Path>>(&self, path: P) -> Result<ExecutionReport> {
        let path = path.as_ref();
        log::info!("Executing SQL file: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            log::error!("Error executing {}: {}", path.display(), e);
            InsightsError::Storage(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Ok(self.execute_sql(path, FileKind::of(path), &content))
    }

    /// Translate and execute SQL text that came from `path`
    pub fn execute_sql(&self, path: &Path, kind: FileKind, content: &str) -> ExecutionReport {
        for construct in self.translator.unsupported_constructs(content) {
            log::warn!(
                "{} uses {}, which is passed to SQLite untranslated",
                path.display(),
                construct
            );
        }
        let sql = self.translator.translate(content);

        if kind == FileKind::Insert {
            match self.execute_script(&sql) {
                Ok(succeeded) => {
                    log::info!("Successfully executed: {}", path.display());
                    return ExecutionReport {
                        path: path.to_path_buf(),
                        kind,
                        mode: ExecutionMode::Script,
                        succeeded,
                        failures: Vec::new(),
                    };
                }
                Err(e) => {
                    log::warn!("Script execution failed for {}: {}", path.display(), e);
                    log::info!("Falling back to statement-by-statement execution...");
                }
            }
        }

        self.execute_statements(path, kind, &sql)
    }

    /// Run the whole script inside a savepoint, undoing it on failure
    fn execute_script(&self, sql: &str) -> rusqlite::Result<usize> {
        self.conn
            .execute_batch(&format!("SAVEPOINT {}", FAST_PATH_SAVEPOINT))?;

        match self.conn.execute_batch(sql) {
            Ok(()) => {
                self.conn
                    .execute_batch(&format!("RELEASE {}", FAST_PATH_SAVEPOINT))?;
                Ok(split_statements(sql).len())
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch(&format!(
                    "ROLLBACK TO {0}; RELEASE {0}",
                    FAST_PATH_SAVEPOINT
                )) {
                    log::error!("Failed to roll back script savepoint: {}", rollback);
                }
                Err(e)
            }
        }
    }

    fn execute_statements(&self, path: &Path, kind: FileKind, sql: &str) -> ExecutionReport {
        let mut succeeded = 0;
        let mut failures = Vec::new();

        for (index, statement) in split_statements(sql).into_iter().enumerate() {
            match self.conn.execute_batch(statement) {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    let failure = StatementFailure {
                        index,
                        preview: utils::preview(statement, PREVIEW_CHARS),
                        error: e.to_string(),
                    };

                    if failures.len() < self.max_logged_failures {
                        log::warn!(
                            "Warning executing statement in {}: {}",
                            path.display(),
                            failure.error
                        );
                        log::warn!("Statement preview: {}", failure.preview);
                    } else if failures.len() == self.max_logged_failures {
                        log::warn!("Suppressing further error messages for {}...", path.display());
                    }
                    failures.push(failure);
                }
            }
        }

        log::info!("Successfully executed: {}", path.display());
        log::info!("  - Successful statements: {}", succeeded);
        if !failures.is_empty() {
            log::warn!("  - Failed statements: {}", failures.len());
        }

        ExecutionReport {
            path: path.to_path_buf(),
            kind,
            mode: ExecutionMode::PerStatement,
            succeeded,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Connection, DialectTranslator) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
            .unwrap();
        (conn, DialectTranslator::new().unwrap())
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::of("data/x_insert.sql"), FileKind::Insert);
        assert_eq!(FileKind::of("data/x.sql"), FileKind::Schema);
    }

    #[test]
    fn test_insert_fast_path() {
        let (conn, translator) = setup();
        let executor = BatchExecutor::new(&conn, &translator);

        let sql = "INSERT INTO t VALUES (1, 'a');\nINSERT INTO t VALUES (2, 'b;c');\n";
        let report = executor.execute_sql(Path::new("t_insert.sql"), FileKind::Insert, sql);

        assert_eq!(report.mode, ExecutionMode::Script);
        assert_eq!(report.succeeded, 2);
        assert!(report.is_complete());
        assert_eq!(count(&conn), 2);
    }

    #[test]
    fn test_fallback_keeps_good_statements() {
        let (conn, translator) = setup();
        let executor = BatchExecutor::new(&conn, &translator);

        let sql = "INSERT INTO t VALUES (1, 'a');\n\
                   INSERT INTO t VALUES (2, NULL);\n\
                   INSERT INTO t VALUES (3, 'c');\n\
                   INSERT INTO t VALUES (4, 'd');";
        let report = executor.execute_sql(Path::new("t_insert.sql"), FileKind::Insert, sql);

        assert_eq!(report.mode, ExecutionMode::PerStatement);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(count(&conn), 3);
    }

    #[test]
    fn test_schema_files_run_per_statement() {
        let (conn, translator) = setup();
        let executor = BatchExecutor::new(&conn, &translator);

        let sql = "CREATE TABLE u (flag BOOLEAN, n BIGINT);\nCREATE TABLE u (x TEXT);\n\
                   COMMENT ON TABLE u IS 'dup';\nCREATE TABLE v (name VARCHAR(10));";
        let report = executor.execute_sql(Path::new("schema.sql"), FileKind::Schema, sql);

        assert_eq!(report.mode, ExecutionMode::PerStatement);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn test_failures_beyond_log_cap_are_still_counted() {
        let (conn, translator) = setup();
        let executor = BatchExecutor::new(&conn, &translator).with_max_logged_failures(2);

        let sql = (0..5)
            .map(|i| format!("INSERT INTO missing VALUES ({});", i))
            .collect::<Vec<_>>()
            .join("\n");
        let report = executor.execute_sql(Path::new("m_insert.sql"), FileKind::Insert, &sql);

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failure_count(), 5);
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let (conn, translator) = setup();
        let executor = BatchExecutor::new(&conn, &translator);
        assert!(executor.execute_file("/nonexistent/file_insert.sql").is_err());
    }
}
