//! Smoke-test inspection of a loaded database

use crate::error::Result;
use crate::storage::database::quote_identifier;
use crate::storage::schema::TABLE_NAME;
use rusqlite::{Connection, OptionalExtension, params};

/// One column as reported by `PRAGMA table_info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

/// Structure and size of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub row_count: usize,
}

/// Data quality figures for the model catalog
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityReport {
    /// Rows whose model name is NULL or empty
    pub empty_model_names: usize,
    /// Rows with a publication date
    pub dated_rows: usize,
    /// Smallest and largest parameter counts
    pub parameter_range: Option<(f64, f64)>,
    pub organization_count: usize,
    pub frontier_count: usize,
}

/// Whether a table exists
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Describe every table in the database
pub fn table_info(conn: &Connection) -> Result<Vec<TableInfo>> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        log::info!("Testing table: {}", name);

        let mut columns_stmt = conn.prepare(
            "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let columns = columns_stmt
            .query_map(params![name], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    data_type: row.get(1)?,
                    nullable: row.get::<_, i64>(2)? == 0,
                    primary_key: row.get::<_, i64>(3)? != 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let row_count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_identifier(&name)),
            [],
            |row| row.get(0),
        )?;

        log::info!("  - {} columns, {} rows", columns.len(), row_count);
        tables.push(TableInfo {
            name,
            columns,
            row_count: row_count as usize,
        });
    }

    Ok(tables)
}

/// Run the data integrity checks; `None` when the catalog table is absent
pub fn integrity_report(conn: &Connection) -> Result<Option<IntegrityReport>> {
    if !table_exists(conn, TABLE_NAME)? {
        return Ok(None);
    }
    log::info!("Running data integrity tests...");

    let count = |sql: &str| -> Result<usize> {
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as usize)
    };

    let empty_model_names =
        count("SELECT COUNT(*) FROM ai_models WHERE model IS NULL OR model = ''")?;
    if empty_model_names > 0 {
        log::warn!("Found {} rows with null/empty model names", empty_model_names);
    } else {
        log::info!("✓ All model names are non-null and non-empty");
    }

    let dated_rows = count("SELECT COUNT(*) FROM ai_models WHERE publication_date IS NOT NULL")?;
    log::info!("✓ {} rows have valid publication dates", dated_rows);

    let (min, max): (Option<f64>, Option<f64>) = conn.query_row(
        "SELECT MIN(parameters), MAX(parameters) FROM ai_models WHERE parameters IS NOT NULL",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let parameter_range = min.zip(max);
    if let Some((min, max)) = parameter_range {
        log::info!(
            "✓ Parameter range: {} to {}",
            crate::utils::format_thousands(min),
            crate::utils::format_thousands(max)
        );
    }

    let organization_count = count(
        "SELECT COUNT(DISTINCT organization) FROM ai_models WHERE organization IS NOT NULL",
    )?;
    log::info!("✓ {} unique organizations", organization_count);

    let frontier_count = count("SELECT COUNT(*) FROM ai_models WHERE frontier_model = 1")?;
    log::info!("✓ {} frontier models", frontier_count);

    Ok(Some(IntegrityReport {
        empty_model_names,
        dated_rows,
        parameter_range,
        organization_count,
        frontier_count,
    }))
}
