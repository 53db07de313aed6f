//! Utility functions for ai-insights
//!
//! This module provides file discovery and formatting helpers used throughout
//! the project.

use crate::error::{InsightsError, Result};
use std::path::{Path, PathBuf};

/// Suffix that marks generated data files
pub const INSERT_FILE_SUFFIX: &str = "_insert.sql";

/// Get file extension from path
pub fn get_file_extension<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file is a SQL script
pub fn is_sql_file<P: AsRef<Path>>(path: P) -> bool {
    matches!(get_file_extension(path).as_deref(), Some("sql"))
}

/// Check if a SQL script holds generated insert statements
pub fn is_insert_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(INSERT_FILE_SUFFIX))
}

/// Recursively collect SQL files under `data_dir`.
///
/// Returns `(schema_files, insert_files)`, each sorted by path.
pub fn find_sql_files<P: AsRef<Path>>(data_dir: P) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut schema_files = Vec::new();
    let mut insert_files = Vec::new();

    let mut pending = vec![data_dir.as_ref().to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| {
            InsightsError::Storage(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_sql_file(&path) {
                if is_insert_file(&path) {
                    insert_files.push(path);
                } else {
                    schema_files.push(path);
                }
            }
        }
    }

    schema_files.sort();
    insert_files.sort();
    Ok((schema_files, insert_files))
}

/// Create directory if it doesn't exist
pub fn ensure_directory<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if !path.exists() {
        std::fs::create_dir_all(path).map_err(InsightsError::Io)?;
    }

    Ok(())
}

/// Local time as `YYYY-MM-DD HH:MM:SS`
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Insert thousands separators into the integral part of a number
pub fn format_thousands(value: f64) -> String {
    let formatted = if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    };

    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (integral, fraction) = match unsigned.split_once('.') {
        Some((integral, fraction)) => (integral, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integral.len() + integral.len() / 3);
    for (i, digit) in integral.chars().enumerate() {
        if i > 0 && (integral.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

/// First `max_chars` characters of a statement, for log lines
pub fn preview(statement: &str, max_chars: usize) -> String {
    let mut chars = statement.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_extension() {
        assert_eq!(get_file_extension("schema.sql"), Some("sql".to_string()));
        assert_eq!(get_file_extension("SCHEMA.SQL"), Some("sql".to_string()));
        assert_eq!(get_file_extension("README"), None);
    }

    #[test]
    fn test_insert_file_detection() {
        assert!(is_insert_file("data/models/notable_ai_models_insert.sql"));
        assert!(!is_insert_file("data/models/ai_models.sql"));
        assert!(!is_insert_file("data/models/insert.sql"));
        assert!(is_sql_file("a.sql"));
        assert!(!is_sql_file("a.csv"));
    }

    #[test]
    fn test_find_sql_files() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("models");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("b.sql"), "").unwrap();
        std::fs::write(nested.join("a.sql"), "").unwrap();
        std::fs::write(nested.join("a_insert.sql"), "").unwrap();
        std::fs::write(nested.join("notes.txt"), "").unwrap();

        let (schema, inserts) = find_sql_files(dir.path()).unwrap();
        assert_eq!(schema, vec![dir.path().join("b.sql"), nested.join("a.sql")]);
        assert_eq!(inserts, vec![nested.join("a_insert.sql")]);
    }

    #[test]
    fn test_find_sql_files_missing_dir() {
        assert!(find_sql_files("/nonexistent/data").is_err());
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(175000000000.0), "175,000,000,000");
        assert_eq!(format_thousands(-1234567.0), "-1,234,567");
        assert_eq!(format_thousands(12345.5), "12,345.5");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("SELECT 1", 100), "SELECT 1");
        assert_eq!(preview("abcdef", 3), "abc...");
    }

    #[test]
    fn test_timestamp() {
        let timestamp = get_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
