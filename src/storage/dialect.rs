//! PostgreSQL to SQLite dialect translation
//!
//! This is a best-effort text rewrite, not a SQL parser. The rewrite rules skip
//! single-quoted string literals and `--` comments, so type names inside data or
//! comments are left alone. The final line cleanup is not literal-aware: every
//! line is trimmed and blank or `--` lines are dropped, including lines inside a
//! multi-line string literal. Syntax that the rules do not describe passes
//! through untranslated. [`DialectTranslator::unsupported_constructs`] reports
//! the common cases so callers can warn about them.

use crate::error::Result;
use regex::{Captures, Regex};

/// Matches a single-quoted SQL string literal, with `''` escapes
const LITERAL: &str = r"'(?:[^']|'')*'";

/// Matches a `--` comment up to the end of its line
const LINE_COMMENT: &str = r"--[^\n]*";

/// Rewrites PostgreSQL schema syntax into SQLite-compatible syntax
pub struct DialectTranslator {
    comment_on: Regex,
    decimal: Regex,
    varchar: Regex,
    bigint: Regex,
    boolean: Regex,
    opaque: Regex,
    unsupported: Vec<(&'static str, Regex)>,
}

impl DialectTranslator {
    /// Compile the rewrite rules
    pub fn new() -> Result<Self> {
        let rule =
            |pattern: &str| Regex::new(&format!("{}|{}|{}", LITERAL, LINE_COMMENT, pattern));

        let comment_on = rule(r"(?is)\bCOMMENT\s+ON\b(?:[^;']|'(?:[^']|'')*')*;")?;
        let decimal = rule(r"(?i)\b(?:DECIMAL|NUMERIC)\s*\(\s*\d+\s*(?:,\s*\d+\s*)?\)")?;
        let varchar = rule(r"(?i)\bVARCHAR\s*\(\s*\d+\s*\)")?;
        let bigint = rule(r"(?i)\bBIGINT\b")?;
        let boolean = rule(r"(?i)\bBOOLEAN\b")?;
        let opaque = Regex::new(&format!("{}|{}", LITERAL, LINE_COMMENT))?;

        let unsupported = vec![
            ("SERIAL column type", Regex::new(r"(?i)\b(?:SMALL|BIG)?SERIAL\b")?),
            ("JSONB column type", Regex::new(r"(?i)\bJSONB\b")?),
            ("'::' type cast", Regex::new(r"::\s*\w")?),
            (
                "time zone aware timestamp",
                Regex::new(r"(?i)\bTIMESTAMPTZ\b|\bTIMESTAMP\s+WITH\s+TIME\s+ZONE\b")?,
            ),
            ("CREATE EXTENSION", Regex::new(r"(?i)\bCREATE\s+EXTENSION\b")?),
            ("CREATE TYPE", Regex::new(r"(?i)\bCREATE\s+TYPE\b")?),
        ];

        Ok(Self {
            comment_on,
            decimal,
            varchar,
            bigint,
            boolean,
            opaque,
            unsupported,
        })
    }

    /// Translate a PostgreSQL script into SQLite syntax
    pub fn translate(&self, sql: &str) -> String {
        let sql = replace_outside_literals(&self.comment_on, sql, "");
        let sql = replace_outside_literals(&self.decimal, &sql, "REAL");
        let sql = replace_outside_literals(&self.varchar, &sql, "TEXT");
        let sql = replace_outside_literals(&self.bigint, &sql, "INTEGER");
        let sql = replace_outside_literals(&self.boolean, &sql, "INTEGER");

        sql.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// PostgreSQL-only constructs present in the script that no rule rewrites
    pub fn unsupported_constructs(&self, sql: &str) -> Vec<&'static str> {
        let code = self.opaque.replace_all(sql, |caps: &Captures| {
            if caps[0].starts_with('\'') {
                "''"
            } else {
                ""
            }
        });
        self.unsupported
            .iter()
            .filter(|(_, pattern)| pattern.is_match(&code))
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Replace matches of `pattern` that start outside string literals and comments.
/// `pattern` must list [`LITERAL`] and [`LINE_COMMENT`] as its first alternatives.
fn replace_outside_literals(pattern: &Regex, sql: &str, replacement: &str) -> String {
    pattern
        .replace_all(sql, |caps: &Captures| {
            let matched = &caps[0];
            if matched.starts_with('\'') || matched.starts_with("--") {
                matched.to_string()
            } else {
                replacement.to_string()
            }
        })
        .into_owned()
}

/// Split a script on `;` terminators that sit outside string literals and
/// `--` comments.
///
/// Pieces are trimmed, leading `--` comment lines are dropped, and empty pieces
/// are skipped.
pub fn split_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut in_literal = false;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_literal = !in_literal,
            b'-' if !in_literal && bytes.get(i + 1) == Some(&b'-') => {
                i = sql[i..].find('\n').map_or(bytes.len(), |end| i + end);
                continue;
            }
            b';' if !in_literal => {
                push_statement(&mut statements, &sql[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    push_statement(&mut statements, &sql[start..]);

    statements
}

fn push_statement<'a>(statements: &mut Vec<&'a str>, piece: &'a str) {
    let mut piece = piece.trim();
    while piece.starts_with("--") {
        piece = match piece.find('\n') {
            Some(end) => piece[end + 1..].trim(),
            None => "",
        };
    }
    if !piece.is_empty() {
        statements.push(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> DialectTranslator {
        DialectTranslator::new().unwrap()
    }

    #[test]
    fn test_type_rewrites() {
        let t = translator();
        assert_eq!(t.translate("name VARCHAR(255)"), "name TEXT");
        assert_eq!(t.translate("cost DECIMAL(10,2)"), "cost REAL");
        assert_eq!(t.translate("cost numeric(12, 4)"), "cost REAL");
        assert_eq!(t.translate("n BIGINT,"), "n INTEGER,");
        assert_eq!(t.translate("flag BOOLEAN"), "flag INTEGER");
    }

    #[test]
    fn test_comment_on_removed() {
        let t = translator();
        let sql = "CREATE TABLE x (a TEXT);\nCOMMENT ON COLUMN x IS 'desc';\n";
        assert_eq!(t.translate(sql), "CREATE TABLE x (a TEXT);");
    }

    #[test]
    fn test_comment_on_spans_lines_and_literals() {
        let t = translator();
        let sql = "COMMENT ON TABLE x IS\n  'has; a semicolon';\nCREATE TABLE y (b BIGINT);";
        assert_eq!(t.translate(sql), "CREATE TABLE y (b INTEGER);");
    }

    #[test]
    fn test_literals_untouched() {
        let t = translator();
        let sql = "INSERT INTO t VALUES ('BIGINT and VARCHAR(10)', 'O''Brien BOOLEAN');";
        assert_eq!(t.translate(sql), sql);

        let sql = "INSERT INTO t VALUES ('see COMMENT ON x;');";
        assert_eq!(t.translate(sql), sql);
    }

    #[test]
    fn test_blank_and_comment_lines_dropped() {
        let t = translator();
        let sql = "-- header\n\n   CREATE TABLE t (\n  a TEXT\n);\n   \n";
        assert_eq!(t.translate(sql), "CREATE TABLE t (\na TEXT\n);");
    }

    #[test]
    fn test_unsupported_constructs() {
        let t = translator();
        let found =
            t.unsupported_constructs("CREATE TABLE t (id SERIAL, data JSONB, at TIMESTAMPTZ);");
        assert_eq!(
            found,
            vec!["SERIAL column type", "JSONB column type", "time zone aware timestamp"]
        );

        assert!(t.unsupported_constructs("INSERT INTO t VALUES ('uses JSONB::text');").is_empty());
        assert_eq!(t.unsupported_constructs("SELECT '1'::int;"), vec!["'::' type cast"]);
    }

    #[test]
    fn test_split_statements() {
        let sql = "INSERT INTO t VALUES ('a;b');\n-- note\nINSERT INTO t VALUES ('it''s');;\n  ";
        assert_eq!(
            split_statements(sql),
            vec![
                "INSERT INTO t VALUES ('a;b')",
                "INSERT INTO t VALUES ('it''s')",
            ]
        );
    }

    #[test]
    fn test_apostrophe_in_comment_does_not_hide_rules() {
        let t = translator();
        let sql = "-- Create the model's table\n\
                   CREATE TABLE t (\n  a VARCHAR(255), -- the model's name\n  b BOOLEAN\n);\n\
                   -- Column descriptions\n\
                   COMMENT ON COLUMN t.a IS 'Name';\n";
        assert_eq!(
            t.translate(sql),
            "CREATE TABLE t (\na TEXT, -- the model's name\nb INTEGER\n);"
        );
    }

    #[test]
    fn test_unsupported_constructs_ignore_comments() {
        let t = translator();
        let sql = "-- switch id to SERIAL later\nCREATE TABLE t (id INTEGER);";
        assert!(t.unsupported_constructs(sql).is_empty());
    }

    #[test]
    fn test_split_ignores_quotes_in_trailing_comments() {
        let t = translator();
        let sql = t.translate(
            "CREATE TABLE a (x TEXT); -- the model's table\n\
             CREATE TABLE b (y TEXT);\n\
             CREATE TABLE c (z TEXT);",
        );
        assert_eq!(
            split_statements(&sql),
            vec![
                "CREATE TABLE a (x TEXT)",
                "CREATE TABLE b (y TEXT)",
                "CREATE TABLE c (z TEXT)",
            ]
        );

        // A `--` inside a literal is data, not a comment
        assert_eq!(
            split_statements("INSERT INTO t VALUES ('a -- b; c');SELECT 1"),
            vec!["INSERT INTO t VALUES ('a -- b; c')", "SELECT 1"]
        );
    }

    #[test]
    fn test_split_statements_skips_comment_only_pieces() {
        assert!(split_statements("-- only a comment").is_empty());
        assert_eq!(split_statements("SELECT 1"), vec!["SELECT 1"]);
    }
}
