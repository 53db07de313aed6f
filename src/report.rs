//! Plain-text rendering of query results

use crate::api::catalog::ResultRow;
use crate::utils::format_thousands;
use serde_json::Value;
use std::io::{self, Write};

/// Rows printed per table before truncation
pub const MAX_ROWS: usize = 20;

/// Longest cell text before it is cut with an ellipsis
const MAX_CELL_CHARS: usize = 60;

fn is_amount_column(column: &str) -> bool {
    let column = column.to_lowercase();
    column.contains("parameters") || column.contains("cost")
}

/// Display text for one cell
pub fn format_cell(column: &str, value: &Value) -> String {
    let text = match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) if is_amount_column(column) => {
            n.as_f64().map(format_thousands).unwrap_or_else(|| n.to_string())
        }
        other => other.to_string(),
    };

    let text = text.replace(['\n', '\r'], " ");
    if text.chars().count() > MAX_CELL_CHARS {
        let head: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        text
    }
}

/// Write a titled, column-aligned table of `rows`
pub fn render_table<W: Write>(out: &mut W, title: &str, rows: &[ResultRow]) -> io::Result<()> {
    let Some(first) = rows.first() else {
        writeln!(out)?;
        writeln!(out, "{}: No results found", title)?;
        return Ok(());
    };

    writeln!(out)?;
    writeln!(out, "{}:", title)?;
    writeln!(out, "{}", "=".repeat(title.chars().count()))?;

    let columns: Vec<&str> = first.columns().collect();
    let shown = &rows[..rows.len().min(MAX_ROWS)];
    let cells: Vec<Vec<String>> = shown
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| format_cell(column, row.get(column).unwrap_or(&Value::Null)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:>width$}", value, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    writeln!(out, "{}", line(columns.clone()))?;
    for row in &cells {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    if rows.len() > MAX_ROWS {
        writeln!(out, "... ({} more rows)", rows.len() - MAX_ROWS)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(model: &str, parameters: Value) -> ResultRow {
        vec![
            ("model".to_string(), Value::from(model)),
            ("parameters".to_string(), parameters),
        ]
        .into_iter()
        .collect()
    }

    fn render(title: &str, rows: &[ResultRow]) -> String {
        let mut out = Vec::new();
        render_table(&mut out, title, rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(render("Largest Models", &[]), "\nLargest Models: No results found\n");
    }

    #[test]
    fn test_table_layout() {
        let rows = vec![
            row("GPT-3", Value::from(175000000000_i64)),
            row("BERT", Value::Null),
        ];
        let text = render("Largest", &rows);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "Largest:");
        assert_eq!(lines[2], "=======");
        assert_eq!(lines[3], format!("model{}parameters", " ".repeat(7)));
        assert!(lines[4].ends_with("175,000,000,000"));
        assert!(lines[5].ends_with("None"));
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(
            format_cell("training_compute_cost_usd", &Value::from(4300000.5)),
            "4,300,000.5"
        );
        assert_eq!(format_cell("model_count", &Value::from(1234)), "1234");
        assert_eq!(format_cell("abstract", &Value::from("a\nb")), "a b");
        let long = format_cell("abstract", &Value::from("x".repeat(100)));
        assert_eq!(long.chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn test_truncates_long_results() {
        let rows: Vec<ResultRow> = (0..25)
            .map(|i| row(&format!("m{}", i), Value::from(i)))
            .collect();
        let text = render("Many", &rows);
        assert!(text.ends_with("... (5 more rows)\n"));
    }
}
