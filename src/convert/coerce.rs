//! Cell value coercion into SQL literals
//!
//! The source spreadsheet is dirty, so every function here is total: a value
//! that cannot be interpreted for the target kind becomes `NULL` instead of an
//! error. A cell is passed as `Option<&str>` where `None` means the row had no
//! such column at all.

use crate::storage::schema::ColumnKind;
use chrono::NaiveDate;

/// SQL NULL keyword
pub const NULL: &str = "NULL";

/// Cell values treated as missing data, compared after trimming
pub const MISSING_SENTINELS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["true", "1", "yes", "t"];
const FALSE_VALUES: &[&str] = &["false", "0", "no", "f"];

/// How numeric cells are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericMode {
    /// Whole numbers print without a fractional part
    Integer,
    /// Always print a decimal representation
    Decimal,
}

/// Whether a cell counts as missing data
pub fn is_missing(raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some(value) => {
            let trimmed = value.trim();
            trimmed.is_empty() || MISSING_SENTINELS.contains(&trimmed)
        }
    }
}

/// Quote a text cell, doubling embedded single quotes
pub fn sql_string(raw: Option<&str>) -> String {
    match raw {
        Some(value) if !is_missing(raw) => format!("'{}'", value.replace('\'', "''")),
        _ => NULL.to_string(),
    }
}

/// Render a numeric cell.
///
/// Plain and scientific notation (`1.5e+10`, `3E-4`) both parse as floating
/// point. Non-numeric text and non-finite values become `NULL`.
pub fn sql_number(raw: Option<&str>, mode: NumericMode) -> String {
    let Some(value) = raw.filter(|_| !is_missing(raw)) else {
        return NULL.to_string();
    };

    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => match mode {
            NumericMode::Integer => format_integer(number),
            NumericMode::Decimal => format_decimal(number),
        },
        _ => NULL.to_string(),
    }
}

/// Largest magnitude below which every integral f64 maps to an exact i64
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

fn format_integer(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < EXACT_INTEGER_LIMIT {
        format!("{}", number as i64)
    } else {
        format_decimal(number)
    }
}

fn format_decimal(number: f64) -> String {
    let magnitude = number.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        format!("{:e}", number)
    } else if number.fract() == 0.0 {
        format!("{:.1}", number)
    } else {
        number.to_string()
    }
}

/// Quote a `YYYY-MM-DD` date cell; anything else becomes `NULL`
pub fn sql_date(raw: Option<&str>) -> String {
    let Some(value) = raw.filter(|_| !is_missing(raw)) else {
        return NULL.to_string();
    };

    let value = value.trim();
    if has_iso_date_shape(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        format!("'{}'", value)
    } else {
        NULL.to_string()
    }
}

fn has_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Map loosely spelled flags onto `TRUE` / `FALSE`
pub fn sql_boolean(raw: Option<&str>) -> String {
    let Some(value) = raw.filter(|_| !is_missing(raw)) else {
        return NULL.to_string();
    };

    let value = value.trim().to_lowercase();
    if TRUE_VALUES.contains(&value.as_str()) {
        "TRUE".to_string()
    } else if FALSE_VALUES.contains(&value.as_str()) {
        "FALSE".to_string()
    } else {
        NULL.to_string()
    }
}

/// Coerce a cell for a column of the given kind
pub fn coerce(raw: Option<&str>, kind: ColumnKind) -> String {
    match kind {
        ColumnKind::Varchar(_) | ColumnKind::Text => sql_string(raw),
        ColumnKind::BigInt => sql_number(raw, NumericMode::Integer),
        ColumnKind::Decimal(_, _) => sql_number(raw, NumericMode::Decimal),
        ColumnKind::Date => sql_date(raw),
        ColumnKind::Boolean => sql_boolean(raw),
    }
}
