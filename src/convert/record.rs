//! Record-to-statement assembly

use crate::convert::coerce::coerce;
use crate::storage::schema::{COLUMNS, TABLE_NAME};
use csv::StringRecord;

/// Maps CSV rows onto `INSERT` statements in table column order
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    /// CSV field position for each entry of [`COLUMNS`]
    positions: Vec<Option<usize>>,
    model_position: Option<usize>,
}

impl RecordAssembler {
    /// Resolve the CSV header row against the schema descriptor
    pub fn new(headers: &StringRecord) -> Self {
        let find = |header: &str| headers.iter().position(|h| h.trim() == header);

        let positions: Vec<Option<usize>> = COLUMNS.iter().map(|c| find(c.header)).collect();

        for (column, position) in COLUMNS.iter().zip(&positions) {
            if position.is_none() {
                log::warn!(
                    "CSV has no '{}' column; {} will be NULL for every record",
                    column.header,
                    column.name
                );
            }
        }

        Self {
            model_position: find("Model"),
            positions,
        }
    }

    /// Descriptor columns the CSV header does not provide
    pub fn missing_columns(&self) -> Vec<&'static str> {
        COLUMNS
            .iter()
            .zip(&self.positions)
            .filter(|(_, position)| position.is_none())
            .map(|(column, _)| column.header)
            .collect()
    }

    /// Coerced literals for one record, in table column order
    pub fn values(&self, record: &StringRecord) -> Vec<String> {
        COLUMNS
            .iter()
            .zip(&self.positions)
            .map(|(column, position)| {
                let raw = position.and_then(|p| record.get(p));
                coerce(raw, column.kind)
            })
            .collect()
    }

    /// `INSERT INTO ai_models VALUES (...);` for one record
    pub fn insert_statement(&self, record: &StringRecord) -> String {
        format!(
            "INSERT INTO {} VALUES ({});",
            TABLE_NAME,
            self.values(record).join(", ")
        )
    }

    /// The record's model name, used to identify it in logs
    pub fn model_name<'r>(&self, record: &'r StringRecord) -> Option<&'r str> {
        self.model_position.and_then(|p| record.get(p))
    }

    /// CSV position of the model name column
    pub fn model_position(&self) -> Option<usize> {
        self.model_position
    }
}
