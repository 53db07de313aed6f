//! CsvConverter - CSV to SQL insert file conversion
//!
//! Reads the whole dataset first so the generated header can carry the record
//! count, then writes one `INSERT` statement per line. A record that cannot be
//! decoded is logged and skipped; it never aborts the batch.

use crate::config::Config;
use crate::convert::RecordAssembler;
use crate::error::{InsightsError, Result};
use crate::utils;
use csv::{ByteRecord, StringRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

const PROGRESS_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} records";

/// A record that was skipped during conversion
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    /// 1-based data row number
    pub row: usize,
    /// Model name of the record, or `Unknown`
    pub model: String,
    pub reason: String,
}

/// Outcome of one conversion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    /// Records read from the CSV
    pub total_records: usize,
    /// Statements written to the output
    pub written: usize,
    pub failures: Vec<RecordFailure>,
}

impl ConversionReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Converts the model dataset CSV into an insert file
pub struct CsvConverter {
    config: Config,
}

impl CsvConverter {
    /// Create a converter with optional configuration
    pub fn new(config: Option<Config>) -> Self {
        Self {
            config: config.unwrap_or_default(),
        }
    }

    /// Convert `input` into an insert file at `output`
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<ConversionReport> {
        let input = input.as_ref();
        let output = output.as_ref();

        log::info!("Reading CSV file: {}", input.display());
        let reader = File::open(input).map_err(|e| {
            InsightsError::Csv(format!("Could not open {}: {}", input.display(), e))
        })?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::ensure_directory(parent)?;
        }
        let writer = File::create(output).map_err(|e| {
            InsightsError::Conversion(format!("Could not create {}: {}", output.display(), e))
        })?;

        let source_name = input
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| input.display().to_string());

        let report = self.convert(&source_name, reader, BufWriter::new(writer))?;
        log::info!("SQL INSERT statements written to: {}", output.display());
        Ok(report)
    }

    /// Convert CSV from any reader into insert statements on any writer
    pub fn convert<R: Read, W: Write>(
        &self,
        source_name: &str,
        input: R,
        mut output: W,
    ) -> Result<ConversionReport> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|e| InsightsError::Csv(format!("Failed to read CSV header: {}", e)))?
            .clone();
        let assembler = RecordAssembler::new(&headers);

        let mut records: Vec<(usize, ByteRecord)> = Vec::new();
        let mut failures = Vec::new();
        for (index, result) in reader.byte_records().enumerate() {
            match result {
                Ok(record) => records.push((index + 1, record)),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    log::error!("Error reading row {}: {}", index + 1, e);
                    failures.push(RecordFailure {
                        row: index + 1,
                        model: "Unknown".to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let total_records = records.len() + failures.len();
        log::info!("Successfully loaded {} records from CSV", total_records);
        log::info!("Converting to SQL INSERT statements...");

        writeln!(output, "-- AI Models Data Import")?;
        writeln!(output, "-- Generated INSERT statements from {}", source_name)?;
        writeln!(output, "-- Total records: {}", total_records)?;
        writeln!(output, "-- Generated on: {}", utils::get_timestamp())?;
        writeln!(output)?;

        let progress = self.progress_bar(total_records as u64);
        let mut written = 0;

        for (processed, (row, record)) in records.into_iter().enumerate() {
            match StringRecord::from_byte_record(record) {
                Ok(record) => {
                    writeln!(output, "{}", assembler.insert_statement(&record))?;
                    written += 1;
                }
                Err(e) => {
                    let reason = e.utf8_error().to_string();
                    let record = e.into_byte_record();
                    let model = assembler
                        .model_position()
                        .and_then(|p| record.get(p))
                        .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                        .unwrap_or_else(|| "Unknown".to_string());

                    log::error!("Error processing row {}: {}", row, reason);
                    log::error!("Row data: {}", model);
                    failures.push(RecordFailure { row, model, reason });
                }
            }

            progress.inc(1);
            if (processed + 1) % self.config.progress_interval.max(1) == 0 {
                log::info!("Processed {} records...", processed + 1);
            }
        }
        progress.finish_and_clear();

        writeln!(output)?;
        writeln!(output, "-- End of INSERT statements")?;
        output.flush()?;

        failures.sort_by_key(|f| f.row);
        log::info!(
            "Conversion completed: {} of {} records written",
            written,
            total_records
        );

        Ok(ConversionReport {
            total_records,
            written,
            failures,
        })
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
