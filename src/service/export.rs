//! Tabular output of earnings records and flattened payloads.

use std::io::Write;

use serde_json::Value;
use thiserror::Error;

use crate::models::{EarningsRecord, FlattenedRecord};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// One row per earnings record, columns named as on the calendar page.
pub fn write_records<W: Write>(
    writer: W,
    records: &[EarningsRecord],
    format: ExportFormat,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            for record in records {
                wtr.serialize(record)?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => write_json(writer, &records)?,
    }
    Ok(())
}

/// One row per flattened record. The header is the union of all keys in
/// first-seen order; keys missing from a row leave the cell empty.
pub fn write_flattened<W: Write>(
    writer: W,
    rows: &[FlattenedRecord],
    format: ExportFormat,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut header: Vec<&str> = Vec::new();
            for row in rows {
                for key in row.keys() {
                    if !header.contains(&key) {
                        header.push(key);
                    }
                }
            }

            let mut wtr = csv::Writer::from_writer(writer);
            if !header.is_empty() {
                wtr.write_record(&header)?;
            }
            for row in rows {
                let cells = header
                    .iter()
                    .map(|key| row.get(key).map(cell).unwrap_or_default());
                wtr.write_record(cells)?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => write_json(writer, &rows)?,
    }
    Ok(())
}

/// Two-column `key,value` listing of a single flattened record.
pub fn write_key_values<W: Write>(
    writer: W,
    record: &FlattenedRecord,
    format: ExportFormat,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            wtr.write_record(["key", "value"])?;
            for (key, value) in record {
                wtr.write_record([key.as_str(), cell(value).as_str()])?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => write_json(writer, record)?,
    }
    Ok(())
}

fn write_json<W: Write, T: serde::Serialize + ?Sized>(
    mut writer: W,
    value: &T,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
