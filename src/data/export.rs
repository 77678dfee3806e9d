use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{Datelike, NaiveTime};
use thiserror::Error;

use super::model::{CellValue, SourceTable};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("writing CSV")]
    Csv(#[from] csv::Error),
    #[error("creating export file")]
    Io(#[from] std::io::Error),
}

/// Write the source rows at `indices` as CSV, every loaded column included,
/// under the loaded header names. Returns the number of rows written.
pub fn write_csv<W: Write>(writer: W, table: &SourceTable, indices: &[usize]) -> Result<usize, ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&table.columns)?;

    let mut written = 0;
    for row in indices.iter().filter_map(|&i| table.rows.get(i)) {
        out.write_record(row.iter().map(export_text))?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Write the selected rows to a CSV file at `path`.
pub fn export_csv(path: &Path, table: &SourceTable, indices: &[usize]) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    write_csv(file, table, indices)
}

fn export_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::DateTime(dt) if dt.time() == NaiveTime::MIN => dt.date().format("%Y-%m-%d").to_string(),
        // Time-only spreadsheet cells sit on the 1899/1900 epoch.
        CellValue::DateTime(dt) if dt.year() < 1900 => dt.time().format("%H:%M:%S").to_string(),
        CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        other => other.to_string(),
    }
}
