use std::fs::{self, File, OpenOptions};
use std::path::Path;

use csv::StringRecord;

use crate::error::LedgerResult;

/// Data rows of a ledger file; a missing file reads as empty.
pub(crate) fn read_rows(path: &Path) -> LedgerResult<Vec<StringRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        rows.push(result?);
    }
    Ok(rows)
}

fn ensure_parent(path: &Path) -> LedgerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Append one row, writing the header first when the file is new or empty.
pub(crate) fn append_row(path: &Path, header: &[&str], row: &[String]) -> LedgerResult<()> {
    ensure_parent(path)?;
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if needs_header {
        writer.write_record(header)?;
    }
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}

/// Replace the whole file with `header` followed by `rows`.
pub(crate) fn rewrite(path: &Path, header: &[&str], rows: &[Vec<String>]) -> LedgerResult<()> {
    ensure_parent(path)?;
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}

pub(crate) fn optional_text(record: &StringRecord, index: usize) -> Option<String> {
    Some(field(record, index)).filter(|s| !s.is_empty()).map(str::to_string)
}

pub(crate) fn optional_number(record: &StringRecord, index: usize) -> Option<f64> {
    field(record, index).parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
