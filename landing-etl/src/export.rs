//! Reading launch batches and writing tables (CSV / JSON)
//!
//! CSV follows RFC 4180 quoting: a field containing the separator, a quote,
//! CR or LF is wrapped in quotes with inner quotes doubled. Output files get
//! their parent directories created on demand.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::EtlResult;
use crate::models::{parse_launch_batch_str, CleanedFlightRecord, RawFlightRecord, COLUMNS};

/// Output format for cleaned tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single delimited row to any writer
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S], sep: char) -> io::Result<()> {
    w.write_all(format_row(row, sep).as_bytes())
}

/// Write header plus rows as CSV to any writer
pub fn write_csv<W: Write, H: AsRef<str>>(
    mut w: W,
    header: &[H],
    rows: &[Vec<String>],
) -> io::Result<()> {
    write_row(&mut w, header, ',')?;
    for row in rows {
        write_row(&mut w, row, ',')?;
    }
    Ok(())
}

/// One delimited row as text, newline included
pub fn format_row<S: AsRef<str>>(row: &[S], sep: char) -> String {
    let mut line = String::new();
    for (i, cell) in row.iter().enumerate() {
        let cell = cell.as_ref();
        if i > 0 {
            line.push(sep);
        }
        if needs_quotes(cell, sep) {
            line.push('"');
            line.push_str(&cell.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(cell);
        }
    }
    line.push('\n');
    line
}

/// Cleaned records as CSV text, header first
pub fn cleaned_to_csv_string(records: &[CleanedFlightRecord]) -> String {
    let mut text = format_row(&COLUMNS, ',');
    for record in records {
        text.push_str(&format_row(&record.to_row(), ','));
    }
    text
}

/// Create the parent directory of `path` if it has one
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write any header + rows table as a CSV file
pub fn write_table<H: AsRef<str>>(
    path: &Path,
    header: &[H],
    rows: &[Vec<String>],
) -> EtlResult<()> {
    ensure_parent_dir(path)?;
    let mut out = BufWriter::new(fs::File::create(path)?);
    write_csv(&mut out, header, rows)?;
    out.flush()?;
    Ok(())
}

/// Write cleaned records in the requested format
pub fn write_cleaned(
    path: &Path,
    records: &[CleanedFlightRecord],
    format: ExportFormat,
) -> EtlResult<()> {
    match format {
        ExportFormat::Csv => {
            let rows: Vec<Vec<String>> = records.iter().map(CleanedFlightRecord::to_row).collect();
            write_table(path, &COLUMNS, &rows)?;
        }
        ExportFormat::Json => {
            ensure_parent_dir(path)?;
            let out = BufWriter::new(fs::File::create(path)?);
            serde_json::to_writer_pretty(out, records)?;
        }
    }
    tracing::info!(path = %path.display(), rows = records.len(), "Wrote cleaned launches");
    Ok(())
}

/// Save raw launches exactly as fetched, pretty-printed
pub fn write_raw_launches(path: &Path, launches: &[serde_json::Value]) -> EtlResult<()> {
    ensure_parent_dir(path)?;
    let out = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(out, launches)?;
    tracing::info!(path = %path.display(), launches = launches.len(), "Saved raw launches");
    Ok(())
}

/// Read a saved launch batch
pub fn read_launch_file(path: &Path) -> EtlResult<Vec<RawFlightRecord>> {
    let text = fs::read_to_string(path)?;
    parse_launch_batch_str(&text)
}
