//! Record output
//!
//! Writes an [`ExtractionRecord`] as a CSV row (optionally preceded by
//! the header) or as one JSON line.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;

use dancerank_core::{ExtractionRecord, OutputFormat, Result, CSV_HEADER};

/// Whether the header row is written before the data row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// New output: header followed by the data row
    Create,
    /// Existing output: data row only
    Append,
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, ",")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Write a record as CSV
pub fn write_csv<W: Write>(mut w: W, record: &ExtractionRecord, mode: WriteMode) -> io::Result<()> {
    if mode == WriteMode::Create {
        write_row(&mut w, &CSV_HEADER)?;
    }
    write_row(&mut w, &record.cells())
}

/// Write a record as one JSON line
pub fn write_json<W: Write>(mut w: W, record: &ExtractionRecord) -> Result<()> {
    serde_json::to_writer(&mut w, record).context("failed to serialize record")?;
    writeln!(w)?;
    Ok(())
}

/// Write a record to a stream (header included for CSV)
pub fn write_to_stream<W: Write>(w: W, record: &ExtractionRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(w, record, WriteMode::Create)?,
        OutputFormat::Json => write_json(w, record)?,
    }
    Ok(())
}

/// Write a record to a file, appending when the file already exists
pub fn write_to_path(
    path: impl AsRef<Path>,
    record: &ExtractionRecord,
    format: OutputFormat,
) -> Result<WriteMode> {
    let path = path.as_ref();
    let mode = if path.is_file() {
        WriteMode::Append
    } else {
        WriteMode::Create
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut w = io::BufWriter::new(file);

    match format {
        OutputFormat::Csv => write_csv(&mut w, record, mode)?,
        OutputFormat::Json => write_json(&mut w, record)?,
    }
    w.flush()?;

    tracing::info!(path = %path.display(), ?mode, "Record written");
    Ok(mode)
}
