//! CSV import and export for the evaluator.
//!
//! CQL data files are ordinary comma-separated files with two extra lexical
//! rules borrowed from the language itself: blank lines and lines opening
//! with either comment marker (`--` or `{-`) are skipped before parsing, and
//! the first remaining line is the header row.
//!
//! Read failures never abort evaluation; [`load_csv`] logs a diagnostic and
//! returns an empty table so the session continues.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::store::{Record, Table};

/// Default directory bare import filenames resolve against.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default directory bare export filenames resolve against.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// The two directories a session resolves bare filenames against.
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Resolve a filename against a default directory.
///
/// Only bare names are redirected: anything absolute, or already carrying a
/// directory component, is used as given.
fn resolve(filename: &str, default_dir: &Path) -> PathBuf {
    let path = Path::new(filename);
    let has_dir = path
        .parent()
        .map_or(false, |p| !p.as_os_str().is_empty());
    if path.is_absolute() || has_dir {
        path.to_path_buf()
    } else {
        default_dir.join(path)
    }
}

/// Load a CSV file into a table.
///
/// Any failure (missing file, unreadable bytes, malformed CSV) degrades to
/// an empty table with a logged warning.
pub fn load_csv(filename: &str, data_dir: &Path) -> Table {
    let path = resolve(filename, data_dir);
    match read_csv(&path) {
        Ok(rows) => rows,
        Err(err) => {
            warn!(file = %path.display(), %err, "failed to load CSV file");
            Vec::new()
        }
    }
}

fn read_csv(path: &Path) -> Result<Table> {
    let raw = fs::read_to_string(path)?;
    let filtered: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with("--") && !line.starts_with("{-")
        })
        .collect();
    let filtered = filtered.join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(filtered.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // Zip against the header row: extra fields are dropped, short rows
        // leave the trailing keys absent.
        let mut row = Record::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header.clone(), field.to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Write a table to a CSV file.
///
/// The header line comes from the first record's key order; records missing
/// a header key write an empty field. An empty table writes nothing.
pub fn save_csv(filename: &str, rows: &[Record], output_dir: &Path) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };

    let path = resolve(filename, output_dir);
    let mut writer = csv::Writer::from_path(&path)?;

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(
            headers
                .iter()
                .map(|h| row.get(*h).map_or("", String::as_str)),
        )?;
    }
    writer.flush()?;
    Ok(())
}
