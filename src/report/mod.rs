//! Plain-text rendering of query results.
//!
//! One fixed report shape is used everywhere a table reaches the console:
//! a title, a dash rule sized to the header, a ` | `-joined header row taken
//! from the first record's key order, one line per record, a closing rule,
//! and a row count. An empty result collapses to a single "no results" line.

use std::io::{self, Write};

use crate::store::Record;

/// Write a table report to `out`.
pub fn write_report<W: Write>(out: &mut W, title: &str, rows: &[Record]) -> io::Result<()> {
    let Some(first) = rows.first() else {
        return writeln!(out, "{title}: no results.");
    };

    let columns: Vec<&str> = first.keys().map(String::as_str).collect();
    let header = columns.join(" | ");
    let rule = "-".repeat(header.len());

    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "{header}")?;
    writeln!(out, "{rule}")?;
    for row in rows {
        let values: Vec<&str> = columns
            .iter()
            .map(|c| row.get(*c).map_or("", String::as_str))
            .collect();
        writeln!(out, "{}", values.join(" | "))?;
    }
    writeln!(out, "{rule}")?;
    writeln!(out, "Total: {} rows", rows.len())?;
    writeln!(out)
}
