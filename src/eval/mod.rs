//! Tree-walking evaluator for CQL.
//!
//! Executes parsed statements against a [`Store`], writing observable
//! results (reports and status lines) to a caller-supplied writer so the
//! REPL, the batch runner, and the tests all share one code path.
//!
//! Failure philosophy: referencing an absent table or procedure is never an
//! error (it reads as empty or a no-op), and CSV trouble degrades to empty
//! data with a logged diagnostic. The only hard failures out of this module
//! are write errors on the output stream itself.

use std::io::Write;

use tracing::warn;

use crate::error::Result;
use crate::files::{self, Paths};
use crate::lang::ast::*;
use crate::report;
use crate::store::{Record, Store, Table};
use crate::types::{self, Value};

/// Execute every statement of a program in order.
pub fn execute_program<W: Write>(
    program: &Program,
    store: &mut Store,
    paths: &Paths,
    out: &mut W,
) -> Result<()> {
    for statement in &program.statements {
        execute_statement(statement, store, paths, out)?;
    }
    Ok(())
}

/// Execute a single statement.
pub fn execute_statement<W: Write>(
    statement: &Statement,
    store: &mut Store,
    paths: &Paths,
    out: &mut W,
) -> Result<()> {
    match statement {
        Statement::Import(import) => {
            let rows = files::load_csv(&import.filename, &paths.data_dir);
            let count = rows.len();
            store.store_table(&import.name, rows);
            writeln!(out, "Table '{}' imported ({count} rows).", import.name)?;
        }

        Statement::Export(export) => {
            let rows = table_or_empty(store, &export.name);
            if rows.is_empty() {
                writeln!(out, "Table '{}': nothing to save.", export.name)?;
            } else {
                match files::save_csv(&export.filename, rows, &paths.output_dir) {
                    Ok(()) => writeln!(
                        out,
                        "Table '{}' exported to '{}'.",
                        export.name, export.filename
                    )?,
                    Err(err) => {
                        warn!(table = %export.name, file = %export.filename, %err,
                              "export failed");
                    }
                }
            }
        }

        Statement::Discard(discard) => {
            if store.discard_table(&discard.name) {
                writeln!(out, "Table '{}' discarded.", discard.name)?;
            } else {
                writeln!(out, "Table '{}' not found.", discard.name)?;
            }
        }

        Statement::Rename(rename) => {
            if store.rename_table(&rename.old, &rename.new) {
                writeln!(out, "Table '{}' renamed to '{}'.", rename.old, rename.new)?;
            } else {
                writeln!(out, "Rename failed: no table '{}'.", rename.old)?;
            }
        }

        Statement::Print(print) => {
            let rows = table_or_empty(store, &print.name);
            report::write_report(out, &format!("Table: {}", print.name), rows)?;
        }

        Statement::Select(select) => {
            execute_select(select, store, out)?;
        }

        Statement::CreateTable(create) => {
            let rows = match &create.source {
                TableSource::Select(select) => execute_select(select, store, out)?,
                TableSource::Join(join) => {
                    let left = table_or_empty(store, &join.left);
                    let right = table_or_empty(store, &join.right);
                    join_tables(left, right, &join.column)
                }
                // Rows are copied now; mutating the source later leaves the
                // new table untouched.
                TableSource::Table(name) => store.table(name).cloned().unwrap_or_default(),
            };
            let count = rows.len();
            store.store_table(&create.name, rows);
            writeln!(out, "Table '{}' created ({count} rows).", create.name)?;
        }

        Statement::Procedure(procedure) => {
            store.store_procedure(&procedure.name, procedure.statements.clone());
            writeln!(out, "Procedure '{}' stored.", procedure.name)?;
        }

        Statement::Call(call) => {
            // Absent procedure: a no-op, not an error. Procedures are named
            // macros with no scope of their own; the body is cloned out
            // first because executing it mutates the same store. A procedure
            // calling itself recurses here until the stack runs out.
            if let Some(body) = store.procedure(&call.name).map(<[Statement]>::to_vec) {
                for statement in &body {
                    execute_statement(statement, store, paths, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Run a select and return the resulting rows, for reuse by `CREATE TABLE`.
///
/// Filter, then project, then truncate, in that order, preserving the
/// source row order throughout. The report is rendered even when the rows
/// are only an intermediate for a create.
fn execute_select<W: Write>(select: &Select, store: &Store, out: &mut W) -> Result<Table> {
    let source = table_or_empty(store, &select.table);

    let mut rows: Table = source
        .iter()
        .filter(|row| {
            select
                .where_clause
                .as_ref()
                .map_or(true, |condition| check(row, condition))
        })
        .cloned()
        .collect();

    if let Columns::List(columns) = &select.columns {
        rows = rows.iter().map(|row| project(row, columns)).collect();
    }

    if let Some(limit) = &select.limit {
        rows.truncate(limit.count);
    }

    report::write_report(out, &format!("SELECT from '{}'", select.table), &rows)?;
    Ok(rows)
}

fn table_or_empty<'a>(store: &'a Store, name: &str) -> &'a [Record] {
    store.table(name).map(Vec::as_slice).unwrap_or(&[])
}

/// Keep only the requested columns. A requested column the row does not
/// have stays absent rather than becoming an empty value.
fn project(row: &Record, columns: &[String]) -> Record {
    let mut projected = Record::new();
    for column in columns {
        if let Some(value) = row.get(column) {
            projected.insert(column.clone(), value.clone());
        }
    }
    projected
}

/// Unindexed nested-loop equality join on one column.
///
/// String equality only; the right record's fields overlay the left's, so
/// right-side values win on shared keys while keeping the left's key
/// positions. Rows missing the join column on both sides compare equal and
/// pair up.
fn join_tables(left: &[Record], right: &[Record], column: &str) -> Table {
    let mut result = Vec::new();
    for l in left {
        for r in right {
            if l.get(column) == r.get(column) {
                let mut merged = l.clone();
                for (key, value) in r {
                    merged.insert(key.clone(), value.clone());
                }
                result.push(merged);
            }
        }
    }
    result
}

/// Evaluate a condition against one row.
fn check(row: &Record, condition: &Condition) -> bool {
    match condition {
        Condition::And { left, right } => check(row, left) && check(row, right),
        Condition::Compare { column, op, value } => {
            let cell = row.get(column).map(String::as_str);
            match op {
                CompareOp::Eq => cell.map_or(false, |c| value.loose_eq(c)),
                CompareOp::NotEq => !cell.map_or(false, |c| value.loose_eq(c)),
                CompareOp::Gt => compare_reals(cell, value, |l, r| l > r),
                CompareOp::Lt => compare_reals(cell, value, |l, r| l < r),
                CompareOp::GtEq => compare_reals(cell, value, |l, r| l >= r),
                CompareOp::LtEq => compare_reals(cell, value, |l, r| l <= r),
            }
        }
    }
}

/// Ordering needs both sides numeric; anything else is a non-match, not an
/// error.
fn compare_reals(cell: Option<&str>, value: &Value, cmp: fn(f64, f64) -> bool) -> bool {
    match (cell.and_then(types::parse_real), value.as_real()) {
        (Some(l), Some(r)) => cmp(l, r),
        _ => false,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
