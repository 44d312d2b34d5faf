//! In-memory table and procedure store for one interpreter session.
//!
//! The [`Store`] is the central repository of everything a CQL session has
//! named: imported and derived tables, and stored procedure bodies. It is
//! created empty at session start, mutated only by the evaluator, and
//! dropped with the session; there is no persistence beyond explicit
//! `EXPORT` statements.
//!
//! # Key types
//!
//! - [`Record`]: one row, a column-name → string mapping whose key insertion
//!   order is preserved (it drives display and export headers).
//! - [`Table`]: an ordered sequence of records. Records in one table should
//!   share a key set, but the store does not enforce it; missing keys simply
//!   read as absent.
//! - [`Store`]: the two name → value maps. Names are unique and last write
//!   wins.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::lang::ast::Statement;

/// One row: column name to string value, in insertion order.
pub type Record = IndexMap<String, String>;

/// An ordered sequence of records.
pub type Table = Vec<Record>;

/// Session-scoped storage for named tables and procedures.
#[derive(Debug, Default)]
pub struct Store {
    tables: HashMap<String, Table>,
    procedures: HashMap<String, Vec<Statement>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Store::default()
    }

    /// Store a table under `name`, overwriting any previous table of that
    /// name.
    pub fn store_table(&mut self, name: impl Into<String>, rows: Table) {
        self.tables.insert(name.into(), rows);
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Remove a table. Returns whether it existed.
    pub fn discard_table(&mut self, name: &str) -> bool {
        self.tables.remove(name).is_some()
    }

    /// Move a table from `old` to `new`. Returns whether `old` existed; a
    /// table already stored under `new` is silently overwritten.
    pub fn rename_table(&mut self, old: &str, new: &str) -> bool {
        match self.tables.remove(old) {
            Some(rows) => {
                self.tables.insert(new.to_string(), rows);
                true
            }
            None => false,
        }
    }

    /// Names of all stored tables, sorted for stable listings.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Store a procedure body under `name`, overwriting any previous one.
    pub fn store_procedure(&mut self, name: impl Into<String>, statements: Vec<Statement>) {
        self.procedures.insert(name.into(), statements);
    }

    /// Look up a procedure body by name.
    pub fn procedure(&self, name: &str) -> Option<&[Statement]> {
        self.procedures.get(name).map(Vec::as_slice)
    }
}
