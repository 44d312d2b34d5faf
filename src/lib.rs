//! # CQL
//!
//! An interpreter for CQL, a small table-oriented query language over CSV
//! data. Scripts import CSV files into named in-memory tables, then filter,
//! project, join, copy, rename, print, and re-export them; statement blocks
//! can be stored as named procedures and replayed with `CALL`.
//!
//! ```text
//! IMPORT TABLE readings FROM "readings.csv";
//! CREATE TABLE hot SELECT id, temp FROM readings WHERE temp > 30 LIMIT 10;
//! EXPORT TABLE hot AS "hot.csv";
//! ```
//!
//! The library is the whole engine: lexer, recursive-descent parser, and a
//! tree-walking evaluator over a session-scoped [`Store`]. The [`Interpreter`]
//! handle ties them together:
//!
//! ```
//! use cql::Interpreter;
//!
//! let mut interpreter = Interpreter::new();
//! let mut out = Vec::new();
//! interpreter.run_with_output("PRINT TABLE people;", &mut out)?;
//! assert_eq!(out, b"Table: people: no results.\n");
//! # Ok::<(), cql::CqlError>(())
//! ```

pub mod error;
pub mod eval;
pub mod files;
pub mod lang;
pub mod report;
pub mod store;
pub mod types;

pub use error::{CqlError, Result};
pub use store::{Record, Store, Table};
pub use types::Value;

use std::io::{self, Write};

use files::Paths;
use lang::ast::Statement;
use lang::parser::Parser;

/// One interpreter session: a table/procedure store plus the directories
/// bare filenames resolve against. The store lives exactly as long as the
/// session; nothing persists except explicit exports.
pub struct Interpreter {
    store: Store,
    paths: Paths,
}

impl Interpreter {
    /// Create a session with the default data and output directories.
    pub fn new() -> Self {
        Interpreter::with_paths(Paths::default())
    }

    /// Create a session with explicit directories.
    pub fn with_paths(paths: Paths) -> Self {
        Interpreter {
            store: Store::new(),
            paths,
        }
    }

    /// Parse and execute a source text as one program, writing results to
    /// stdout.
    pub fn run(&mut self, source: &str) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(source, &mut out)
    }

    /// Parse and execute a source text as one program, writing results to
    /// `out`.
    pub fn run_with_output<W: Write>(&mut self, source: &str, out: &mut W) -> Result<()> {
        let program = Parser::parse(source)?;
        eval::execute_program(&program, &mut self.store, &self.paths, out)
    }

    /// Execute one already-built statement. Used where a statement is
    /// synthesized rather than parsed, e.g. the CLI's CSV auto-import.
    pub fn run_statement<W: Write>(&mut self, statement: &Statement, out: &mut W) -> Result<()> {
        eval::execute_statement(statement, &mut self.store, &self.paths, out)
    }

    /// The session's store.
    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}
