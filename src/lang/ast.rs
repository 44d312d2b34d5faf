//! Abstract syntax tree definitions for CQL.
//!
//! Every CQL statement parsed by the [`super::parser::Parser`] is represented
//! as a tree of the types defined here. Nodes are immutable after
//! construction and owned exclusively by their parent; the evaluator walks
//! them with exhaustive matches.

use crate::types::Value;

/// A parsed source unit: an ordered sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A top-level CQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Import(ImportTable),
    Export(ExportTable),
    Discard(DiscardTable),
    Rename(RenameTable),
    Print(PrintTable),
    Select(Select),
    CreateTable(CreateTable),
    Procedure(Procedure),
    Call(CallProcedure),
}

/// `IMPORT TABLE <name> FROM <file>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportTable {
    pub name: String,
    pub filename: String,
}

/// `EXPORT TABLE <name> AS <file>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub name: String,
    pub filename: String,
}

/// `DISCARD TABLE <name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscardTable {
    pub name: String,
}

/// `RENAME TABLE <old> <new>`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameTable {
    pub old: String,
    pub new: String,
}

/// `PRINT TABLE <name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintTable {
    pub name: String,
}

/// A `SELECT` statement, also reused as a `CREATE TABLE` source.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub columns: Columns,
    pub table: String,
    pub where_clause: Option<Condition>,
    pub limit: Option<Limit>,
}

/// The projection of a `SELECT`: `*` or an explicit column list.
#[derive(Debug, Clone, PartialEq)]
pub enum Columns {
    All,
    List(Vec<String>),
}

/// A `LIMIT` clause. The count is never negative; the grammar only accepts
/// an integer literal here.
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub count: usize,
}

/// `CREATE TABLE <name> <source>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub source: TableSource,
}

/// What a created table is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// `CREATE TABLE t SELECT ...`: rows come from running the select.
    Select(Select),
    /// `CREATE TABLE t FROM a JOIN b USING(col)`.
    Join(Join),
    /// `CREATE TABLE t FROM other`: a copy of another table's current rows.
    Table(String),
}

/// An equality join of two named tables on one shared column.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub left: String,
    pub right: String,
    pub column: String,
}

/// `PROCEDURE <name> DO ... END`: a stored, unevaluated statement block.
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub name: String,
    pub statements: Vec<Statement>,
}

/// `CALL <name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallProcedure {
    pub name: String,
}

/// A `WHERE` condition: a comparison leaf or an `AND` of two conditions.
/// `AND` chains are right-recursive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    And {
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

/// Comparison operators available in conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}
