//! Unified error handling for the CQL interpreter.
//!
//! This module defines [`CqlError`], the single error type propagated through
//! the front-end (lexer and parser) and the evaluator, together with a
//! convenience [`Result<T>`] alias so callers can write `Result<T>` instead of
//! `std::result::Result<T, CqlError>`.
//!
//! The taxonomy is deliberately small. Lex and syntax errors are fatal to the
//! parse of one source unit; everything else the language degrades gracefully
//! (absent tables read as empty, failed comparisons evaluate to false, CSV
//! failures yield empty data with a logged diagnostic), so no error variants
//! exist for those paths.

use std::fmt;
use std::io;

/// The canonical error type for all CQL operations.
#[derive(Debug)]
pub enum CqlError {
    /// An I/O error originating from the filesystem.
    Io(io::Error),

    /// A CSV file could not be parsed or written.
    Csv(csv::Error),

    /// The tokenizer met a character that no token rule accepts. An
    /// unterminated string or block comment is reported the same way, naming
    /// the opening `"` or `{`.
    Lex { character: char, line: usize },

    /// The parser met a token that no production accepts.
    Syntax {
        /// Rendered text of the offending token.
        token: String,
        /// Token category, e.g. `"IDENTIFIER"` or `"SELECT"`.
        kind: &'static str,
        line: usize,
    },

    /// The token stream ran out mid-statement.
    UnexpectedEof,
}

impl fmt::Display for CqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlError::Io(err) => write!(f, "I/O error: {err}"),
            CqlError::Csv(err) => write!(f, "CSV error: {err}"),
            CqlError::Lex { character, line } => {
                write!(f, "illegal character {character:?} on line {line}")
            }
            CqlError::Syntax { token, kind, line } => {
                write!(f, "unexpected token {token:?} ({kind}) on line {line}")
            }
            CqlError::UnexpectedEof => write!(f, "unexpected end of input"),
        }
    }
}

impl std::error::Error for CqlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CqlError::Io(err) => Some(err),
            CqlError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CqlError {
    fn from(err: io::Error) -> Self {
        CqlError::Io(err)
    }
}

impl From<csv::Error> for CqlError {
    fn from(err: csv::Error) -> Self {
        CqlError::Csv(err)
    }
}

/// A specialised [`Result`] type for CQL operations.
pub type Result<T> = std::result::Result<T, CqlError>;
