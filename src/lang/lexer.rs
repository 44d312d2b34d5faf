//! Hand-written tokenizer for CQL.
//!
//! The [`Lexer`] takes raw CQL source text and produces a `Vec<Token>`,
//! terminated by [`TokenKind::Eof`]. Keywords are case-insensitive, two
//! comment styles are skipped (`-- line` and `{- block -}`), and every token
//! records the source line it started on so parse errors can point at it.

use std::fmt;

use crate::error::{CqlError, Result};

/// A single CQL token: its kind plus the line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// The kind of a token, carrying any literal payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // -----------------------------------------------------------------------
    // Keywords
    // -----------------------------------------------------------------------
    Import,
    Export,
    Table,
    From,
    As,
    Call,
    Discard,
    Rename,
    Print,
    Select,
    Where,
    Limit,
    Create,
    Join,
    Using,
    Procedure,
    Do,
    End,
    And,

    // -----------------------------------------------------------------------
    // Literals & identifiers
    // -----------------------------------------------------------------------
    Identifier(String),
    /// A double-quoted string, stored without the quotes. Backslash escapes
    /// are kept verbatim; only the closing-quote escape is interpreted, and
    /// then only to keep scanning.
    StringLiteral(String),
    IntegerLiteral(i64),
    RealLiteral(f64),

    // -----------------------------------------------------------------------
    // Punctuation
    // -----------------------------------------------------------------------
    Semicolon,
    Comma,
    LeftParen,
    RightParen,
    Star,
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    Dot,

    /// End-of-input sentinel.
    Eof,
}

impl TokenKind {
    /// Token category name, used in syntax error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Import => "IMPORT",
            TokenKind::Export => "EXPORT",
            TokenKind::Table => "TABLE",
            TokenKind::From => "FROM",
            TokenKind::As => "AS",
            TokenKind::Call => "CALL",
            TokenKind::Discard => "DISCARD",
            TokenKind::Rename => "RENAME",
            TokenKind::Print => "PRINT",
            TokenKind::Select => "SELECT",
            TokenKind::Where => "WHERE",
            TokenKind::Limit => "LIMIT",
            TokenKind::Create => "CREATE",
            TokenKind::Join => "JOIN",
            TokenKind::Using => "USING",
            TokenKind::Procedure => "PROCEDURE",
            TokenKind::Do => "DO",
            TokenKind::End => "END",
            TokenKind::And => "AND",
            TokenKind::Identifier(_) => "IDENTIFIER",
            TokenKind::StringLiteral(_) => "STRING",
            TokenKind::IntegerLiteral(_) | TokenKind::RealLiteral(_) => "NUMBER",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Comma => "COMMA",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::Star => "ASTERISK",
            TokenKind::Eq => "EQUALS",
            TokenKind::NotEq => "NOTEQUAL",
            TokenKind::Gt => "GT",
            TokenKind::Lt => "LT",
            TokenKind::GtEq => "GE",
            TokenKind::LtEq => "LE",
            TokenKind::Dot => "DOT",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "{name}"),
            TokenKind::StringLiteral(value) => write!(f, "{value}"),
            TokenKind::IntegerLiteral(value) => write!(f, "{value}"),
            TokenKind::RealLiteral(value) => write!(f, "{value}"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::NotEq => write!(f, "<>"),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Eof => write!(f, "<eof>"),
            keyword => write!(f, "{}", keyword.name()),
        }
    }
}

// ---------------------------------------------------------------------------
// Keyword lookup
// ---------------------------------------------------------------------------

fn keyword_token(word: &str) -> Option<TokenKind> {
    // The input `word` is already uppercased by the caller.
    match word {
        "IMPORT" => Some(TokenKind::Import),
        "EXPORT" => Some(TokenKind::Export),
        "TABLE" => Some(TokenKind::Table),
        "FROM" => Some(TokenKind::From),
        "AS" => Some(TokenKind::As),
        "CALL" => Some(TokenKind::Call),
        "DISCARD" => Some(TokenKind::Discard),
        "RENAME" => Some(TokenKind::Rename),
        "PRINT" => Some(TokenKind::Print),
        "SELECT" => Some(TokenKind::Select),
        "WHERE" => Some(TokenKind::Where),
        "LIMIT" => Some(TokenKind::Limit),
        "CREATE" => Some(TokenKind::Create),
        "JOIN" => Some(TokenKind::Join),
        "USING" => Some(TokenKind::Using),
        "PROCEDURE" => Some(TokenKind::Procedure),
        "DO" => Some(TokenKind::Do),
        "END" => Some(TokenKind::End),
        "AND" => Some(TokenKind::And),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// A hand-written CQL tokenizer.
///
/// Create one with [`Lexer::new`], then call [`Lexer::tokenize`] to obtain
/// the full token stream (terminated by [`TokenKind::Eof`]).
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over the given CQL text.
    pub fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0, line: 1 }
    }

    /// Tokenize the entire input and return the token list.
    ///
    /// The returned vector always ends with [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    // -- helpers ------------------------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.src.as_bytes().get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, |c| c.is_ascii_whitespace()) {
            self.advance();
        }
    }

    /// Skip `-- line comments` and `{- block comments -}`, returning `true`
    /// if a comment was actually consumed so the caller can loop.
    ///
    /// A lone `-` or `{` is not a comment opener and is left for the main
    /// scanner, which rejects it as an illegal character.
    fn skip_comment(&mut self) -> Result<bool> {
        if self.peek() == Some(b'-') && self.peek_at(1) == Some(b'-') {
            // Line comment — consume until end of line or end of input.
            while let Some(ch) = self.advance() {
                if ch == b'\n' {
                    break;
                }
            }
            return Ok(true);
        }
        if self.peek() == Some(b'{') && self.peek_at(1) == Some(b'-') {
            // Block comment — consume non-greedily until the first `-}`.
            let line = self.line;
            self.advance();
            self.advance();
            loop {
                match self.peek() {
                    None => {
                        return Err(CqlError::Lex { character: '{', line });
                    }
                    Some(b'-') if self.peek_at(1) == Some(b'}') => {
                        self.advance();
                        self.advance();
                        break;
                    }
                    Some(_) => {
                        self.advance();
                    }
                }
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            if !self.skip_comment()? {
                break;
            }
        }
        Ok(())
    }

    fn illegal_character(&self) -> CqlError {
        let character = self.src[self.pos..].chars().next().unwrap_or('\0');
        CqlError::Lex {
            character,
            line: self.line,
        }
    }

    // -- main scanner -------------------------------------------------------

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;

        let line = self.line;
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(b'"') => self.read_string_literal()?,
            Some(c) if c.is_ascii_digit() => self.read_number(),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                self.read_identifier_or_keyword()
            }
            Some(_) => self.read_operator()?,
        };
        Ok(Token { kind, line })
    }

    // -- token readers ------------------------------------------------------

    fn read_string_literal(&mut self) -> Result<TokenKind> {
        let line = self.line;
        self.advance(); // consume opening "
        let start = self.pos;
        loop {
            match self.peek() {
                // Unterminated: report the opening quote.
                None => return Err(CqlError::Lex { character: '"', line }),
                Some(b'"') => break,
                Some(b'\\') => {
                    // A backslash protects the next character, so \" does not
                    // close the literal. Both characters stay in the value.
                    self.advance();
                    if self.advance().is_none() {
                        return Err(CqlError::Lex { character: '"', line });
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let value = self.src[start..self.pos].to_string();
        self.advance(); // consume closing "
        Ok(TokenKind::StringLiteral(value))
    }

    fn read_number(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // A dot only belongs to the number when a digit follows; `5.` lexes
        // as the integer 5 and a DOT token.
        let mut is_real = false;
        if self.peek() == Some(b'.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            is_real = true;
            self.advance();
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.src[start..self.pos];
        if is_real {
            TokenKind::RealLiteral(text.parse().unwrap_or(f64::INFINITY))
        } else {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::IntegerLiteral(value),
                // Digit strings beyond the i64 range fall back to the float form.
                Err(_) => TokenKind::RealLiteral(text.parse().unwrap_or(f64::INFINITY)),
            }
        }
    }

    fn read_identifier_or_keyword(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .peek()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let word = &self.src[start..self.pos];
        let upper = word.to_ascii_uppercase();

        match keyword_token(&upper) {
            Some(kw) => kw,
            None => TokenKind::Identifier(word.to_string()),
        }
    }

    fn read_operator(&mut self) -> Result<TokenKind> {
        let kind = match self.peek().unwrap_or(0) {
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b'*' => TokenKind::Star,
            b'.' => TokenKind::Dot,
            b'=' => TokenKind::Eq,
            b'>' => {
                if self.peek_at(1) == Some(b'=') {
                    self.advance();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            b'<' => {
                if self.peek_at(1) == Some(b'>') {
                    self.advance();
                    TokenKind::NotEq
                } else if self.peek_at(1) == Some(b'=') {
                    self.advance();
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            _ => return Err(self.illegal_character()),
        };
        self.advance();
        Ok(kind)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
