//! Recursive-descent parser for CQL.
//!
//! The entry point is [`Parser::parse`], which tokenizes the input and then
//! parses one or more `;`-terminated statements into a [`Program`]. Every
//! statement owns its terminator; procedure bodies end at `END`, which may
//! itself be followed by an optional `;`.

use crate::error::{CqlError, Result};
use crate::lang::ast::*;
use crate::lang::lexer::{Lexer, Token, TokenKind};
use crate::types::Value;

/// A recursive-descent parser that transforms a token stream into an AST.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Parse a CQL string into a program.
    pub fn parse(source: &str) -> Result<Program> {
        let tokens = Lexer::new(source).tokenize()?;
        let mut parser = Parser { tokens, pos: 0 };
        let mut statements = Vec::new();
        while parser.current().kind != TokenKind::Eof {
            statements.push(parser.parse_statement()?);
        }
        if statements.is_empty() {
            return Err(CqlError::UnexpectedEof);
        }
        Ok(Program { statements })
    }

    // =======================================================================
    // Token helpers
    // =======================================================================

    fn current(&self) -> &Token {
        // The token vector always ends with Eof, so this cannot be empty.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> CqlError {
        let tok = self.current();
        if tok.kind == TokenKind::Eof {
            CqlError::UnexpectedEof
        } else {
            CqlError::Syntax {
                token: tok.kind.to_string(),
                kind: tok.kind.name(),
                line: tok.line,
            }
        }
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        if self.current().kind == *expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn expect_string(&mut self) -> Result<String> {
        match &self.current().kind {
            TokenKind::StringLiteral(value) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected()),
        }
    }

    // =======================================================================
    // Statement dispatch
    // =======================================================================

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current().kind {
            TokenKind::Import => self.parse_import(),
            TokenKind::Export => self.parse_export(),
            TokenKind::Discard => self.parse_discard(),
            TokenKind::Rename => self.parse_rename(),
            TokenKind::Print => self.parse_print(),
            TokenKind::Select => {
                let select = self.parse_select()?;
                self.expect(&TokenKind::Semicolon)?;
                Ok(Statement::Select(select))
            }
            TokenKind::Create => self.parse_create(),
            TokenKind::Procedure => self.parse_procedure(),
            TokenKind::Call => self.parse_call(),
            _ => Err(self.unexpected()),
        }
    }

    // =======================================================================
    // Simple table statements
    // =======================================================================

    fn parse_import(&mut self) -> Result<Statement> {
        self.expect(&TokenKind::Import)?;
        self.expect(&TokenKind::Table)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::From)?;
        let filename = self.expect_string()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Import(ImportTable { name, filename }))
    }

    fn parse_export(&mut self) -> Result<Statement> {
        self.expect(&TokenKind::Export)?;
        self.expect(&TokenKind::Table)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::As)?;
        let filename = self.expect_string()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Export(ExportTable { name, filename }))
    }

    fn parse_discard(&mut self) -> Result<Statement> {
        self.expect(&TokenKind::Discard)?;
        self.expect(&TokenKind::Table)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Discard(DiscardTable { name }))
    }

    fn parse_rename(&mut self) -> Result<Statement> {
        self.expect(&TokenKind::Rename)?;
        self.expect(&TokenKind::Table)?;
        // Two bare identifiers, no keyword between them.
        let old = self.expect_identifier()?;
        let new = self.expect_identifier()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Rename(RenameTable { old, new }))
    }

    fn parse_print(&mut self) -> Result<Statement> {
        self.expect(&TokenKind::Print)?;
        self.expect(&TokenKind::Table)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Print(PrintTable { name }))
    }

    // =======================================================================
    // SELECT
    // =======================================================================

    /// Parse a `SELECT` clause without its terminator, so `CREATE TABLE`
    /// can reuse it as a source.
    fn parse_select(&mut self) -> Result<Select> {
        self.expect(&TokenKind::Select)?;

        let columns = if self.current().kind == TokenKind::Star {
            self.advance();
            Columns::All
        } else {
            Columns::List(self.parse_column_list()?)
        };

        self.expect(&TokenKind::From)?;
        let table = self.expect_identifier()?;

        let where_clause = if self.current().kind == TokenKind::Where {
            self.advance();
            Some(self.parse_condition()?)
        } else {
            None
        };

        let limit = if self.current().kind == TokenKind::Limit {
            self.advance();
            Some(self.parse_limit()?)
        } else {
            None
        };

        Ok(Select {
            columns,
            table,
            where_clause,
            limit,
        })
    }

    fn parse_column_list(&mut self) -> Result<Vec<String>> {
        let mut columns = vec![self.expect_identifier()?];
        while self.current().kind == TokenKind::Comma {
            self.advance();
            columns.push(self.expect_identifier()?);
        }
        Ok(columns)
    }

    fn parse_limit(&mut self) -> Result<Limit> {
        match self.current().kind {
            TokenKind::IntegerLiteral(count) => {
                self.advance();
                Ok(Limit {
                    count: count as usize,
                })
            }
            _ => Err(self.unexpected()),
        }
    }

    // =======================================================================
    // Conditions
    // =======================================================================

    fn parse_condition(&mut self) -> Result<Condition> {
        let left = self.parse_comparison()?;
        if self.current().kind == TokenKind::And {
            self.advance();
            let right = self.parse_condition()?;
            Ok(Condition::And {
                left: Box::new(left),
                right: Box::new(right),
            })
        } else {
            Ok(left)
        }
    }

    fn parse_comparison(&mut self) -> Result<Condition> {
        let column = self.expect_identifier()?;

        let op = match self.current().kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::GtEq => CompareOp::GtEq,
            TokenKind::LtEq => CompareOp::LtEq,
            _ => return Err(self.unexpected()),
        };
        self.advance();

        let value = match &self.current().kind {
            TokenKind::IntegerLiteral(i) => Value::Integer(*i),
            TokenKind::RealLiteral(r) => Value::Real(*r),
            TokenKind::StringLiteral(s) => Value::Text(s.clone()),
            _ => return Err(self.unexpected()),
        };
        self.advance();

        Ok(Condition::Compare { column, op, value })
    }

    // =======================================================================
    // CREATE TABLE
    // =======================================================================

    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(&TokenKind::Create)?;
        self.expect(&TokenKind::Table)?;
        let name = self.expect_identifier()?;

        // The single token after the table name decides the form; one-token
        // lookahead, never backtracking.
        let source = match self.current().kind {
            TokenKind::From => {
                self.advance();
                let left = self.expect_identifier()?;
                if self.current().kind == TokenKind::Join {
                    self.advance();
                    let right = self.expect_identifier()?;
                    self.expect(&TokenKind::Using)?;
                    self.expect(&TokenKind::LeftParen)?;
                    let column = self.expect_identifier()?;
                    self.expect(&TokenKind::RightParen)?;
                    TableSource::Join(Join {
                        left,
                        right,
                        column,
                    })
                } else {
                    TableSource::Table(left)
                }
            }
            TokenKind::Select => TableSource::Select(self.parse_select()?),
            _ => return Err(self.unexpected()),
        };

        self.expect(&TokenKind::Semicolon)?;
        Ok(Statement::CreateTable(CreateTable { name, source }))
    }

    // =======================================================================
    // Procedures
    // =======================================================================

    fn parse_procedure(&mut self) -> Result<Statement> {
        self.expect(&TokenKind::Procedure)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Do)?;

        // A body holds at least one statement; a bare DO END is rejected by
        // the statement dispatch seeing END.
        let mut statements = vec![self.parse_statement()?];
        while self.current().kind != TokenKind::End {
            statements.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::End)?;

        // END may optionally be followed by a semicolon.
        if self.current().kind == TokenKind::Semicolon {
            self.advance();
        }

        Ok(Statement::Procedure(Procedure { name, statements }))
    }

    fn parse_call(&mut self) -> Result<Statement> {
        self.expect(&TokenKind::Call)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Call(CallProcedure { name }))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::parse(source).unwrap()
    }

    fn parse_one(source: &str) -> Statement {
        let mut program = parse(source);
        assert_eq!(program.statements.len(), 1);
        program.statements.remove(0)
    }

    #[test]
    fn import_statement() {
        let stmt = parse_one("IMPORT TABLE stations FROM \"stations.csv\";");
        assert_eq!(
            stmt,
            Statement::Import(ImportTable {
                name: "stations".into(),
                filename: "stations.csv".into(),
            })
        );
    }

    #[test]
    fn export_statement() {
        let stmt = parse_one("EXPORT TABLE result AS \"result.csv\";");
        assert_eq!(
            stmt,
            Statement::Export(ExportTable {
                name: "result".into(),
                filename: "result.csv".into(),
            })
        );
    }

    #[test]
    fn discard_print_and_call() {
        let program = parse("DISCARD TABLE t; PRINT TABLE t; CALL setup;");
        assert_eq!(
            program.statements,
            vec![
                Statement::Discard(DiscardTable { name: "t".into() }),
                Statement::Print(PrintTable { name: "t".into() }),
                Statement::Call(CallProcedure {
                    name: "setup".into()
                }),
            ]
        );
    }

    #[test]
    fn rename_takes_two_bare_identifiers() {
        let stmt = parse_one("RENAME TABLE old_name new_name;");
        assert_eq!(
            stmt,
            Statement::Rename(RenameTable {
                old: "old_name".into(),
                new: "new_name".into(),
            })
        );
    }

    #[test]
    fn select_star_normalizes_optionals_to_none() {
        let stmt = parse_one("SELECT * FROM readings;");
        assert_eq!(
            stmt,
            Statement::Select(Select {
                columns: Columns::All,
                table: "readings".into(),
                where_clause: None,
                limit: None,
            })
        );
    }

    #[test]
    fn select_with_columns_where_and_limit() {
        let stmt = parse_one("SELECT id, temp FROM readings WHERE temp > 22 LIMIT 10;");
        assert_eq!(
            stmt,
            Statement::Select(Select {
                columns: Columns::List(vec!["id".into(), "temp".into()]),
                table: "readings".into(),
                where_clause: Some(Condition::Compare {
                    column: "temp".into(),
                    op: CompareOp::Gt,
                    value: Value::Integer(22),
                }),
                limit: Some(Limit { count: 10 }),
            })
        );
    }

    #[test]
    fn and_chains_are_right_recursive() {
        let stmt = parse_one(r#"SELECT * FROM t WHERE a = "1" AND b = "2" AND c = "3";"#);
        let Statement::Select(select) = stmt else {
            panic!("expected select");
        };
        let Some(Condition::And { left, right }) = select.where_clause else {
            panic!("expected AND at the root");
        };
        assert!(matches!(*left, Condition::Compare { ref column, .. } if column == "a"));
        let Condition::And { left, right } = *right else {
            panic!("expected nested AND on the right");
        };
        assert!(matches!(*left, Condition::Compare { ref column, .. } if column == "b"));
        assert!(matches!(*right, Condition::Compare { ref column, .. } if column == "c"));
    }

    #[test]
    fn all_comparison_operators() {
        let ops = [
            ("=", CompareOp::Eq),
            ("<>", CompareOp::NotEq),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
            (">=", CompareOp::GtEq),
            ("<=", CompareOp::LtEq),
        ];
        for (text, op) in ops {
            let stmt = parse_one(&format!("SELECT * FROM t WHERE a {text} 1;"));
            let Statement::Select(select) = stmt else {
                panic!("expected select");
            };
            assert_eq!(
                select.where_clause,
                Some(Condition::Compare {
                    column: "a".into(),
                    op,
                    value: Value::Integer(1),
                })
            );
        }
    }

    #[test]
    fn condition_values_may_be_real_or_text() {
        let stmt = parse_one(r#"SELECT * FROM t WHERE a >= 2.5 AND b = "x";"#);
        let Statement::Select(select) = stmt else {
            panic!("expected select");
        };
        let Some(Condition::And { left, right }) = select.where_clause else {
            panic!("expected AND");
        };
        assert!(matches!(
            *left,
            Condition::Compare {
                value: Value::Real(_),
                ..
            }
        ));
        assert!(matches!(
            *right,
            Condition::Compare {
                value: Value::Text(_),
                ..
            }
        ));
    }

    #[test]
    fn create_from_named_table() {
        let stmt = parse_one("CREATE TABLE copy FROM original;");
        assert_eq!(
            stmt,
            Statement::CreateTable(CreateTable {
                name: "copy".into(),
                source: TableSource::Table("original".into()),
            })
        );
    }

    #[test]
    fn create_from_join() {
        let stmt = parse_one("CREATE TABLE j FROM t1 JOIN t2 USING(k);");
        assert_eq!(
            stmt,
            Statement::CreateTable(CreateTable {
                name: "j".into(),
                source: TableSource::Join(Join {
                    left: "t1".into(),
                    right: "t2".into(),
                    column: "k".into(),
                }),
            })
        );
    }

    #[test]
    fn create_from_select() {
        let stmt = parse_one("CREATE TABLE hot SELECT * FROM readings WHERE temp > 30;");
        let Statement::CreateTable(create) = stmt else {
            panic!("expected create");
        };
        assert_eq!(create.name, "hot");
        assert!(matches!(create.source, TableSource::Select(_)));
    }

    #[test]
    fn create_rejects_other_tokens_after_the_name() {
        let err = Parser::parse("CREATE TABLE t JOIN x;").unwrap_err();
        assert!(
            matches!(err, CqlError::Syntax { kind: "JOIN", line: 1, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn procedure_bodies_hold_statements() {
        let stmt = parse_one("PROCEDURE p DO PRINT TABLE t; CALL q; END;");
        assert_eq!(
            stmt,
            Statement::Procedure(Procedure {
                name: "p".into(),
                statements: vec![
                    Statement::Print(PrintTable { name: "t".into() }),
                    Statement::Call(CallProcedure { name: "q".into() }),
                ],
            })
        );
    }

    #[test]
    fn procedure_end_semicolon_is_optional() {
        let program = parse("PROCEDURE p DO PRINT TABLE t; END PRINT TABLE u;");
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn procedures_nest() {
        let stmt = parse_one("PROCEDURE outer DO PROCEDURE inner DO CALL outer; END; END;");
        let Statement::Procedure(outer) = stmt else {
            panic!("expected procedure");
        };
        let Statement::Procedure(inner) = &outer.statements[0] else {
            panic!("expected nested procedure");
        };
        assert_eq!(inner.name, "inner");
        assert!(matches!(inner.statements[0], Statement::Call(_)));
    }

    #[test]
    fn self_recursive_procedure_is_syntactically_legal() {
        let stmt = parse_one("PROCEDURE again DO CALL again; END;");
        assert!(matches!(stmt, Statement::Procedure(_)));
    }

    #[test]
    fn empty_procedure_body_is_an_error() {
        let err = Parser::parse("PROCEDURE p DO END;").unwrap_err();
        assert!(matches!(err, CqlError::Syntax { kind: "END", .. }));
    }

    #[test]
    fn missing_semicolon_is_an_error() {
        let err = Parser::parse("PRINT TABLE t").unwrap_err();
        assert!(matches!(err, CqlError::UnexpectedEof));
    }

    #[test]
    fn syntax_errors_carry_the_offending_line() {
        let err = Parser::parse("PRINT TABLE t;\nSELECT FROM t;").unwrap_err();
        assert!(
            matches!(err, CqlError::Syntax { kind: "FROM", line: 2, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn limit_requires_an_integer_literal() {
        assert!(Parser::parse("SELECT * FROM t LIMIT 2.5;").is_err());
        assert!(Parser::parse("SELECT * FROM t LIMIT \"5\";").is_err());
    }

    #[test]
    fn empty_source_is_an_error() {
        let err = Parser::parse("-- nothing but a comment\n").unwrap_err();
        assert!(matches!(err, CqlError::UnexpectedEof));
    }

    #[test]
    fn keywords_cannot_name_tables() {
        let err = Parser::parse("PRINT TABLE select;").unwrap_err();
        assert!(matches!(err, CqlError::Syntax { kind: "SELECT", .. }));
    }
}
