//! Statement parser
//!
//! Recursive descent parser producing AST nodes from a token stream. The
//! grammar covers exactly five statement shapes: CREATE TABLE, INSERT,
//! SELECT (with optional JOIN and WHERE), UPDATE, and DELETE.

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::error::{Error, Result};

/// Statement parser
pub struct Parser {
    /// Token stream
    tokens: Vec<Token>,
    /// Current position in token stream
    position: usize,
}

impl Parser {
    /// Create a parser for the given input, tokenizing it first
    pub fn new(input: &str) -> Result<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single statement. The whole input must be consumed; trailing
    /// tokens after an optional semicolon are a syntax error.
    pub fn parse(&mut self) -> Result<Statement> {
        let statement = match self.current_token() {
            Token::Create => self.parse_create_table(),
            Token::Insert => self.parse_insert(),
            Token::Select => self.parse_select(),
            Token::Update => self.parse_update(),
            Token::Delete => self.parse_delete(),
            Token::Eof => Err(Error::UnexpectedEof("a statement".to_string())),
            token => Err(Error::UnexpectedToken {
                expected: "CREATE, INSERT, SELECT, UPDATE, or DELETE".to_string(),
                found: token.to_string(),
            }),
        }?;

        if self.check(&Token::Semicolon) {
            self.advance();
        }
        self.expect(&Token::Eof)?;

        Ok(statement)
    }

    // ========== Statement Parsers ==========

    /// CREATE TABLE name (col type [constraints], ...)
    fn parse_create_table(&mut self) -> Result<Statement> {
        self.expect(&Token::Create)?;
        self.expect(&Token::Table)?;
        let table_name = self.expect_identifier()?;
        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&Token::RParen)?;

        Ok(Statement::CreateTable(CreateTableStatement {
            table_name,
            columns,
        }))
    }

    /// A single column definition: name, type, then constraint flags in
    /// any order. PK is shorthand for PRIMARY KEY.
    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let type_name = self.expect_identifier()?;
        let col_type = type_name.parse()?;

        let mut def = ColumnDef {
            name,
            col_type,
            primary_key: false,
            unique: false,
            not_null: false,
        };

        loop {
            match self.current_token() {
                Token::Primary => {
                    self.advance();
                    self.expect(&Token::Key)?;
                    def.primary_key = true;
                }
                Token::Unique => {
                    self.advance();
                    def.unique = true;
                }
                Token::Not => {
                    self.advance();
                    self.expect(&Token::Null)?;
                    def.not_null = true;
                }
                // An explicit NULL marker is accepted and means the default.
                Token::Null => {
                    self.advance();
                }
                Token::Identifier(s) if s.eq_ignore_ascii_case("pk") => {
                    self.advance();
                    def.primary_key = true;
                }
                _ => break,
            }
        }

        Ok(def)
    }

    /// INSERT INTO name (cols) VALUES (literals)
    fn parse_insert(&mut self) -> Result<Statement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;
        let table_name = self.expect_identifier()?;

        self.expect(&Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.expect_identifier()?);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&Token::RParen)?;

        self.expect(&Token::Values)?;
        self.expect(&Token::LParen)?;
        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&Token::RParen)?;

        if columns.len() != values.len() {
            return Err(Error::ColumnCountMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        Ok(Statement::Insert(InsertStatement {
            table_name,
            columns,
            values,
        }))
    }

    /// SELECT projection FROM name [JOIN name ON cond] [WHERE cond]
    fn parse_select(&mut self) -> Result<Statement> {
        self.expect(&Token::Select)?;

        let projection = if self.check(&Token::Asterisk) {
            self.advance();
            Projection::Wildcard
        } else {
            let mut columns = Vec::new();
            loop {
                columns.push(self.parse_column_ref()?);
                if self.check(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
            Projection::Columns(columns)
        };

        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;

        let join = if self.check(&Token::Join) {
            self.advance();
            let join_table = self.expect_identifier()?;
            self.expect(&Token::On)?;
            let on = self.parse_condition()?;
            Some(JoinClause {
                table_name: join_table,
                on,
            })
        } else {
            None
        };

        let where_clause = self.parse_optional_where()?;

        Ok(Statement::Select(SelectStatement {
            projection,
            table_name,
            join,
            where_clause,
        }))
    }

    /// UPDATE name SET col = lit [, ...] [WHERE cond]
    fn parse_update(&mut self) -> Result<Statement> {
        self.expect(&Token::Update)?;
        let table_name = self.expect_identifier()?;
        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push(Assignment { column, value });
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let where_clause = self.parse_optional_where()?;

        Ok(Statement::Update(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        }))
    }

    /// DELETE FROM name [WHERE cond]
    fn parse_delete(&mut self) -> Result<Statement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;
        let where_clause = self.parse_optional_where()?;

        Ok(Statement::Delete(DeleteStatement {
            table_name,
            where_clause,
        }))
    }

    // ========== Clause Parsers ==========

    fn parse_optional_where(&mut self) -> Result<Option<Condition>> {
        if self.check(&Token::Where) {
            self.advance();
            Ok(Some(self.parse_condition()?))
        } else {
            Ok(None)
        }
    }

    /// A condition: comparisons joined by AND
    fn parse_condition(&mut self) -> Result<Condition> {
        let mut condition = self.parse_comparison()?;

        while self.check(&Token::And) {
            self.advance();
            let right = self.parse_comparison()?;
            condition = Condition::And(Box::new(condition), Box::new(right));
        }

        Ok(condition)
    }

    /// A single comparison: operand op operand
    fn parse_comparison(&mut self) -> Result<Condition> {
        let left = self.parse_operand()?;
        let op = self.parse_compare_op()?;
        let right = self.parse_operand()?;

        Ok(Condition::Compare { left, op, right })
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp> {
        let op = match self.current_token() {
            Token::Eq => CompareOp::Eq,
            Token::Neq => CompareOp::Neq,
            Token::Lt => CompareOp::Lt,
            Token::Gt => CompareOp::Gt,
            Token::Lte => CompareOp::Lte,
            Token::Gte => CompareOp::Gte,
            token => {
                return Err(Error::UnexpectedToken {
                    expected: "a comparison operator".to_string(),
                    found: token.to_string(),
                })
            }
        };
        self.advance();
        Ok(op)
    }

    /// Either side of a comparison: a literal or a column reference
    fn parse_operand(&mut self) -> Result<Operand> {
        match self.current_token().clone() {
            Token::Identifier(_) => Ok(Operand::Column(self.parse_column_ref()?)),
            _ => Ok(Operand::Literal(self.parse_literal()?)),
        }
    }

    /// A column reference, optionally qualified: `col` or `table.col`
    fn parse_column_ref(&mut self) -> Result<ColumnRef> {
        let first = self.expect_identifier()?;

        if self.check(&Token::Dot) {
            self.advance();
            let column = self.expect_identifier()?;
            Ok(ColumnRef::qualified(first, column))
        } else {
            Ok(ColumnRef::bare(first))
        }
    }

    /// A literal value. A bare identifier in value position is taken as an
    /// unquoted string, matching the lenient textual interface.
    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.current_token().clone() {
            Token::IntegerLiteral(n) => Literal::Int(n),
            Token::FloatLiteral(n) => Literal::Float(n),
            Token::StringLiteral(s) => Literal::Str(s),
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Null => Literal::Null,
            Token::Identifier(s) => Literal::Str(s),
            Token::Eof => return Err(Error::UnexpectedEof("a value".to_string())),
            token => {
                return Err(Error::UnexpectedToken {
                    expected: "a value".to_string(),
                    found: token.to_string(),
                })
            }
        };
        self.advance();
        Ok(literal)
    }

    // ========== Helpers ==========

    /// Get the current token
    fn current_token(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    /// Advance to the next token
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Check if the current token matches (by variant)
    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current_token()) == std::mem::discriminant(token)
    }

    /// Expect a specific token variant and advance past it
    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            let found = self.current_token();
            if *found == Token::Eof {
                Err(Error::UnexpectedEof(token.to_string()))
            } else {
                Err(Error::UnexpectedToken {
                    expected: token.to_string(),
                    found: found.to_string(),
                })
            }
        }
    }

    /// Expect an identifier and return its name
    fn expect_identifier(&mut self) -> Result<String> {
        match self.current_token().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            Token::Eof => Err(Error::UnexpectedEof("an identifier".to_string())),
            token => Err(Error::UnexpectedToken {
                expected: "an identifier".to_string(),
                found: token.to_string(),
            }),
        }
    }
}
