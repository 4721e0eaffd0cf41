//! Error types for MiniDB
//!
//! This module defines all error types used throughout the database engine.

use thiserror::Error;

/// The main error type for MiniDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("invalid number format at position {0}")]
    InvalidNumber(usize),

    // ========== Parser Errors ==========
    #[error("unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    #[error("column count ({columns}) doesn't match value count ({values})")]
    ColumnCountMismatch { columns: usize, values: usize },

    #[error("unknown data type '{0}'")]
    UnknownType(String),

    // ========== Schema Errors ==========
    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("duplicate column '{0}' in table '{1}'")]
    DuplicateColumn(String, String),

    // ========== Constraint Errors ==========
    #[error("column '{0}' cannot be null")]
    NullViolation(String),

    #[error("duplicate value '{value}' for unique column '{column}'")]
    UniqueViolation { column: String, value: String },

    // ========== Execution Errors ==========
    #[error("column '{column}' expects {expected}, got '{value}'")]
    Coercion {
        column: String,
        expected: &'static str,
        value: String,
    },

    #[error("execution error: {0}")]
    ExecutionError(String),

    // ========== Persistence Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error came out of the lexer/parser rather than execution.
    /// The textual execute contract renders these with a "Syntax Error:" prefix.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedCharacter(_, _)
                | Error::UnterminatedString(_)
                | Error::InvalidNumber(_)
                | Error::UnexpectedToken { .. }
                | Error::UnexpectedEof(_)
                | Error::ColumnCountMismatch { .. }
                | Error::UnknownType(_)
        )
    }

    /// Render per the textual execute contract: "Syntax Error: ..." or "Error: ...".
    pub fn render(&self) -> String {
        if self.is_syntax() {
            format!("Syntax Error: {}", self)
        } else {
            format!("Error: {}", self)
        }
    }
}

/// Result type alias for MiniDB operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TableNotFound("users".to_string());
        assert_eq!(err.to_string(), "table 'users' not found");
        assert_eq!(err.render(), "Error: table 'users' not found");

        let err = Error::UnexpectedCharacter('@', 5);
        assert!(err.is_syntax());
        assert!(err.render().starts_with("Syntax Error:"));
    }

    #[test]
    fn test_constraint_errors_are_not_syntax() {
        let err = Error::UniqueViolation {
            column: "id".to_string(),
            value: "1".to_string(),
        };
        assert!(!err.is_syntax());
        assert_eq!(
            err.to_string(),
            "duplicate value '1' for unique column 'id'"
        );
    }
}
