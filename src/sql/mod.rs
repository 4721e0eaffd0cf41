//! SQL module
//!
//! This module contains the lexer, parser, and AST for the statement language.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::Lexer;
pub use parser::Parser;
pub use token::Token;
