//! MiniDB - a small file-backed relational database
//!
//! This library provides the core components for a SQL-like store:
//! - Statement parsing (lexer, parser, AST)
//! - Table storage with unique/primary-key indexes
//! - Query execution (filter, project, two-table join)
//! - JSON persistence, one file per table
//! - Demo HTTP front-end

pub mod catalog;
pub mod error;
pub mod executor;
pub mod server;
pub mod sql;
pub mod storage;

pub use error::{Error, Result};
