//! Storage module
//!
//! This module contains the in-memory table engine, the value model, and
//! the JSON persistence layer.

pub mod database;
pub mod disk;
pub mod table;
pub mod value;

pub use database::{Database, DatabaseOptions};
pub use table::{RowId, Table};
pub use value::{Row, Value};
