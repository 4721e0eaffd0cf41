//! Executor module
//!
//! This module runs parsed statements against a database.

pub mod executor;
pub mod result;

pub use executor::Executor;
pub use result::QueryResult;
