//! Schema definitions for MiniDB
//!
//! This module defines table schemas and column metadata. The serde field
//! names of [`Column`] are part of the persisted-table file format and must
//! not change.

use super::types::DataType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    pub col_type: DataType,
    /// Is this the primary key?
    #[serde(default)]
    pub is_primary_key: bool,
    /// Is this column unique?
    #[serde(default)]
    pub is_unique: bool,
    /// Is this column nullable?
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Create a new nullable, unconstrained column
    pub fn new(name: impl Into<String>, col_type: DataType) -> Self {
        Self {
            name: name.into(),
            col_type,
            is_primary_key: false,
            is_unique: false,
            nullable: true,
        }
    }

    /// Set the primary key flag. A primary key is implicitly non-nullable
    /// unless the database was opened with the permissive legacy option.
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.is_primary_key = pk;
        self
    }

    /// Set the unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.is_unique = unique;
        self
    }

    /// Set the nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Whether this column carries an equality index
    pub fn is_indexed(&self) -> bool {
        self.is_primary_key || self.is_unique
    }
}

/// Table schema - the ordered set of columns
#[derive(Debug, Clone)]
pub struct Schema {
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to index mapping
    name_to_index: HashMap<String, usize>,
}

impl Schema {
    /// Create a schema from a list of columns. Fails on a duplicate column
    /// name; a table has at most one column per name.
    pub fn from_columns(table_name: &str, columns: Vec<Column>) -> Result<Self> {
        let mut name_to_index = HashMap::with_capacity(columns.len());
        for (idx, col) in columns.iter().enumerate() {
            if name_to_index.insert(col.name.clone(), idx).is_some() {
                return Err(Error::DuplicateColumn(
                    col.name.clone(),
                    table_name.to_string(),
                ));
            }
        }
        Ok(Self {
            columns,
            name_to_index,
        })
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get all columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns carrying an equality index (primary key or unique)
    pub fn indexed_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_indexed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let schema = Schema::from_columns(
            "users",
            vec![
                Column::new("id", DataType::Int).primary_key(true).nullable(false),
                Column::new("name", DataType::Str).nullable(false),
                Column::new("email", DataType::Str).unique(true),
            ],
        )
        .unwrap();

        assert_eq!(schema.column_count(), 3);
        assert!(schema.has_column("id"));
        assert!(!schema.has_column("unknown"));

        let id_col = schema.get_column("id").unwrap();
        assert!(id_col.is_primary_key);
        assert!(!id_col.nullable);

        let indexed: Vec<&str> = schema.indexed_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(indexed, vec!["id", "email"]);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = Schema::from_columns(
            "t",
            vec![
                Column::new("a", DataType::Int),
                Column::new("a", DataType::Str),
            ],
        );
        assert!(matches!(result, Err(Error::DuplicateColumn(_, _))));
    }

    #[test]
    fn test_column_serde_field_names() {
        let col = Column::new("id", DataType::Int).primary_key(true).nullable(false);
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["name"], "id");
        assert_eq!(json["col_type"], "int");
        assert_eq!(json["is_primary_key"], true);
        assert_eq!(json["is_unique"], false);
        assert_eq!(json["nullable"], false);

        // Omitted flags default to a plain nullable column.
        let col: Column = serde_json::from_str(r#"{"name":"x","col_type":"str"}"#).unwrap();
        assert!(col.nullable);
        assert!(!col.is_primary_key);
    }
}
