//! On-disk table format
//!
//! Each table persists as one JSON file, `<table>.json`, in the database
//! directory. Writes replace the whole file; the format is a schema
//! header plus the full row list.

use super::table::Table;
use super::value::Row;
use crate::catalog::Column;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The persisted form of a table
#[derive(Debug, Serialize, Deserialize)]
pub struct TableFile {
    /// Table name
    pub name: String,
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows, each a column-name-to-value object
    pub rows: Vec<Row>,
}

/// Path of the file backing a table
pub fn table_path(dir: &Path, table_name: &str) -> PathBuf {
    dir.join(format!("{}.json", table_name))
}

/// Write a table to its backing file, replacing any previous contents
pub fn save_table(dir: &Path, table: &Table) -> Result<()> {
    fs::create_dir_all(dir)?;

    let file = TableFile {
        name: table.name().to_string(),
        columns: table.schema().columns().to_vec(),
        rows: table.rows().cloned().collect(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(table_path(dir, table.name()), json)?;

    Ok(())
}

/// Load a table from a backing file, rebuilding its indexes
pub fn load_table(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path)?;
    let file: TableFile = serde_json::from_str(&text)?;
    Table::from_rows(file.name, file.columns, file.rows)
}

/// Remove a table's backing file. Missing files are fine; the table may
/// never have been saved.
pub fn remove_table_file(dir: &Path, table_name: &str) -> Result<()> {
    match fs::remove_file(table_path(dir, table_name)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;
    use crate::storage::value::Value;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut table = Table::new(
            "items",
            vec![
                Column::new("id", DataType::Int).primary_key(true).nullable(false),
                Column::new("label", DataType::Str),
            ],
        )
        .unwrap();
        let row: Row = [
            ("id".to_string(), Value::Int(1)),
            ("label".to_string(), Value::from("first")),
        ]
        .into_iter()
        .collect();
        table.insert(row).unwrap();

        save_table(dir.path(), &table).unwrap();

        let loaded = load_table(&table_path(dir.path(), "items")).unwrap();
        assert_eq!(loaded.name(), "items");
        assert_eq!(loaded.row_count(), 1);
        assert_eq!(loaded.rows().next().unwrap()["label"], Value::from("first"));
        assert!(loaded.find_by_index("id", &Value::Int(1)).is_some());
    }

    #[test]
    fn test_persisted_shape() {
        let dir = tempfile::tempdir().unwrap();

        let mut table = Table::new(
            "t",
            vec![Column::new("a", DataType::Int).primary_key(true).nullable(false)],
        )
        .unwrap();
        table
            .insert([("a".to_string(), Value::Int(5))].into_iter().collect())
            .unwrap();
        save_table(dir.path(), &table).unwrap();

        let text = std::fs::read_to_string(table_path(dir.path(), "t")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["name"], "t");
        assert_eq!(json["columns"][0]["name"], "a");
        assert_eq!(json["columns"][0]["col_type"], "int");
        assert_eq!(json["columns"][0]["is_primary_key"], true);
        assert_eq!(json["rows"][0]["a"], 5);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_table(&path).is_err());
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_table_file(dir.path(), "ghost").is_ok());
    }
}
