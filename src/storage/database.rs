//! Database: the collection of tables backed by one directory
//!
//! Opening a database scans its directory for `*.json` table files and
//! loads each one. Unreadable or corrupt files are logged and skipped so
//! one bad file never takes the rest of the database down.

use super::disk;
use super::table::Table;
use crate::catalog::Column;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Tunable database behavior
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// When true, a PRIMARY KEY column is implicitly NOT NULL. The
    /// permissive setting keeps nullable primary keys, where a NULL key
    /// also bypasses the uniqueness check.
    pub pk_implies_not_null: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            pk_implies_not_null: true,
        }
    }
}

/// A database: named tables plus the directory that backs them
#[derive(Debug)]
pub struct Database {
    /// Directory holding the table files
    storage_dir: PathBuf,
    /// Loaded tables by name
    tables: IndexMap<String, Table>,
    /// Behavior options
    options: DatabaseOptions,
}

impl Database {
    /// Open a database with default options
    pub fn open(storage_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_options(storage_dir, DatabaseOptions::default())
    }

    /// Open a database, loading every table file in the directory. A
    /// missing directory is created on the first write, so opening an
    /// empty path yields an empty database.
    pub fn open_with_options(
        storage_dir: impl Into<PathBuf>,
        options: DatabaseOptions,
    ) -> Result<Self> {
        let storage_dir = storage_dir.into();
        let mut tables = IndexMap::new();

        if storage_dir.is_dir() {
            let mut paths: Vec<PathBuf> = fs::read_dir(&storage_dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .collect();
            paths.sort();

            for path in paths {
                match disk::load_table(&path) {
                    Ok(table) => {
                        debug!(table = table.name(), rows = table.row_count(), "loaded table");
                        tables.insert(table.name().to_string(), table);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable table file");
                    }
                }
            }
        }

        Ok(Self {
            storage_dir,
            tables,
            options,
        })
    }

    /// Behavior options
    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    /// Directory holding the table files
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Names of all loaded tables
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Check if a table exists
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a mutable table by name
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Create a table and persist it immediately
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<()> {
        if self.has_table(name) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }

        let table = Table::new(name, columns)?;
        disk::save_table(&self.storage_dir, &table)?;
        self.tables.insert(name.to_string(), table);

        Ok(())
    }

    /// Drop a table and delete its backing file
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        if self.tables.shift_remove(name).is_none() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        disk::remove_table_file(&self.storage_dir, name)
    }

    /// Persist a table after a mutation
    pub fn save_table(&self, name: &str) -> Result<()> {
        let table = self.get_table(name)?;
        disk::save_table(&self.storage_dir, table)
    }
}
