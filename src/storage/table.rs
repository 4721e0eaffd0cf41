//! Table storage engine
//!
//! A table owns its schema, its rows, and one equality index per primary
//! key or unique column. Rows are keyed by a synthetic [`RowId`] that is
//! stable for the life of the row, so deletes never shift other rows and
//! index maintenance is incremental.

use super::value::{Row, Value};
use crate::catalog::{Column, Schema};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Stable per-row identifier, assigned at insert and never reused
pub type RowId = u64;

/// A single table: schema, rows, and equality indexes
#[derive(Debug)]
pub struct Table {
    /// Table name
    name: String,
    /// Table schema
    schema: Schema,
    /// Rows in insertion order, keyed by stable id
    rows: IndexMap<RowId, Row>,
    /// Equality indexes: column name -> value -> row id.
    /// NULL values are never indexed.
    indexes: HashMap<String, HashMap<Value, RowId>>,
    /// Next row id to assign
    next_row_id: RowId,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        let schema = Schema::from_columns(&name, columns)?;
        let indexes = schema
            .indexed_columns()
            .map(|c| (c.name.clone(), HashMap::new()))
            .collect();

        Ok(Self {
            name,
            schema,
            rows: IndexMap::new(),
            indexes,
            next_row_id: 0,
        })
    }

    /// Rebuild a table from persisted parts. Rows are taken as stored
    /// (they were validated when written); indexes are rebuilt from
    /// scratch, with the last row winning on a stale duplicate.
    pub fn from_rows(name: impl Into<String>, columns: Vec<Column>, rows: Vec<Row>) -> Result<Self> {
        let mut table = Table::new(name, columns)?;

        for stored in rows {
            let mut row = Row::new();
            for col in table.schema.columns() {
                let value = stored.get(&col.name).cloned().unwrap_or(Value::Null);
                row.insert(col.name.clone(), value);
            }

            let id = table.next_row_id;
            table.next_row_id += 1;
            table.add_index_entries(id, &row);
            table.rows.insert(id, row);
        }

        Ok(table)
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate rows in insertion order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Iterate (id, row) pairs in insertion order
    pub fn rows_with_ids(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|(&id, row)| (id, row))
    }

    /// Point lookup through an equality index. Returns `None` when the
    /// column is not indexed or the value is absent.
    pub fn find_by_index(&self, column: &str, value: &Value) -> Option<RowId> {
        if value.is_null() {
            return None;
        }
        self.indexes.get(column)?.get(value).copied()
    }

    /// Get a row by id
    pub fn get_row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    // ========== Mutations ==========

    /// Insert a row. The input maps column names to values in any order;
    /// missing columns become NULL. Validates types, nullability, and
    /// uniqueness before anything is stored.
    pub fn insert(&mut self, input: Row) -> Result<()> {
        let row = self.normalize(input)?;

        // Uniqueness against the indexes; NULL bypasses the check.
        for col in self.schema.indexed_columns() {
            let value = &row[&col.name];
            if value.is_null() {
                continue;
            }
            if let Some(index) = self.indexes.get(&col.name) {
                if index.contains_key(value) {
                    return Err(Error::UniqueViolation {
                        column: col.name.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }

        let id = self.next_row_id;
        self.next_row_id += 1;
        self.add_index_entries(id, &row);
        self.rows.insert(id, row);

        Ok(())
    }

    /// Delete the given rows, returning how many existed. Index entries
    /// for the dead rows are stripped in place.
    pub fn delete_rows(&mut self, ids: &[RowId]) -> usize {
        let mut deleted = 0;
        for &id in ids {
            // shift_remove keeps the remaining rows in insertion order
            if let Some(row) = self.rows.shift_remove(&id) {
                self.remove_index_entries(&row);
                deleted += 1;
            }
        }
        deleted
    }

    /// Apply the same set of column assignments to every given row.
    /// All-or-nothing: the whole batch is validated first, and on any
    /// violation no row is touched.
    pub fn update_rows(&mut self, ids: &[RowId], changes: &Row) -> Result<usize> {
        // Validate column names, types, and nullability once; the
        // assignments are literals so the coerced value is shared.
        let mut coerced = Row::new();
        for (name, value) in changes {
            let col = self
                .schema
                .get_column(name)
                .ok_or_else(|| Error::ColumnNotFound(name.clone(), self.name.clone()))?;
            let value = value
                .coerce_to(col.col_type)
                .ok_or_else(|| Error::Coercion {
                    column: col.name.clone(),
                    expected: type_name(col),
                    value: value.to_string(),
                })?;
            if value.is_null() && !col.nullable {
                return Err(Error::NullViolation(col.name.clone()));
            }
            coerced.insert(name.clone(), value);
        }

        let live_ids: Vec<RowId> = ids.iter().copied().filter(|id| self.rows.contains_key(id)).collect();

        // Nothing matched: a no-op, not a constraint check.
        if live_ids.is_empty() {
            return Ok(0);
        }

        // Uniqueness: assigning one non-null value to an indexed column
        // collides as soon as two rows receive it, or any untouched row
        // already holds it.
        for (name, value) in &coerced {
            if value.is_null() {
                continue;
            }
            let Some(index) = self.indexes.get(name) else {
                continue;
            };
            if live_ids.len() > 1 {
                return Err(Error::UniqueViolation {
                    column: name.clone(),
                    value: value.to_string(),
                });
            }
            if let Some(&holder) = index.get(value) {
                if !live_ids.contains(&holder) {
                    return Err(Error::UniqueViolation {
                        column: name.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }

        // Apply, moving index entries for changed indexed columns.
        for &id in &live_ids {
            if let Some(row) = self.rows.get_mut(&id) {
                for (name, value) in &coerced {
                    let old = row.insert(name.clone(), value.clone());
                    if let Some(index) = self.indexes.get_mut(name) {
                        if let Some(old) = old {
                            if !old.is_null() {
                                index.remove(&old);
                            }
                        }
                        if !value.is_null() {
                            index.insert(value.clone(), id);
                        }
                    }
                }
            }
        }

        Ok(live_ids.len())
    }

    // ========== Internals ==========

    /// Validate an input row against the schema and produce a complete
    /// row in schema column order.
    fn normalize(&self, input: Row) -> Result<Row> {
        for name in input.keys() {
            if !self.schema.has_column(name) {
                return Err(Error::ColumnNotFound(name.clone(), self.name.clone()));
            }
        }

        let mut row = Row::new();
        for col in self.schema.columns() {
            let value = match input.get(&col.name) {
                Some(value) => value.coerce_to(col.col_type).ok_or_else(|| Error::Coercion {
                    column: col.name.clone(),
                    expected: type_name(col),
                    value: value.to_string(),
                })?,
                None => Value::Null,
            };

            if value.is_null() && !col.nullable {
                return Err(Error::NullViolation(col.name.clone()));
            }
            row.insert(col.name.clone(), value);
        }

        Ok(row)
    }

    fn add_index_entries(&mut self, id: RowId, row: &Row) {
        for (name, index) in &mut self.indexes {
            if let Some(value) = row.get(name) {
                if !value.is_null() {
                    index.insert(value.clone(), id);
                }
            }
        }
    }

    fn remove_index_entries(&mut self, row: &Row) {
        for (name, index) in &mut self.indexes {
            if let Some(value) = row.get(name) {
                if !value.is_null() {
                    index.remove(value);
                }
            }
        }
    }
}

fn type_name(col: &Column) -> &'static str {
    match col.col_type {
        crate::catalog::DataType::Int => "int",
        crate::catalog::DataType::Float => "float",
        crate::catalog::DataType::Str => "str",
        crate::catalog::DataType::Bool => "bool",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;

    fn users_table() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", DataType::Int).primary_key(true).nullable(false),
                Column::new("name", DataType::Str).nullable(false),
                Column::new("email", DataType::Str).unique(true),
                Column::new("age", DataType::Int),
            ],
        )
        .unwrap()
    }

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_insert_and_normalize() {
        let mut table = users_table();
        table
            .insert(row(&[
                ("id", Value::Int(1)),
                ("name", Value::from("alice")),
            ]))
            .unwrap();

        assert_eq!(table.row_count(), 1);
        let stored = table.rows().next().unwrap();
        // Full schema, in declaration order, missing columns NULL.
        let keys: Vec<&str> = stored.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "email", "age"]);
        assert!(stored["email"].is_null());
    }

    #[test]
    fn test_insert_coerces_values() {
        let mut table = users_table();
        table
            .insert(row(&[
                ("id", Value::from("7")),
                ("name", Value::from("bob")),
                ("age", Value::Float(30.9)),
            ]))
            .unwrap();

        let stored = table.rows().next().unwrap();
        assert_eq!(stored["id"], Value::Int(7));
        assert_eq!(stored["age"], Value::Int(30));
    }

    #[test]
    fn test_insert_rejects_bad_coercion() {
        let mut table = users_table();
        let result = table.insert(row(&[
            ("id", Value::from("seven")),
            ("name", Value::from("bob")),
        ]));
        assert!(matches!(result, Err(Error::Coercion { .. })));
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_insert_rejects_unknown_column() {
        let mut table = users_table();
        let result = table.insert(row(&[("nope", Value::Int(1))]));
        assert!(matches!(result, Err(Error::ColumnNotFound(_, _))));
    }

    #[test]
    fn test_null_violation() {
        let mut table = users_table();
        let result = table.insert(row(&[("id", Value::Int(1))]));
        assert!(matches!(result, Err(Error::NullViolation(col)) if col == "name"));
    }

    #[test]
    fn test_unique_violation() {
        let mut table = users_table();
        table
            .insert(row(&[
                ("id", Value::Int(1)),
                ("name", Value::from("alice")),
                ("email", Value::from("a@x.com")),
            ]))
            .unwrap();
        let result = table.insert(row(&[
            ("id", Value::Int(2)),
            ("name", Value::from("bob")),
            ("email", Value::from("a@x.com")),
        ]));
        assert!(matches!(result, Err(Error::UniqueViolation { .. })));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_null_bypasses_unique() {
        let mut table = users_table();
        for id in 1..=2 {
            table
                .insert(row(&[
                    ("id", Value::Int(id)),
                    ("name", Value::from("x")),
                ]))
                .unwrap();
        }
        // Two rows with NULL email coexist.
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_delete_keeps_indexes_usable() {
        let mut table = users_table();
        for id in 1..=3 {
            table
                .insert(row(&[
                    ("id", Value::Int(id)),
                    ("name", Value::from("x")),
                ]))
                .unwrap();
        }

        let target = table.find_by_index("id", &Value::Int(2)).unwrap();
        assert_eq!(table.delete_rows(&[target]), 1);
        assert_eq!(table.row_count(), 2);

        // Deleted id is gone from the index, survivors still resolve.
        assert!(table.find_by_index("id", &Value::Int(2)).is_none());
        assert!(table.find_by_index("id", &Value::Int(3)).is_some());

        // The freed value can be inserted again.
        table
            .insert(row(&[("id", Value::Int(2)), ("name", Value::from("y"))]))
            .unwrap();
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_update_moves_index_entries() {
        let mut table = users_table();
        table
            .insert(row(&[
                ("id", Value::Int(1)),
                ("name", Value::from("alice")),
                ("email", Value::from("a@x.com")),
            ]))
            .unwrap();

        let id = table.find_by_index("id", &Value::Int(1)).unwrap();
        let changes = row(&[("email", Value::from("new@x.com"))]);
        assert_eq!(table.update_rows(&[id], &changes).unwrap(), 1);

        assert!(table.find_by_index("email", &Value::from("a@x.com")).is_none());
        assert_eq!(
            table.find_by_index("email", &Value::from("new@x.com")),
            Some(id)
        );
    }

    #[test]
    fn test_update_unique_collision_is_atomic() {
        let mut table = users_table();
        for id in 1..=2 {
            table
                .insert(row(&[
                    ("id", Value::Int(id)),
                    ("name", Value::from("x")),
                ]))
                .unwrap();
        }

        // Assigning one indexed value to two rows must collide and
        // leave both rows untouched.
        let ids: Vec<RowId> = table.rows_with_ids().map(|(id, _)| id).collect();
        let changes = row(&[("email", Value::from("same@x.com"))]);
        let result = table.update_rows(&ids, &changes);
        assert!(matches!(result, Err(Error::UniqueViolation { .. })));
        for r in table.rows() {
            assert!(r["email"].is_null());
        }
    }

    #[test]
    fn test_update_matching_no_rows_is_a_noop() {
        let mut table = users_table();
        table
            .insert(row(&[
                ("id", Value::Int(1)),
                ("name", Value::from("alice")),
            ]))
            .unwrap();

        // No matched rows: the held value is irrelevant, count is 0.
        let changes = row(&[("id", Value::Int(1))]);
        assert_eq!(table.update_rows(&[], &changes).unwrap(), 0);
        let stale = row(&[("id", Value::Int(99))]);
        assert_eq!(table.update_rows(&[42], &stale).unwrap(), 0);
        assert_eq!(table.rows().next().unwrap()["id"], Value::Int(1));
    }

    #[test]
    fn test_update_same_row_keeps_its_value() {
        let mut table = users_table();
        table
            .insert(row(&[
                ("id", Value::Int(1)),
                ("name", Value::from("alice")),
                ("email", Value::from("a@x.com")),
            ]))
            .unwrap();

        // Re-assigning a row its own indexed value is not a collision.
        let id = table.find_by_index("id", &Value::Int(1)).unwrap();
        let changes = row(&[("email", Value::from("a@x.com"))]);
        assert_eq!(table.update_rows(&[id], &changes).unwrap(), 1);
    }

    #[test]
    fn test_from_rows_rebuilds_indexes() {
        let stored = vec![
            row(&[
                ("id", Value::Int(1)),
                ("name", Value::from("alice")),
                ("email", Value::from("a@x.com")),
                ("age", Value::Null),
            ]),
            row(&[
                ("id", Value::Int(2)),
                ("name", Value::from("bob")),
                ("email", Value::Null),
                ("age", Value::Int(40)),
            ]),
        ];
        let table = Table::from_rows(
            "users",
            users_table().schema().columns().to_vec(),
            stored,
        )
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert!(table.find_by_index("id", &Value::Int(2)).is_some());
        assert!(table
            .find_by_index("email", &Value::from("a@x.com"))
            .is_some());
    }
}
