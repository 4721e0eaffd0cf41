//! Statement executor
//!
//! Runs parsed statements against a [`Database`]. Mutating statements
//! persist the touched table before returning, so every acknowledged
//! write is on disk.

use super::result::QueryResult;
use crate::catalog::Column;
use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::sql::Parser;
use crate::storage::{Database, Row, RowId, Table, Value};
use std::cmp::Ordering;
use tracing::debug;

/// Statement executor bound to one database
pub struct Executor {
    db: Database,
}

impl Executor {
    /// Create an executor for a database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The underlying database
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The underlying database, mutably
    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Parse and execute one statement
    pub fn execute(&mut self, input: &str) -> Result<QueryResult> {
        let statement = Parser::new(input)?.parse()?;
        debug!(?statement, "executing");

        match statement {
            Statement::CreateTable(stmt) => self.execute_create_table(stmt),
            Statement::Insert(stmt) => self.execute_insert(stmt),
            Statement::Select(stmt) => self.execute_select(stmt),
            Statement::Update(stmt) => self.execute_update(stmt),
            Statement::Delete(stmt) => self.execute_delete(stmt),
        }
    }

    /// Execute one statement, always producing a line of output. Errors
    /// render as "Syntax Error: ..." or "Error: ..." instead of
    /// propagating; this is the contract of the textual interface.
    pub fn execute_line(&mut self, input: &str) -> String {
        match self.execute(input) {
            Ok(result) => result.render(),
            Err(e) => e.render(),
        }
    }

    // ========== Statement Execution ==========

    fn execute_create_table(&mut self, stmt: CreateTableStatement) -> Result<QueryResult> {
        let pk_not_null = self.db.options().pk_implies_not_null;

        let columns: Vec<Column> = stmt
            .columns
            .into_iter()
            .map(|def| {
                let nullable = !(def.not_null || (def.primary_key && pk_not_null));
                Column::new(def.name, def.col_type)
                    .primary_key(def.primary_key)
                    .unique(def.unique)
                    .nullable(nullable)
            })
            .collect();

        self.db.create_table(&stmt.table_name, columns)?;

        Ok(QueryResult::with_message(format!(
            "Table '{}' created.",
            stmt.table_name
        )))
    }

    fn execute_insert(&mut self, stmt: InsertStatement) -> Result<QueryResult> {
        let row: Row = stmt
            .columns
            .into_iter()
            .zip(stmt.values.into_iter().map(literal_to_value))
            .collect();

        self.db.get_table_mut(&stmt.table_name)?.insert(row)?;
        self.db.save_table(&stmt.table_name)?;

        Ok(QueryResult::with_affected_rows(1, "1 row inserted."))
    }

    fn execute_update(&mut self, stmt: UpdateStatement) -> Result<QueryResult> {
        let changes: Row = stmt
            .assignments
            .into_iter()
            .map(|a| (a.column, literal_to_value(a.value)))
            .collect();

        let table = self.db.get_table_mut(&stmt.table_name)?;
        let ids = matching_ids(table, stmt.where_clause.as_ref())?;
        let updated = table.update_rows(&ids, &changes)?;

        if updated > 0 {
            self.db.save_table(&stmt.table_name)?;
        }

        Ok(QueryResult::with_affected_rows(
            updated,
            format!("{} rows updated.", updated),
        ))
    }

    fn execute_delete(&mut self, stmt: DeleteStatement) -> Result<QueryResult> {
        let table = self.db.get_table_mut(&stmt.table_name)?;
        let ids = matching_ids(table, stmt.where_clause.as_ref())?;
        let deleted = table.delete_rows(&ids);

        if deleted > 0 {
            self.db.save_table(&stmt.table_name)?;
        }

        Ok(QueryResult::with_affected_rows(
            deleted,
            format!("{} rows deleted.", deleted),
        ))
    }

    fn execute_select(&self, stmt: SelectStatement) -> Result<QueryResult> {
        let base = self.db.get_table(&stmt.table_name)?;

        // WHERE filters the base table before any join.
        let ids = matching_ids(base, stmt.where_clause.as_ref())?;
        let mut rows: Vec<Row> = ids
            .iter()
            .filter_map(|&id| base.get_row(id).cloned())
            .collect();

        // Output column names for the wildcard projection: base columns
        // bare, joined columns qualified.
        let mut all_columns: Vec<String> = base
            .schema()
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        if let Some(join) = &stmt.join {
            let right = self.db.get_table(&join.table_name)?;
            validate_condition(
                &join.on,
                &stmt.table_name,
                base,
                Some((right, join.table_name.as_str())),
            )?;

            all_columns.extend(
                right
                    .schema()
                    .column_names()
                    .iter()
                    .map(|c| format!("{}.{}", join.table_name, c)),
            );

            let mut joined = Vec::new();
            for left_row in &rows {
                for right_row in right.rows() {
                    let merged = merge_rows(left_row, right_row, &join.table_name);
                    if eval_condition(&join.on, &merged, &stmt.table_name)? {
                        joined.push(merged);
                    }
                }
            }
            rows = joined;
        }

        let (columns, output) = match &stmt.projection {
            Projection::Wildcard => {
                let output = rows
                    .iter()
                    .map(|row| {
                        all_columns
                            .iter()
                            .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                            .collect()
                    })
                    .collect();
                (all_columns, output)
            }
            Projection::Columns(refs) => {
                let columns: Vec<String> = refs.iter().map(ColumnRef::to_string).collect();
                let mut output = Vec::with_capacity(rows.len());
                for row in &rows {
                    let mut cells = Vec::with_capacity(refs.len());
                    for cref in refs {
                        let value = resolve_column(row, &stmt.table_name, cref)
                            .ok_or_else(|| column_not_found(cref, &stmt.table_name))?;
                        cells.push(value.clone());
                    }
                    output.push(cells);
                }
                // Column references must exist even when nothing matched.
                if rows.is_empty() {
                    for cref in refs {
                        validate_ref(cref, &stmt.table_name, base, join_pair(&stmt, self)?)?;
                    }
                }
                (columns, output)
            }
        };

        Ok(QueryResult::with_rows(columns, output))
    }
}

/// The join table and its name, if the statement has one
fn join_pair<'a>(
    stmt: &'a SelectStatement,
    exec: &'a Executor,
) -> Result<Option<(&'a Table, &'a str)>> {
    match &stmt.join {
        Some(join) => Ok(Some((
            exec.db.get_table(&join.table_name)?,
            join.table_name.as_str(),
        ))),
        None => Ok(None),
    }
}

/// Convert a parsed literal to a stored value
fn literal_to_value(literal: Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(b),
        Literal::Int(n) => Value::Int(n),
        Literal::Float(n) => Value::Float(n),
        Literal::Str(s) => Value::Str(s),
    }
}

/// Merge a base row with a joined row; joined columns get qualified keys
fn merge_rows(left: &Row, right: &Row, right_table: &str) -> Row {
    let mut merged = left.clone();
    for (name, value) in right {
        merged.insert(format!("{}.{}", right_table, name), value.clone());
    }
    merged
}

/// Row ids matching a condition, in insertion order. An equality test of
/// an indexed column against a literal short-circuits to a point lookup.
fn matching_ids(table: &Table, condition: Option<&Condition>) -> Result<Vec<RowId>> {
    let Some(condition) = condition else {
        return Ok(table.rows_with_ids().map(|(id, _)| id).collect());
    };

    validate_condition(condition, table.name(), table, None)?;

    if let Some((column, value)) = point_lookup(condition, table) {
        return Ok(table.find_by_index(&column, &value).into_iter().collect());
    }

    let mut ids = Vec::new();
    for (id, row) in table.rows_with_ids() {
        if eval_condition(condition, row, table.name())? {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Recognize `indexed_column = literal` and return the lookup pair.
/// The probe must agree with what a scan would match, so it only fires
/// when the literal already has the column's stored representation;
/// cross-type comparisons (int literal against a float column, etc.)
/// fall back to the scan.
fn point_lookup(condition: &Condition, table: &Table) -> Option<(String, Value)> {
    let Condition::Compare {
        left: Operand::Column(cref),
        op: CompareOp::Eq,
        right: Operand::Literal(literal),
    } = condition
    else {
        return None;
    };

    if cref.table.as_deref().is_some_and(|t| t != table.name()) {
        return None;
    }
    let column = table.schema().get_column(&cref.column)?;
    if !column.is_indexed() {
        return None;
    }

    let value = literal_to_value(literal.clone());
    if value.coerce_to(column.col_type)? != value {
        return None;
    }
    Some((column.name.clone(), value))
}

/// Check every column reference in a condition against the available
/// schemas, so an unknown column errors even on an empty table.
fn validate_condition(
    condition: &Condition,
    base_name: &str,
    base: &Table,
    join: Option<(&Table, &str)>,
) -> Result<()> {
    match condition {
        Condition::And(left, right) => {
            validate_condition(left, base_name, base, join)?;
            validate_condition(right, base_name, base, join)
        }
        Condition::Compare { left, right, .. } => {
            for operand in [left, right] {
                if let Operand::Column(cref) = operand {
                    validate_ref(cref, base_name, base, join)?;
                }
            }
            Ok(())
        }
    }
}

fn validate_ref(
    cref: &ColumnRef,
    base_name: &str,
    base: &Table,
    join: Option<(&Table, &str)>,
) -> Result<()> {
    let known = match &cref.table {
        // Bare names resolve against the base table.
        None => base.schema().has_column(&cref.column),
        Some(table) if table == base_name => base.schema().has_column(&cref.column),
        Some(table) => match join {
            Some((right, right_name)) if table == right_name => {
                right.schema().has_column(&cref.column)
            }
            _ => false,
        },
    };

    if known {
        Ok(())
    } else {
        Err(column_not_found(cref, base_name))
    }
}

fn column_not_found(cref: &ColumnRef, base_name: &str) -> Error {
    let table = cref.table.clone().unwrap_or_else(|| base_name.to_string());
    Error::ColumnNotFound(cref.column.clone(), table)
}

/// Look a column reference up in a (possibly merged) row. Qualified
/// references to the base table fall back to the bare key.
fn resolve_column<'a>(row: &'a Row, base_name: &str, cref: &ColumnRef) -> Option<&'a Value> {
    match &cref.table {
        None => row.get(&cref.column),
        Some(table) => {
            let qualified = format!("{}.{}", table, cref.column);
            row.get(&qualified).or_else(|| {
                if table == base_name {
                    row.get(&cref.column)
                } else {
                    None
                }
            })
        }
    }
}

/// Evaluate a condition against one row
fn eval_condition(condition: &Condition, row: &Row, base_name: &str) -> Result<bool> {
    match condition {
        Condition::And(left, right) => {
            Ok(eval_condition(left, row, base_name)? && eval_condition(right, row, base_name)?)
        }
        Condition::Compare { left, op, right } => {
            let lhs = operand_value(left, row, base_name)?;
            let rhs = operand_value(right, row, base_name)?;
            Ok(compare_values(&lhs, *op, &rhs))
        }
    }
}

fn operand_value(operand: &Operand, row: &Row, base_name: &str) -> Result<Value> {
    match operand {
        Operand::Literal(literal) => Ok(literal_to_value(literal.clone())),
        Operand::Column(cref) => resolve_column(row, base_name, cref)
            .cloned()
            .ok_or_else(|| column_not_found(cref, base_name)),
    }
}

/// Comparison semantics: NULL equals only NULL, never orders; integers
/// and floats compare numerically; mismatched types never match.
fn compare_values(left: &Value, op: CompareOp, right: &Value) -> bool {
    let equal = (left.is_null() && right.is_null())
        || left.compare(right) == Some(Ordering::Equal);

    match op {
        CompareOp::Eq => equal,
        CompareOp::Neq => !equal,
        CompareOp::Lt => left.compare(right) == Some(Ordering::Less),
        CompareOp::Gt => left.compare(right) == Some(Ordering::Greater),
        CompareOp::Lte => matches!(
            left.compare(right),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ),
        CompareOp::Gte => matches!(
            left.compare(right),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn executor() -> (TempDir, Executor) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        (dir, Executor::new(db))
    }

    fn seeded() -> (TempDir, Executor) {
        let (dir, mut exec) = executor();
        exec.execute("CREATE TABLE users (id int PRIMARY KEY, name str NOT NULL, age int)")
            .unwrap();
        exec.execute("INSERT INTO users (id, name, age) VALUES (1, 'alice', 30)")
            .unwrap();
        exec.execute("INSERT INTO users (id, name, age) VALUES (2, 'bob', 25)")
            .unwrap();
        exec.execute("INSERT INTO users (id, name) VALUES (3, 'carol')")
            .unwrap();
        (dir, exec)
    }

    #[test]
    fn test_create_and_insert_messages() {
        let (_dir, mut exec) = executor();
        assert_eq!(
            exec.execute_line("CREATE TABLE t (id int PRIMARY KEY, v str)"),
            "Table 't' created."
        );
        assert_eq!(
            exec.execute_line("INSERT INTO t (id, v) VALUES (1, 'x')"),
            "1 row inserted."
        );
    }

    #[test]
    fn test_select_all() {
        let (_dir, mut exec) = seeded();
        let out = exec.execute_line("SELECT * FROM users");
        assert_eq!(
            out,
            "id\tname\tage\n1\talice\t30\n2\tbob\t25\n3\tcarol\tNULL"
        );
    }

    #[test]
    fn test_select_projection_order() {
        let (_dir, mut exec) = seeded();
        let out = exec.execute_line("SELECT name, id FROM users WHERE id = 1");
        assert_eq!(out, "name\tid\nalice\t1");
    }

    #[test]
    fn test_select_empty_set() {
        let (_dir, mut exec) = seeded();
        assert_eq!(
            exec.execute_line("SELECT * FROM users WHERE id = 99"),
            "Empty set"
        );
    }

    #[test]
    fn test_select_where_comparisons() {
        let (_dir, mut exec) = seeded();
        let result = exec.execute("SELECT id FROM users WHERE age >= 25").unwrap();
        // carol's NULL age never satisfies an ordering comparison.
        assert_eq!(result.rows.len(), 2);

        let result = exec
            .execute("SELECT id FROM users WHERE age > 25 AND name != 'bob'")
            .unwrap();
        assert_eq!(result.rows, vec![vec![Value::Int(1)]]);
    }

    #[test]
    fn test_where_null_semantics() {
        let (_dir, mut exec) = seeded();
        let result = exec.execute("SELECT id FROM users WHERE age = NULL").unwrap();
        assert_eq!(result.rows, vec![vec![Value::Int(3)]]);

        let result = exec
            .execute("SELECT id FROM users WHERE age != NULL")
            .unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_update() {
        let (_dir, mut exec) = seeded();
        assert_eq!(
            exec.execute_line("UPDATE users SET age = 26 WHERE name = 'bob'"),
            "1 rows updated."
        );
        let result = exec.execute("SELECT age FROM users WHERE id = 2").unwrap();
        assert_eq!(result.rows, vec![vec![Value::Int(26)]]);
    }

    #[test]
    fn test_update_without_where_hits_all_rows() {
        let (_dir, mut exec) = seeded();
        assert_eq!(exec.execute_line("UPDATE users SET age = 1"), "3 rows updated.");
    }

    #[test]
    fn test_delete() {
        let (_dir, mut exec) = seeded();
        assert_eq!(
            exec.execute_line("DELETE FROM users WHERE id = 2"),
            "1 rows deleted."
        );
        assert_eq!(
            exec.execute_line("DELETE FROM users WHERE id = 2"),
            "0 rows deleted."
        );
        let result = exec.execute("SELECT * FROM users").unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_join() {
        let (_dir, mut exec) = seeded();
        exec.execute("CREATE TABLE orders (oid int PRIMARY KEY, user_id int, total float)")
            .unwrap();
        exec.execute("INSERT INTO orders (oid, user_id, total) VALUES (10, 1, 9.5)")
            .unwrap();
        exec.execute("INSERT INTO orders (oid, user_id, total) VALUES (11, 2, 3.0)")
            .unwrap();
        exec.execute("INSERT INTO orders (oid, user_id, total) VALUES (12, 1, 1.25)")
            .unwrap();

        let result = exec
            .execute(
                "SELECT name, orders.total FROM users JOIN orders ON users.id = orders.user_id \
                 WHERE id = 1",
            )
            .unwrap();
        assert_eq!(result.columns, vec!["name", "orders.total"]);
        assert_eq!(
            result.rows,
            vec![
                vec![Value::from("alice"), Value::Float(9.5)],
                vec![Value::from("alice"), Value::Float(1.25)],
            ]
        );
    }

    #[test]
    fn test_join_wildcard_qualifies_right_columns() {
        let (_dir, mut exec) = seeded();
        exec.execute("CREATE TABLE pets (pid int PRIMARY KEY, owner int)")
            .unwrap();
        exec.execute("INSERT INTO pets (pid, owner) VALUES (1, 3)")
            .unwrap();

        let result = exec
            .execute("SELECT * FROM users JOIN pets ON id = pets.owner")
            .unwrap();
        assert_eq!(
            result.columns,
            vec!["id", "name", "age", "pets.pid", "pets.owner"]
        );
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0][1], Value::from("carol"));
    }

    #[test]
    fn test_errors_render_with_prefixes() {
        let (_dir, mut exec) = seeded();
        assert_eq!(
            exec.execute_line("SELECT FROM users"),
            "Syntax Error: unexpected token 'FROM', expected an identifier"
        );
        assert!(exec
            .execute_line("SELECT * FROM missing")
            .starts_with("Error: table 'missing' not found"));
        assert!(exec
            .execute_line("SELECT nope FROM users")
            .starts_with("Error: column 'nope' not found"));
    }

    #[test]
    fn test_unknown_column_in_where_errors_even_when_empty() {
        let (_dir, mut exec) = executor();
        exec.execute("CREATE TABLE t (id int PRIMARY KEY)").unwrap();
        assert!(exec
            .execute_line("SELECT * FROM t WHERE ghost = 1")
            .starts_with("Error: column 'ghost' not found"));
    }

    #[test]
    fn test_constraint_violations_keep_counts() {
        let (_dir, mut exec) = seeded();
        assert!(exec
            .execute_line("INSERT INTO users (id, name) VALUES (1, 'dup')")
            .starts_with("Error: duplicate value"));
        assert!(exec
            .execute_line("INSERT INTO users (id) VALUES (9)")
            .starts_with("Error: column 'name' cannot be null"));
        let result = exec.execute("SELECT * FROM users").unwrap();
        assert_eq!(result.rows.len(), 3);
    }

    #[test]
    fn test_insert_coercion_error() {
        let (_dir, mut exec) = seeded();
        assert!(exec
            .execute_line("INSERT INTO users (id, name) VALUES ('nine!', 'x')")
            .starts_with("Error: column 'id' expects int"));
    }

    #[test]
    fn test_point_lookup_uses_index() {
        let (_dir, mut exec) = seeded();
        // Same result whether the planner scans or probes the index.
        let result = exec.execute("SELECT name FROM users WHERE id = 2").unwrap();
        assert_eq!(result.rows, vec![vec![Value::from("bob")]]);
    }

    #[test]
    fn test_pk_implies_not_null_by_default() {
        let (_dir, mut exec) = executor();
        exec.execute("CREATE TABLE t (id int PRIMARY KEY, v str)")
            .unwrap();
        assert!(exec
            .execute_line("INSERT INTO t (v) VALUES ('x')")
            .starts_with("Error: column 'id' cannot be null"));
    }

    #[test]
    fn test_permissive_nullable_pk_option() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with_options(
            dir.path(),
            crate::storage::DatabaseOptions {
                pk_implies_not_null: false,
            },
        )
        .unwrap();
        let mut exec = Executor::new(db);

        exec.execute("CREATE TABLE t (id int PRIMARY KEY, v str)")
            .unwrap();
        // NULL keys are allowed and bypass uniqueness.
        assert_eq!(exec.execute_line("INSERT INTO t (v) VALUES ('x')"), "1 row inserted.");
        assert_eq!(exec.execute_line("INSERT INTO t (v) VALUES ('y')"), "1 row inserted.");
        let result = exec.execute("SELECT * FROM t").unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_mutations_persist_across_reopen() {
        let (dir, mut exec) = seeded();
        exec.execute("UPDATE users SET age = 31 WHERE id = 1").unwrap();
        exec.execute("DELETE FROM users WHERE id = 2").unwrap();
        drop(exec);

        let db = Database::open(dir.path()).unwrap();
        let mut exec = Executor::new(db);
        let out = exec.execute_line("SELECT * FROM users");
        assert_eq!(out, "id\tname\tage\n1\talice\t31\n3\tcarol\tNULL");
    }
}
