//! Query results
//!
//! This module defines the result of executing a statement and its
//! textual rendering.

use crate::storage::Value;

/// Result of executing a statement
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Output column names (SELECT only)
    pub columns: Vec<String>,
    /// Result rows, one vector of values per row
    pub rows: Vec<Vec<Value>>,
    /// Number of rows affected (INSERT/UPDATE/DELETE)
    pub affected_rows: usize,
    /// Status message (non-SELECT statements)
    pub message: Option<String>,
}

impl QueryResult {
    /// Create an empty result
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
            message: None,
        }
    }

    /// Create a result with a status message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// Create a result with a message and an affected-row count
    pub fn with_affected_rows(affected: usize, message: impl Into<String>) -> Self {
        Self {
            affected_rows: affected,
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// Create a row-set result
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            affected_rows: 0,
            message: None,
        }
    }

    /// Render per the textual interface: the status message for
    /// mutations, "Empty set" for an empty row set, otherwise a
    /// tab-separated header line followed by tab-separated rows with
    /// NULL spelled out.
    pub fn render(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        if self.rows.is_empty() {
            return "Empty set".to_string();
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.columns.join("\t"));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(Value::to_string).collect();
            lines.push(cells.join("\t"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_message() {
        let result = QueryResult::with_message("Table 'users' created.");
        assert_eq!(result.render(), "Table 'users' created.");
    }

    #[test]
    fn test_render_empty_set() {
        let result = QueryResult::with_rows(vec!["id".to_string()], Vec::new());
        assert_eq!(result.render(), "Empty set");
    }

    #[test]
    fn test_render_rows() {
        let result = QueryResult::with_rows(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![Value::Int(1), Value::from("alice")],
                vec![Value::Int(2), Value::Null],
            ],
        );
        assert_eq!(result.render(), "id\tname\n1\talice\n2\tNULL");
    }
}
