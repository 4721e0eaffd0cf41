//! Value and Row types for MiniDB
//!
//! This module defines how data values are represented in memory and in the
//! persisted JSON files. Values serialize untagged, so the on-disk form is
//! the natural JSON scalar (`null`, `true`, `3`, `3.5`, `"abc"`).

use crate::catalog::DataType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A row: column name to value, in schema order
pub type Row = IndexMap<String, Value>;

/// A value in the database
///
/// Variant order matters: untagged deserialization tries variants top to
/// bottom, so `3` must hit `Int` before `Float`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Float value (64-bit)
    Float(f64),
    /// String value
    Str(String),
}

// PartialEq is manual so Float compares bitwise and the type can be a
// HashMap key for the equality indexes.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Str(v) => v.hash(state),
        }
    }
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    /// Coerce this value to a column type. Returns `None` when the value
    /// cannot represent the target type (the caller turns that into a
    /// coercion error naming the column). NULL passes through unchanged;
    /// nullability is checked separately.
    pub fn coerce_to(&self, target: DataType) -> Option<Value> {
        if self.is_null() {
            return Some(Value::Null);
        }

        match target {
            DataType::Int => match self {
                Value::Int(n) => Some(Value::Int(*n)),
                Value::Float(f) => Some(Value::Int(*f as i64)),
                Value::Bool(b) => Some(Value::Int(*b as i64)),
                Value::Str(s) => s.trim().parse::<i64>().ok().map(Value::Int),
                Value::Null => unreachable!(),
            },
            DataType::Float => match self {
                Value::Float(f) => Some(Value::Float(*f)),
                Value::Int(n) => Some(Value::Float(*n as f64)),
                Value::Bool(b) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
                Value::Str(s) => s.trim().parse::<f64>().ok().map(Value::Float),
                Value::Null => unreachable!(),
            },
            DataType::Str => Some(Value::Str(self.to_string())),
            DataType::Bool => match self {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::Int(n) => Some(Value::Bool(*n != 0)),
                Value::Float(f) => Some(Value::Bool(*f != 0.0)),
                Value::Str(s) => Some(Value::Bool(!s.is_empty())),
                Value::Null => unreachable!(),
            },
        }
    }

    /// Compare two values for ordering. `None` means the pair does not
    /// order: mismatched non-numeric types, or either side NULL. Integers
    /// and floats compare numerically across types.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,

            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),

            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),

            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),

            _ => None, // Incompatible types
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}
