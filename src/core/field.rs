//! Typed field values produced by column type conversion

use super::column_type::ColumnType;
use super::date;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A literal that went through a [`ColumnType`] converter
///
/// `Null` only appears where a filter explicitly asks for a null marker;
/// failed conversions never produce a value at all.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// The column type this value belongs to, `None` for `Null`
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            FieldValue::String(_) => Some(ColumnType::String),
            FieldValue::Integer(_) => Some(ColumnType::Integer),
            FieldValue::Double(_) => Some(ColumnType::Double),
            FieldValue::Boolean(_) => Some(ColumnType::Boolean),
            FieldValue::Date(_) => Some(ColumnType::Date),
            FieldValue::Null => None,
        }
    }

    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Numeric view used to compare integers against doubles
    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Order two values of compatible types
    ///
    /// Integers and doubles compare numerically with each other. Any other
    /// mix of types (or `Null`) is unordered.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }

    /// JSON form, with dates in their canonical RFC 3339 text
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Double(d) => serde_json::Number::from_f64(*d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::Date(dt) => serde_json::Value::String(date::format(dt)),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for FieldValue {
    /// Canonical text, accepted back by the matching column type converter
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Double(d) => write!(f, "{}", d),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Date(dt) => write!(f, "{}", date::format(dt)),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(d: f64) -> Self {
        FieldValue::Double(d)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FieldValue::Date(dt)
    }
}
