//! Closed set of column types and their literal converters
//!
//! Every filtered field is compiled against exactly one [`ColumnType`]. The
//! type decides which operators apply (range operators need
//! [`ColumnType::is_comparable`]) and how untyped wire literals become
//! [`FieldValue`]s. Conversion is best effort: a literal that does not parse
//! yields `None`, never an error.

use super::date;
use super::field::FieldValue;
use super::shape::{FieldKind, NativeType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const CODE_STRING: &str = "string";
const CODE_INTEGER: &str = "integer";
const CODE_DOUBLE: &str = "double";
const CODE_BOOLEAN: &str = "boolean";
const CODE_DATE: &str = "date";

/// Value type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    #[default]
    String,
    Integer,
    Double,
    Boolean,
    Date,
}

impl ColumnType {
    /// All variants, in declaration order
    pub const ALL: [ColumnType; 5] = [
        ColumnType::String,
        ColumnType::Integer,
        ColumnType::Double,
        ColumnType::Boolean,
        ColumnType::Date,
    ];

    /// Wire code of this type
    pub fn code(&self) -> &'static str {
        match self {
            ColumnType::String => CODE_STRING,
            ColumnType::Integer => CODE_INTEGER,
            ColumnType::Double => CODE_DOUBLE,
            ColumnType::Boolean => CODE_BOOLEAN,
            ColumnType::Date => CODE_DATE,
        }
    }

    /// Whether `gt`/`gte`/`lt`/`lte` apply to this type
    pub fn is_comparable(&self) -> bool {
        match self {
            ColumnType::String | ColumnType::Integer | ColumnType::Double | ColumnType::Date => {
                true
            }
            ColumnType::Boolean => false,
        }
    }

    /// Parse a wire code; unknown or empty codes default to `String`
    pub fn parse(code: &str) -> ColumnType {
        match code.trim().to_ascii_lowercase().as_str() {
            CODE_INTEGER => ColumnType::Integer,
            CODE_DOUBLE => ColumnType::Double,
            CODE_BOOLEAN => ColumnType::Boolean,
            CODE_DATE => ColumnType::Date,
            CODE_STRING | "" => ColumnType::String,
            other => {
                tracing::debug!(code = other, "unknown column type code, using string");
                ColumnType::String
            }
        }
    }

    /// Infer the column type from a field's declared native type
    pub fn from_native(native: &NativeType) -> ColumnType {
        match native {
            NativeType::String | NativeType::Char => ColumnType::String,
            NativeType::I8
            | NativeType::I16
            | NativeType::I32
            | NativeType::I64
            | NativeType::Isize
            | NativeType::U8
            | NativeType::U16
            | NativeType::U32
            | NativeType::U64
            | NativeType::Usize => ColumnType::Integer,
            NativeType::F32 | NativeType::F64 => ColumnType::Double,
            NativeType::Bool => ColumnType::Boolean,
            NativeType::Date | NativeType::DateTime => ColumnType::Date,
            NativeType::Array(inner) => {
                tracing::warn!(
                    element = %inner,
                    "array fields are not supported for filtering, treating as string"
                );
                ColumnType::String
            }
        }
    }

    /// Infer the column type of a field addressed as a path terminal
    ///
    /// Lists resolve to their element type. Embedded records have no scalar
    /// representation and fall back to `String`.
    pub fn from_kind(kind: &FieldKind) -> ColumnType {
        match kind {
            FieldKind::Scalar(native) => ColumnType::from_native(native),
            FieldKind::List(element) => ColumnType::from_kind(element),
            FieldKind::Record(shape) => {
                tracing::debug!(record = %shape.name, "record used as terminal field, using string");
                ColumnType::String
            }
        }
    }

    /// Convert an untyped literal into this type
    ///
    /// Returns `None` for JSON `null` and for anything that does not parse.
    pub fn try_convert(&self, raw: &Value) -> Option<FieldValue> {
        match self {
            ColumnType::String => convert_string(raw),
            ColumnType::Integer => convert_integer(raw),
            ColumnType::Double => convert_double(raw),
            ColumnType::Boolean => convert_boolean(raw),
            ColumnType::Date => convert_date(raw),
        }
    }

    /// Convert a textual literal into this type
    pub fn try_convert_str(&self, raw: &str) -> Option<FieldValue> {
        self.try_convert(&Value::String(raw.to_string()))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<String> for ColumnType {
    fn from(code: String) -> Self {
        ColumnType::parse(&code)
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.code().to_string()
    }
}

/// Text form of a scalar literal; containers and null have none
fn scalar_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn convert_string(raw: &Value) -> Option<FieldValue> {
    match raw {
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(FieldValue::String(raw.to_string())),
        _ => scalar_text(raw).map(FieldValue::String),
    }
}

fn convert_integer(raw: &Value) -> Option<FieldValue> {
    if let Some(i) = raw.as_i64() {
        return Some(FieldValue::Integer(i));
    }
    scalar_text(raw)?
        .parse::<i64>()
        .ok()
        .map(FieldValue::Integer)
}

fn convert_double(raw: &Value) -> Option<FieldValue> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        _ => scalar_text(raw)?.parse::<f64>().ok(),
    }?;
    // NaN and infinities cannot be stored or compared consistently
    parsed.is_finite().then_some(FieldValue::Double(parsed))
}

fn convert_boolean(raw: &Value) -> Option<FieldValue> {
    if let Value::Bool(b) = raw {
        return Some(FieldValue::Boolean(*b));
    }
    let text = scalar_text(raw)?;
    let value = match text.to_ascii_lowercase().as_str() {
        "true" | "1" => true,
        "false" | "0" => false,
        "null" => return None,
        // permissive fallback: anything that is not "true" reads as false
        _ => false,
    };
    Some(FieldValue::Boolean(value))
}

fn convert_date(raw: &Value) -> Option<FieldValue> {
    let parsed = match raw {
        Value::Number(n) => n.as_i64().and_then(date::from_epoch_millis),
        Value::String(s) => date::parse(s),
        _ => None,
    }?;
    Some(FieldValue::Date(parsed))
}
