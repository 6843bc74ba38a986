//! Per-field filter expressions as they arrive on the wire
//!
//! Operators are independent optional flags: any combination may be present
//! on one field and they compose conjunctively. Values stay untyped
//! (`serde_json::Value`) until the operator compiler runs them through the
//! resolved field's [`ColumnType`].

use super::column_type::ColumnType;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Filter operators attached to one field path
///
/// # Example
/// ```
/// use sieve::core::filter::FilterExpression;
/// use serde_json::json;
///
/// let adults = FilterExpression {
///     gte: Some(json!("18")),
///     lt: Some(json!("30")),
///     ..Default::default()
/// };
/// let wire = serde_json::to_value(&adults).unwrap();
/// assert_eq!(wire, json!({ "gte": "18", "lt": "30" }));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterExpression {
    /// Declared type code, overriding the type inferred from the shape
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub eq: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub ne: Option<Value>,

    /// Set membership; may contain `null` to also match null fields
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub in_values: Option<Vec<Value>>,

    #[serde(rename = "nin", default, skip_serializing_if = "Option::is_none")]
    pub nin_values: Option<Vec<Value>>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// `%` wildcard pattern, matched case-insensitively
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,

    #[serde(rename = "isNull", default, skip_serializing_if = "Option::is_none")]
    pub is_null: Option<bool>,

    #[serde(rename = "isEmpty", default, skip_serializing_if = "Option::is_none")]
    pub is_empty: Option<bool>,

    /// Null or empty
    #[serde(rename = "isVoid", default, skip_serializing_if = "Option::is_none")]
    pub is_void: Option<bool>,
}

impl FilterExpression {
    /// Whether no operator is set (the declared type alone does not count)
    pub fn has_no_operator(&self) -> bool {
        let FilterExpression {
            column_type: _,
            eq,
            ne,
            in_values,
            nin_values,
            gt,
            gte,
            lt,
            lte,
            regex,
            like,
            exists,
            is_null,
            is_empty,
            is_void,
        } = self;
        eq.is_none()
            && ne.is_none()
            && in_values.is_none()
            && nin_values.is_none()
            && gt.is_none()
            && gte.is_none()
            && lt.is_none()
            && lte.is_none()
            && regex.is_none()
            && like.is_none()
            && exists.is_none()
            && is_null.is_none()
            && is_empty.is_none()
            && is_void.is_none()
    }
}

/// Keep an explicit `null` as `Some(Value::Null)`; only absence maps to `None`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
