//! Predicate evaluation over JSON documents
//!
//! Follows document-store conventions for arrays: a path crossing an array
//! fans out over its elements, and a test on an array-valued field holds
//! when it holds for any element. A missing field counts as null.

use crate::core::column_type::ColumnType;
use crate::core::date;
use crate::core::field::FieldValue;
use crate::core::path::FieldPath;
use crate::core::predicate::{CompareOp, Predicate, like_to_regex};
use crate::core::query::{Direction, SortOrder};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::cmp::Ordering;

/// Whether `document` satisfies `predicate`
pub fn matches(predicate: &Predicate, document: &Value) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,
        Predicate::Compare { field, op, value } => {
            let found = candidates(document, field);
            match op {
                CompareOp::Eq => found.iter().any(|c| equals(c, value)),
                CompareOp::Ne => !found.iter().any(|c| equals(c, value)),
                range => found.iter().any(|c| {
                    typed(c, value)
                        .and_then(|stored| stored.compare(value))
                        .is_some_and(|ordering| satisfies(*range, ordering))
                }),
            }
        }
        Predicate::In { field, values } => any_in(document, field, values),
        Predicate::NotIn { field, values } => !any_in(document, field, values),
        Predicate::Like { field, pattern } => {
            let regex = RegexBuilder::new(&like_to_regex(pattern))
                .case_insensitive(true)
                .build();
            match regex {
                Ok(regex) => any_text_match(document, field, &regex),
                Err(_) => false,
            }
        }
        Predicate::Regex { field, pattern } => match Regex::new(pattern) {
            Ok(regex) => any_text_match(document, field, &regex),
            Err(_) => false,
        },
        Predicate::Contains { field, needle } => {
            let needle = needle.to_lowercase();
            candidates(document, field)
                .iter()
                .filter_map(|c| text_of(c))
                .any(|text| text.to_lowercase().contains(&needle))
        }
        Predicate::Exists { field, exists } => !raw_values(document, field).is_empty() == *exists,
        Predicate::IsNull { field } => {
            let found = raw_values(document, field);
            found.is_empty() || found.iter().any(|v| v.is_null())
        }
        Predicate::IsEmpty { field } => raw_values(document, field).iter().any(|v| match v {
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }),
        Predicate::Nested { field, predicate } => candidates(document, field)
            .iter()
            .any(|element| matches(predicate, element)),
        Predicate::Not(inner) => !matches(inner, document),
        Predicate::And(parts) => parts.iter().all(|p| matches(p, document)),
        Predicate::Or(parts) => parts.iter().any(|p| matches(p, document)),
    }
}

/// Order two documents by the given sort keys
pub fn compare_documents(a: &Value, b: &Value, sort: &[SortOrder]) -> Ordering {
    for order in sort {
        let left = candidates(a, &order.field).into_iter().next();
        let right = candidates(b, &order.field).into_iter().next();
        let ordering = compare_json(left, right);
        let ordering = match order.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Values stored at `path`, arrays on the way fanned out, terminal arrays kept
fn raw_values<'a>(document: &'a Value, path: &FieldPath) -> Vec<&'a Value> {
    let mut out = Vec::new();
    collect(document, path.segments(), &mut out);
    out
}

fn collect<'a>(value: &'a Value, segments: &[String], out: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        out.push(value);
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(head) {
                collect(child, rest, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, segments, out);
            }
        }
        _ => {}
    }
}

/// Values at `path` with terminal arrays flattened into their elements
fn candidates<'a>(document: &'a Value, path: &FieldPath) -> Vec<&'a Value> {
    let mut out = Vec::new();
    for value in raw_values(document, path) {
        match value {
            Value::Array(items) => out.extend(items.iter()),
            other => out.push(other),
        }
    }
    out
}

/// Read a stored JSON value with the type of the literal it is tested against
fn typed(raw: &Value, literal: &FieldValue) -> Option<FieldValue> {
    match (literal, raw) {
        (FieldValue::String(_), Value::String(s)) => Some(FieldValue::String(s.clone())),
        (FieldValue::Integer(_) | FieldValue::Double(_), Value::Number(n)) => n
            .as_i64()
            .map(FieldValue::Integer)
            .or_else(|| n.as_f64().map(FieldValue::Double)),
        (FieldValue::Boolean(_), Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
        (FieldValue::Date(_), _) => ColumnType::Date.try_convert(raw),
        (FieldValue::Null, Value::Null) => Some(FieldValue::Null),
        _ => None,
    }
}

fn equals(raw: &Value, literal: &FieldValue) -> bool {
    if literal.is_null() {
        return raw.is_null();
    }
    typed(raw, literal)
        .and_then(|stored| stored.compare(literal))
        .is_some_and(|ordering| ordering == Ordering::Equal)
}

fn satisfies(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
    }
}

fn any_in(document: &Value, field: &FieldPath, values: &[FieldValue]) -> bool {
    candidates(document, field)
        .iter()
        .any(|c| values.iter().any(|v| equals(c, v)))
}

fn any_text_match(document: &Value, field: &FieldPath, regex: &Regex) -> bool {
    candidates(document, field)
        .iter()
        .any(|c| c.as_str().is_some_and(|s| regex.is_match(s)))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Null and missing first, then booleans, numbers, strings
///
/// Two strings that both parse as dates compare as instants.
fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) | Some(Value::Object(_)) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => match (date::parse(x), date::parse(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        _ => rank(a).cmp(&rank(b)),
    }
}
