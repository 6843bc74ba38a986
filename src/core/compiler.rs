//! Operator compiler: one [`FilterExpression`] into one [`Predicate`]
//!
//! Every operator present on the expression yields one fragment, and the
//! fragments are ANDed. The type decides what survives:
//!
//! | operator            | string | integer / double / date | boolean |
//! |---------------------|--------|-------------------------|---------|
//! | eq, ne, in, nin     | yes    | yes                     | yes     |
//! | gt, gte, lt, lte    | yes    | yes                     | ignored |
//! | regex, like         | yes    | ignored                 | ignored |
//! | isEmpty             | yes    | ignored                 | ignored |
//! | isVoid              | null or empty | null             | null    |
//!
//! A field holding a collection accepts `isEmpty`, and `isVoid` means null
//! or empty for it, whatever its element type.
//! | exists, isNull      | yes    | yes                     | yes     |
//!
//! Literals that fail conversion never raise: `eq` and range operators turn
//! into "matches nothing", `ne` into "matches everything", and `in`/`nin`
//! drop the offending element.

use super::column_type::ColumnType;
use super::field::FieldValue;
use super::filter::FilterExpression;
use super::path::FieldPath;
use super::predicate::{CompareOp, Predicate};
use serde_json::Value;

/// Compile all operators of `expr` against the field at `field`
pub fn compile(field: &FieldPath, column_type: ColumnType, expr: &FilterExpression) -> Predicate {
    compile_field(field, column_type, false, expr)
}

/// Like [`compile`], for a field holding a collection of `column_type` values
pub fn compile_collection(field: &FieldPath, column_type: ColumnType, expr: &FilterExpression) -> Predicate {
    compile_field(field, column_type, true, expr)
}

fn compile_field(field: &FieldPath, column_type: ColumnType, collection: bool, expr: &FilterExpression) -> Predicate {
    let mut parts = Vec::new();
    let emptiable = collection || is_textual(column_type);

    if let Some(raw) = &expr.eq {
        parts.push(compile_eq(field, column_type, raw));
    }
    if let Some(raw) = &expr.ne {
        parts.push(compile_ne(field, column_type, raw));
    }
    if let Some(raw) = &expr.in_values {
        parts.push(compile_in(field, column_type, raw));
    }
    if let Some(raw) = &expr.nin_values {
        parts.push(compile_nin(field, column_type, raw));
    }

    let ranges = [
        (CompareOp::Gt, &expr.gt),
        (CompareOp::Gte, &expr.gte),
        (CompareOp::Lt, &expr.lt),
        (CompareOp::Lte, &expr.lte),
    ];
    for (op, raw) in ranges {
        let Some(raw) = raw else { continue };
        if column_type.is_comparable() {
            parts.push(compile_range(field, column_type, op, raw));
        } else {
            tracing::debug!(%field, %column_type, op = op.symbol(), "range operator ignored");
        }
    }

    if let Some(pattern) = &expr.regex {
        if is_textual(column_type) {
            parts.push(compile_regex(field, pattern));
        } else {
            tracing::debug!(%field, %column_type, "regex ignored");
        }
    }
    if let Some(pattern) = &expr.like {
        if is_textual(column_type) {
            parts.push(Predicate::Like {
                field: field.clone(),
                pattern: pattern.clone(),
            });
        } else {
            tracing::debug!(%field, %column_type, "like ignored");
        }
    }

    if let Some(exists) = expr.exists {
        parts.push(Predicate::Exists {
            field: field.clone(),
            exists,
        });
    }
    if let Some(flag) = expr.is_null {
        parts.push(when(flag, Predicate::is_null(field.clone())));
    }
    if let Some(flag) = expr.is_empty {
        if emptiable {
            parts.push(when(flag, Predicate::is_empty(field.clone())));
        } else {
            tracing::debug!(%field, %column_type, "isEmpty ignored");
        }
    }
    if let Some(flag) = expr.is_void {
        parts.push(when(flag, void(field, emptiable)));
    }

    Predicate::and(parts)
}

/// Whether text-only operators apply
fn is_textual(column_type: ColumnType) -> bool {
    match column_type {
        ColumnType::String => true,
        ColumnType::Integer | ColumnType::Double | ColumnType::Boolean | ColumnType::Date => false,
    }
}

fn when(flag: bool, predicate: Predicate) -> Predicate {
    if flag { predicate } else { Predicate::not(predicate) }
}

fn void(field: &FieldPath, emptiable: bool) -> Predicate {
    let null = Predicate::is_null(field.clone());
    if emptiable {
        Predicate::or([null, Predicate::is_empty(field.clone())])
    } else {
        null
    }
}

fn compile_eq(field: &FieldPath, column_type: ColumnType, raw: &Value) -> Predicate {
    if raw.is_null() {
        return Predicate::is_null(field.clone());
    }
    match column_type.try_convert(raw) {
        Some(value) => Predicate::compare(field.clone(), CompareOp::Eq, value),
        None => {
            tracing::debug!(%field, %column_type, %raw, "unconvertible equality literal");
            Predicate::False
        }
    }
}

fn compile_ne(field: &FieldPath, column_type: ColumnType, raw: &Value) -> Predicate {
    if raw.is_null() {
        return Predicate::not(Predicate::is_null(field.clone()));
    }
    match column_type.try_convert(raw) {
        Some(value) => Predicate::compare(field.clone(), CompareOp::Ne, value),
        None => {
            tracing::debug!(%field, %column_type, %raw, "unconvertible inequality literal");
            Predicate::True
        }
    }
}

fn compile_range(field: &FieldPath, column_type: ColumnType, op: CompareOp, raw: &Value) -> Predicate {
    match column_type.try_convert(raw) {
        Some(value) => Predicate::compare(field.clone(), op, value),
        None => {
            tracing::debug!(%field, %column_type, %raw, op = op.symbol(), "unconvertible range literal");
            Predicate::False
        }
    }
}

/// Converted members and whether the list carried a null marker
fn convert_members(field: &FieldPath, column_type: ColumnType, raw: &[Value]) -> (Vec<FieldValue>, bool) {
    let mut values = Vec::with_capacity(raw.len());
    let mut has_null = false;
    for member in raw {
        if member.is_null() {
            has_null = true;
            continue;
        }
        match column_type.try_convert(member) {
            Some(value) => values.push(value),
            None => tracing::debug!(%field, %column_type, %member, "dropping unconvertible set member"),
        }
    }
    (values, has_null)
}

fn compile_in(field: &FieldPath, column_type: ColumnType, raw: &[Value]) -> Predicate {
    let (values, has_null) = convert_members(field, column_type, raw);
    let mut alternatives = Vec::new();
    if !values.is_empty() {
        alternatives.push(Predicate::In {
            field: field.clone(),
            values,
        });
    }
    if has_null {
        alternatives.push(Predicate::is_null(field.clone()));
    }
    Predicate::or(alternatives)
}

fn compile_nin(field: &FieldPath, column_type: ColumnType, raw: &[Value]) -> Predicate {
    let (values, has_null) = convert_members(field, column_type, raw);
    let mut requirements = Vec::new();
    if !values.is_empty() {
        requirements.push(Predicate::NotIn {
            field: field.clone(),
            values,
        });
    }
    if has_null {
        requirements.push(Predicate::not(Predicate::is_null(field.clone())));
    }
    Predicate::and(requirements)
}

fn compile_regex(field: &FieldPath, pattern: &str) -> Predicate {
    match regex::Regex::new(pattern) {
        Ok(_) => Predicate::Regex {
            field: field.clone(),
            pattern: pattern.to_string(),
        },
        Err(e) => {
            tracing::warn!(%field, pattern, error = %e, "invalid regex, filter matches nothing");
            Predicate::False
        }
    }
}
