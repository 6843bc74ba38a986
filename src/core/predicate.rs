//! Backend-neutral predicate fragments
//!
//! The compiler never talks to a store directly. It produces a [`Predicate`]
//! tree over canonical field paths and typed [`FieldValue`]s, and each store
//! renders that tree into its own query language (SQL text, a BSON filter, an
//! in-memory evaluator).
//!
//! Paths inside a [`Predicate::Nested`] are relative to the nested
//! collection element.

use super::field::FieldValue;
use super::path::FieldPath;
use std::fmt;

/// Comparison operator of a [`Predicate::Compare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// SQL-style operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

/// A boolean test over one record
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches everything
    True,
    /// Matches nothing
    False,
    Compare {
        field: FieldPath,
        op: CompareOp,
        value: FieldValue,
    },
    In {
        field: FieldPath,
        values: Vec<FieldValue>,
    },
    NotIn {
        field: FieldPath,
        values: Vec<FieldValue>,
    },
    /// `%` wildcard match, case-insensitive
    Like { field: FieldPath, pattern: String },
    Regex { field: FieldPath, pattern: String },
    /// Case-insensitive literal substring of the field's textual form
    Contains { field: FieldPath, needle: String },
    /// Field presence, independent of its value
    Exists { field: FieldPath, exists: bool },
    IsNull { field: FieldPath },
    /// Empty string or empty collection
    IsEmpty { field: FieldPath },
    /// Some element of the collection at `field` satisfies `predicate`
    Nested {
        field: FieldPath,
        predicate: Box<Predicate>,
    },
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction, flattened and simplified
    ///
    /// `True` operands are dropped, any `False` operand wins, an empty
    /// conjunction is `True` and a single operand is returned unwrapped.
    pub fn and<I>(operands: I) -> Predicate
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut parts = Vec::new();
        for operand in operands {
            match operand {
                Predicate::True => {}
                Predicate::False => return Predicate::False,
                Predicate::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Predicate::True,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }

    /// Disjunction, flattened and simplified (dual of [`Predicate::and`])
    pub fn or<I>(operands: I) -> Predicate
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut parts = Vec::new();
        for operand in operands {
            match operand {
                Predicate::False => {}
                Predicate::True => return Predicate::True,
                Predicate::Or(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Predicate::False,
            1 => parts.remove(0),
            _ => Predicate::Or(parts),
        }
    }

    /// Negation; folds constants and double negation
    pub fn not(operand: Predicate) -> Predicate {
        match operand {
            Predicate::True => Predicate::False,
            Predicate::False => Predicate::True,
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }

    /// Wrap `predicate` so it applies to elements of the collection at `field`
    pub fn nested(field: FieldPath, predicate: Predicate) -> Predicate {
        match predicate {
            Predicate::True | Predicate::False => predicate,
            other => Predicate::Nested {
                field,
                predicate: Box::new(other),
            },
        }
    }

    pub fn compare(field: FieldPath, op: CompareOp, value: FieldValue) -> Predicate {
        Predicate::Compare { field, op, value }
    }

    pub fn is_null(field: FieldPath) -> Predicate {
        Predicate::IsNull { field }
    }

    pub fn is_empty(field: FieldPath) -> Predicate {
        Predicate::IsEmpty { field }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Predicate::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Predicate::False)
    }

    fn is_compound(&self) -> bool {
        matches!(self, Predicate::And(_) | Predicate::Or(_))
    }
}

/// Translate a `%` wildcard pattern into an anchored regular expression
///
/// A leading `%` becomes `.*` (otherwise `^`), a trailing `%` becomes `.*`
/// (otherwise `$`) and inner `%` become `.*`. Everything else is matched
/// literally.
///
/// ```
/// use sieve::core::predicate::like_to_regex;
///
/// assert_eq!(like_to_regex("%bcd%"), ".*bcd.*");
/// assert_eq!(like_to_regex("a.c%"), r"^a\.c.*");
/// assert_eq!(like_to_regex(""), "^$");
/// ```
pub fn like_to_regex(pattern: &str) -> String {
    if pattern.is_empty() {
        return "^$".to_string();
    }

    let (head, rest) = match pattern.strip_prefix('%') {
        Some(rest) => (".*", rest),
        None => ("^", pattern),
    };
    let (body, tail) = match rest.strip_suffix('%') {
        Some(body) => (body, ".*"),
        None => (rest, "$"),
    };

    let body = body
        .split('%')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("{head}{body}{tail}")
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &FieldValue) -> fmt::Result {
    match value {
        FieldValue::String(_) | FieldValue::Date(_) => {
            write!(f, "'{}'", value.to_string().replace('\'', "''"))
        }
        FieldValue::Null => write!(f, "NULL"),
        other => write!(f, "{}", other),
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, values: &[FieldValue]) -> fmt::Result {
    write!(f, "(")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_literal(f, value)?;
    }
    write!(f, ")")
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

impl fmt::Display for Predicate {
    /// SQL-flavored rendering, used for logs and diagnostics
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::True => write!(f, "TRUE"),
            Predicate::False => write!(f, "FALSE"),
            Predicate::Compare { field, op, value } => {
                write!(f, "{} {} ", field, op.symbol())?;
                write_literal(f, value)
            }
            Predicate::In { field, values } => {
                write!(f, "{} IN ", field)?;
                write_list(f, values)
            }
            Predicate::NotIn { field, values } => {
                write!(f, "{} NOT IN ", field)?;
                write_list(f, values)
            }
            Predicate::Like { field, pattern } => write!(f, "{} ILIKE {}", field, quote(pattern)),
            Predicate::Regex { field, pattern } => write!(f, "{} REGEXP {}", field, quote(pattern)),
            Predicate::Contains { field, needle } => {
                write!(f, "{} CONTAINS {}", field, quote(needle))
            }
            Predicate::Exists { field, exists: true } => write!(f, "{} EXISTS", field),
            Predicate::Exists { field, exists: false } => write!(f, "{} NOT EXISTS", field),
            Predicate::IsNull { field } => write!(f, "{} IS NULL", field),
            Predicate::IsEmpty { field } => write!(f, "{} IS EMPTY", field),
            Predicate::Nested { field, predicate } => write!(f, "{} ANY ({})", field, predicate),
            Predicate::Not(inner) => write!(f, "NOT ({})", inner),
            Predicate::And(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    if part.is_compound() {
                        write!(f, "({})", part)?;
                    } else {
                        write!(f, "{}", part)?;
                    }
                }
                Ok(())
            }
            Predicate::Or(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    write!(f, "({})", part)?;
                }
                Ok(())
            }
        }
    }
}
