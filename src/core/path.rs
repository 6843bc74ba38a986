//! Dotted field paths and their resolution against a record shape
//!
//! Resolution walks one segment at a time: the segment is looked up in the
//! current record (canonical name first, then alias), and traversal
//! continues into that field's element shape. Any segment that does not
//! match is a hard [`QueryError::FieldNotFound`]; there is no fallback type
//! for unknown fields.

use super::column_type::ColumnType;
use super::error::QueryError;
use super::shape::{FieldDef, RecordShape};
use serde::{Serialize, Serializer};
use std::fmt;

/// A sequence of field names, rendered as `a.b.c`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Split a dotted path; empty segments are kept so resolution rejects them
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path with one more trailing segment
    pub fn child(&self, name: &str) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        FieldPath { segments }
    }

    /// Concatenate two paths
    pub fn join(&self, tail: &FieldPath) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.extend(tail.segments.iter().cloned());
        FieldPath { segments }
    }

    /// Dotted form
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dotted())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dotted())
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        FieldPath::parse(dotted)
    }
}

/// One resolved path segment
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSegment {
    /// Canonical (storage side) name
    pub name: String,
    /// Whether the field holds a collection
    pub is_list: bool,
}

/// Result of resolving a wire path against a shape
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub column_type: ColumnType,
    pub segments: Vec<ResolvedSegment>,
}

impl ResolvedField {
    /// Canonical, backend-facing path
    pub fn canonical_path(&self) -> FieldPath {
        FieldPath::from_segments(self.segments.iter().map(|s| s.name.clone()))
    }
}

/// Resolve a dotted wire path to its terminal column type and canonical path
pub fn resolve(shape: &RecordShape, dotted: &str) -> Result<ResolvedField, QueryError> {
    let path = FieldPath::parse(dotted);
    resolve_segments(shape, path.segments(), dotted)
}

/// Resolve the record shape reached by a dotted path
///
/// Fails when a segment is unknown or when the path ends on a scalar.
pub fn resolve_shape<'a>(shape: &'a RecordShape, dotted: &str) -> Result<&'a RecordShape, QueryError> {
    let mut current = shape;
    for segment in FieldPath::parse(dotted).segments() {
        let field = lookup(current, segment, dotted)?;
        current = field
            .kind
            .nested_shape()
            .ok_or_else(|| not_found(dotted, segment, current))?;
    }
    Ok(current)
}

fn resolve_segments(
    shape: &RecordShape,
    segments: &[String],
    full_path: &str,
) -> Result<ResolvedField, QueryError> {
    let Some((head, rest)) = segments.split_first() else {
        return Err(not_found(full_path, "", shape));
    };

    let field = lookup(shape, head, full_path)?;
    let segment = ResolvedSegment {
        name: field.name.clone(),
        is_list: field.kind.is_list(),
    };

    if rest.is_empty() {
        return Ok(ResolvedField {
            column_type: ColumnType::from_kind(&field.kind),
            segments: vec![segment],
        });
    }

    let nested = field
        .kind
        .nested_shape()
        .ok_or_else(|| not_found(full_path, &rest[0], shape))?;
    let mut resolved = resolve_segments(nested, rest, full_path)?;
    resolved.segments.insert(0, segment);
    Ok(resolved)
}

fn lookup<'a>(shape: &'a RecordShape, segment: &str, full_path: &str) -> Result<&'a FieldDef, QueryError> {
    let found = shape.lookup(segment);
    tracing::trace!(
        record = %shape.name,
        segment,
        found = found.map(|f| f.name.as_str()),
        "resolving path segment"
    );
    found.ok_or_else(|| not_found(full_path, segment, shape))
}

fn not_found(full_path: &str, segment: &str, shape: &RecordShape) -> QueryError {
    QueryError::FieldNotFound {
        path: full_path.to_string(),
        segment: segment.to_string(),
        record: shape.name.clone(),
    }
}
