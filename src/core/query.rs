//! Query descriptions and the page/sort parameters derived from them

use super::error::QueryError;
use super::filter::FilterExpression;
use super::path::FieldPath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sentinel limit meaning "all matching rows"
pub const UNBOUNDED: i64 = -1;

/// Largest page handed to a store when none is configured
pub const DEFAULT_MAX_PAGE_SIZE: u64 = i32::MAX as u64;

/// A listing request as sent by the client
///
/// # Example
/// ```json
/// {
///   "draw": 3,
///   "offset": 20,
///   "limit": 10,
///   "order_by": { "created_at": "desc", "id": "asc" },
///   "where": {
///     "status": { "in": ["paid", "shipped"] },
///     "user.age": { "gte": "18" }
///   },
///   "search": "smith"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QueryDescription {
    /// Request counter, echoed back in the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw: Option<u64>,

    /// Index of the first row
    pub offset: u64,

    /// Page size; `-1` for all rows
    #[validate(range(min = -1))]
    pub limit: i64,

    /// Sort keys, in priority order
    pub order_by: IndexMap<String, Direction>,

    /// Per-field filters, ANDed
    #[serde(rename = "where")]
    pub filters: IndexMap<String, FilterExpression>,

    /// Free-text value for the global search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for QueryDescription {
    fn default() -> Self {
        Self {
            draw: None,
            offset: 0,
            limit: default_limit(),
            order_by: IndexMap::new(),
            filters: IndexMap::new(),
            search: None,
        }
    }
}

fn default_limit() -> i64 {
    10
}

impl QueryDescription {
    /// Page parameters, with the unbounded sentinel normalized
    ///
    /// `limit == -1` becomes `(offset 0, max_page_size)`. Larger limits are
    /// clamped to `max_page_size`.
    pub fn page(&self, max_page_size: u64) -> Result<PageRequest, QueryError> {
        self.validate()?;
        if self.limit == UNBOUNDED {
            return Ok(PageRequest {
                offset: 0,
                limit: max_page_size,
            });
        }

        let requested = self.limit.unsigned_abs();
        let limit = if requested > max_page_size {
            tracing::warn!(requested, max_page_size, "page size clamped");
            max_page_size
        } else {
            requested
        };
        Ok(PageRequest {
            offset: self.offset,
            limit,
        })
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One resolved sort key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortOrder {
    /// Canonical path
    pub field: FieldPath,
    pub direction: Direction,
}

/// Offset-based page, always bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Zero-based page number for page-index stores
    ///
    /// Fails unless `offset` is a multiple of `limit`; a zero limit is page 0.
    pub fn page_index(&self) -> Result<u64, QueryError> {
        if self.limit == 0 {
            return Ok(0);
        }
        if self.offset % self.limit != 0 {
            return Err(QueryError::MisalignedOffset {
                offset: self.offset,
                limit: self.limit,
            });
        }
        Ok(self.offset / self.limit)
    }
}
