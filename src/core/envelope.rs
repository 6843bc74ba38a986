//! Result envelopes returned by every listing call

use serde::{Deserialize, Serialize};

/// Rows of one page plus the counts around them
///
/// `error` is advisory: when set, `data` and `filtered` may be incomplete or
/// absent, while `total` keeps whatever was computed before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<u64>,

    /// Rows before filtering
    pub total: u64,

    /// Rows after filtering
    pub filtered: u64,

    pub data: Vec<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Default for QueryResult<T> {
    fn default() -> Self {
        Self {
            draw: None,
            total: 0,
            filtered: 0,
            data: Vec::new(),
            error: None,
        }
    }
}

impl<T> QueryResult<T> {
    /// Empty envelope echoing `draw`
    pub fn empty(draw: Option<u64>) -> Self {
        Self {
            draw,
            ..Default::default()
        }
    }

    /// Record a failure: drop rows and the filtered count, keep `total`
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.data.clear();
        self.filtered = 0;
        self.error = Some(message.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Convert every row, keeping counts and error
    pub fn map<U, F>(self, f: F) -> QueryResult<U>
    where
        F: FnMut(T) -> U,
    {
        QueryResult {
            draw: self.draw,
            total: self.total,
            filtered: self.filtered,
            data: self.data.into_iter().map(f).collect(),
            error: self.error,
        }
    }
}

/// Counts only, without fetching rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResult {
    pub total: u64,
    pub filtered: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CountResult {
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.filtered = 0;
        self.error = Some(message.into());
        self
    }
}
