//! Store collaborator trait
//!
//! A store executes compiled predicates against its own data. It never sees
//! wire names or untyped literals: paths are canonical and values are typed.

use super::predicate::Predicate;
use super::query::{PageRequest, SortOrder};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Execution interface of a listing backend
///
/// Implementations are free to block, retry or time out; errors are
/// returned as-is and turned into envelope errors by the caller.
#[async_trait]
pub trait Store<T>: Send + Sync {
    /// Count rows matching `predicate`, or all rows when `None`
    async fn count(&self, predicate: Option<&Predicate>) -> Result<u64>;

    /// Fetch one sorted page of rows matching `predicate`
    async fn find(
        &self,
        predicate: &Predicate,
        page: &PageRequest,
        sort: &[SortOrder],
    ) -> Result<Vec<T>>;
}

#[async_trait]
impl<T, S> Store<T> for Arc<S>
where
    S: Store<T> + ?Sized,
    T: Send + 'static,
{
    async fn count(&self, predicate: Option<&Predicate>) -> Result<u64> {
        (**self).count(predicate).await
    }

    async fn find(
        &self,
        predicate: &Predicate,
        page: &PageRequest,
        sort: &[SortOrder],
    ) -> Result<Vec<T>> {
        (**self).find(predicate, page, sort).await
    }
}
