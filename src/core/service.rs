//! Listing service: compile a description, run it, wrap the result
//!
//! [`Listing`] is the envelope boundary. Store failures never escape it;
//! they end up in [`QueryResult::error`] with `filtered` reset to 0 and
//! `total` kept.

use super::assembler::{self, AssembledQuery};
use super::envelope::{CountResult, QueryResult};
use super::error::QueryError;
use super::predicate::Predicate;
use super::query::{DEFAULT_MAX_PAGE_SIZE, QueryDescription};
use super::shape::CollectionSchema;
use super::store::Store;
use std::marker::PhantomData;
use std::sync::Arc;

/// One registered collection: its schema and the store behind it
pub struct Listing<T, S> {
    schema: Arc<CollectionSchema>,
    store: S,
    max_page_size: u64,
    pre_filter: Option<Predicate>,
    _rows: PhantomData<fn() -> T>,
}

impl<T, S> Listing<T, S>
where
    S: Store<T>,
    T: Send + 'static,
{
    pub fn new(schema: CollectionSchema, store: S) -> Self {
        Self {
            schema: Arc::new(schema),
            store,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            pre_filter: None,
            _rows: PhantomData,
        }
    }

    /// Upper bound for page sizes, also used for `limit = -1`
    pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Fixed predicate applied to the total count and to every query
    pub fn with_pre_filter(mut self, predicate: Predicate) -> Self {
        self.pre_filter = Some(predicate);
        self
    }

    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compile without executing
    pub fn assemble(&self, description: &QueryDescription) -> Result<AssembledQuery, QueryError> {
        assembler::assemble(&self.schema, description, self.max_page_size)
    }

    /// Run an already assembled query
    pub async fn execute(&self, query: &AssembledQuery) -> QueryResult<T> {
        let result = QueryResult::empty(query.draw);
        let result = match self.total(result).await {
            Ok(result) if result.total > 0 => result,
            Ok(result) | Err(result) => return result,
        };
        self.run(query, None, result).await
    }

    /// Compile and run; compilation errors are reported in the envelope
    pub async fn find_all(&self, description: &QueryDescription) -> QueryResult<T> {
        self.find_all_inner(description, None).await
    }

    /// Like [`Listing::find_all`], with an extra predicate ANDed into the
    /// filtered query (the total count is unaffected)
    pub async fn find_all_with(
        &self,
        description: &QueryDescription,
        additional: Predicate,
    ) -> QueryResult<T> {
        self.find_all_inner(description, Some(additional)).await
    }

    /// Like [`Listing::find_all`], converting every row
    pub async fn find_all_as<U, F>(&self, description: &QueryDescription, converter: F) -> QueryResult<U>
    where
        F: FnMut(T) -> U,
    {
        self.find_all(description).await.map(converter)
    }

    /// Total and filtered counts, without fetching rows
    pub async fn count(&self, description: &QueryDescription) -> CountResult {
        let result = CountResult::default();
        let total = match self.store.count(self.pre_filter.as_ref()).await {
            Ok(total) => total,
            Err(e) => return result.fail(self.report(&e)),
        };
        let result = CountResult { total, ..result };
        if total == 0 {
            return result;
        }

        let query = match self.assemble(description) {
            Ok(query) => query,
            Err(e) => return result.fail(self.report(&e)),
        };
        let predicate = self.filtered_predicate(&query, None);
        match self.store.count(Some(&predicate)).await {
            Ok(filtered) => CountResult { filtered, ..result },
            Err(e) => result.fail(self.report(&e)),
        }
    }

    async fn find_all_inner(
        &self,
        description: &QueryDescription,
        additional: Option<Predicate>,
    ) -> QueryResult<T> {
        let result = QueryResult::empty(description.draw);
        let result = match self.total(result).await {
            Ok(result) if result.total > 0 => result,
            Ok(result) | Err(result) => return result,
        };

        match self.assemble(description) {
            Ok(query) => self.run(&query, additional, result).await,
            Err(e) => {
                let message = self.report(&e);
                result.fail(message)
            }
        }
    }

    /// Fill in `total`; `Err` carries the already failed envelope
    async fn total(&self, mut result: QueryResult<T>) -> Result<QueryResult<T>, QueryResult<T>> {
        match self.store.count(self.pre_filter.as_ref()).await {
            Ok(total) => {
                result.total = total;
                Ok(result)
            }
            Err(e) => {
                let message = self.report(&e);
                Err(result.fail(message))
            }
        }
    }

    async fn run(
        &self,
        query: &AssembledQuery,
        additional: Option<Predicate>,
        mut result: QueryResult<T>,
    ) -> QueryResult<T> {
        let predicate = self.filtered_predicate(query, additional);
        let outcome = futures::try_join!(
            self.store.count(Some(&predicate)),
            self.store.find(&predicate, &query.page, &query.sort),
        );
        match outcome {
            Ok((filtered, data)) => {
                result.filtered = filtered;
                result.data = data;
                result
            }
            Err(e) => {
                let message = self.report(&e);
                result.fail(message)
            }
        }
    }

    fn filtered_predicate(&self, query: &AssembledQuery, additional: Option<Predicate>) -> Predicate {
        Predicate::and(
            self.pre_filter
                .iter()
                .cloned()
                .chain(std::iter::once(query.predicate.clone()))
                .chain(additional),
        )
    }

    fn report(&self, error: &dyn std::fmt::Display) -> String {
        let message = format!("{error:#}");
        tracing::error!(collection = %self.schema.name, error = %message, "listing query failed");
        message
    }
}
