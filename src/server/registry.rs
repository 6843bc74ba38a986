//! Listing registry: collections reachable over HTTP, by name

use crate::core::assembler::AssembledQuery;
use crate::core::envelope::{CountResult, QueryResult};
use crate::core::error::QueryError;
use crate::core::query::QueryDescription;
use crate::core::service::Listing;
use crate::core::store::Store;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased view of a [`Listing`], rows rendered as JSON
#[async_trait]
pub trait ListingEndpoint: Send + Sync {
    /// Collection name, used as the route segment
    fn name(&self) -> &str;

    fn assemble(&self, description: &QueryDescription) -> Result<AssembledQuery, QueryError>;

    async fn execute(&self, query: &AssembledQuery) -> QueryResult<Value>;

    async fn count(&self, description: &QueryDescription) -> CountResult;
}

#[async_trait]
impl<T, S> ListingEndpoint for Listing<T, S>
where
    T: Serialize + Send + 'static,
    S: Store<T>,
{
    fn name(&self) -> &str {
        Listing::name(self)
    }

    fn assemble(&self, description: &QueryDescription) -> Result<AssembledQuery, QueryError> {
        Listing::assemble(self, description)
    }

    async fn execute(&self, query: &AssembledQuery) -> QueryResult<Value> {
        let result = Listing::execute(self, query).await;
        let rows = result
            .data
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>();

        let rendered = QueryResult {
            draw: result.draw,
            total: result.total,
            filtered: result.filtered,
            data: Vec::new(),
            error: result.error,
        };
        match rows {
            Ok(data) => QueryResult { data, ..rendered },
            Err(e) => {
                tracing::error!(collection = %Listing::name(self), error = %e, "failed to render rows");
                rendered.fail(format!("Failed to serialize rows: {e}"))
            }
        }
    }

    async fn count(&self, description: &QueryDescription) -> CountResult {
        Listing::count(self, description).await
    }
}

/// Registry for all listings in the application
#[derive(Default, Clone)]
pub struct ListingRegistry {
    listings: HashMap<String, Arc<dyn ListingEndpoint>>,
}

impl ListingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listing under its collection name; a later registration
    /// with the same name replaces the earlier one
    pub fn register(&mut self, listing: Arc<dyn ListingEndpoint>) {
        let name = listing.name().to_string();
        if self.listings.insert(name.clone(), listing).is_some() {
            tracing::warn!(collection = %name, "listing registered twice, keeping the last one");
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn ListingEndpoint>, QueryError> {
        self.listings
            .get(name)
            .cloned()
            .ok_or_else(|| QueryError::UnknownCollection {
                name: name.to_string(),
            })
    }

    /// Registered collection names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.listings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
