//! HTTP routes for registered listings
//!
//! - POST /{collection}/query - page of rows plus counts
//! - POST /{collection}/count - counts only
//! - GET /collections - registered collection names
//! - GET /health, /healthz - health check
//!
//! Compilation errors (unknown field, invalid pagination) are answered
//! with 400, unknown collections with 404. Store failures are not HTTP
//! errors: they travel in the envelope's `error` field with status 200.

use super::registry::ListingRegistry;
use crate::core::envelope::{CountResult, QueryResult};
use crate::core::error::SieveError;
use crate::core::query::QueryDescription;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;

/// Build listing routes from a registry
pub fn build_listing_routes(registry: Arc<ListingRegistry>) -> Router {
    Router::new()
        .route("/collections", get(list_collections))
        .route("/{collection}/query", post(query_collection))
        .route("/{collection}/count", post(count_collection))
        .with_state(registry)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sieve"
    }))
}

async fn list_collections(State(registry): State<Arc<ListingRegistry>>) -> Json<Value> {
    Json(json!({ "collections": registry.names() }))
}

async fn query_collection(
    State(registry): State<Arc<ListingRegistry>>,
    Path(collection): Path<String>,
    Json(description): Json<QueryDescription>,
) -> Result<Json<QueryResult<Value>>, SieveError> {
    let listing = registry.get(&collection)?;
    let query = listing.assemble(&description)?;
    Ok(Json(listing.execute(&query).await))
}

async fn count_collection(
    State(registry): State<Arc<ListingRegistry>>,
    Path(collection): Path<String>,
    Json(description): Json<QueryDescription>,
) -> Result<Json<CountResult>, SieveError> {
    let listing = registry.get(&collection)?;
    // surface compilation errors as 400 before counting
    listing.assemble(&description)?;
    Ok(Json(listing.count(&description).await))
}
