//! Integration tests for InMemoryStore using the storage test harness.
//!
//! This file invokes `listing_store_tests!` to validate that InMemoryStore
//! answers every listing scenario, then checks behavior specific to
//! in-memory rows.

#[macro_use]
mod storage_harness;

use serde_json::json;
use sieve::core::service::Listing;
use sieve::storage::InMemoryStore;
use storage_harness::*;

listing_store_tests!(InMemoryStore::with_rows(seed_orders()).unwrap());

#[tokio::test]
async fn test_empty_store_short_circuits() {
    let listing = Listing::new(order_schema(), InMemoryStore::<Order>::new());
    let result = listing
        .find_all(&describe(json!({ "draw": 3, "where": { "status": { "eq": "paid" } } })))
        .await;
    assert_eq!(result.draw, Some(3));
    assert_eq!(result.total, 0);
    assert_eq!(result.filtered, 0);
    assert!(result.data.is_empty());
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_rows_inserted_later_are_visible() {
    let store = InMemoryStore::<Order>::new();
    let listing = Listing::new(order_schema(), store.clone());
    for order in seed_orders().iter().take(2) {
        store.insert(order).unwrap();
    }
    let result = listing.find_all(&describe(json!({}))).await;
    assert_eq!(result.total, 2);
    assert_eq!(ids(&result), vec![1, 2]);
}

#[tokio::test]
async fn test_concurrent_queries_share_one_listing() {
    let listing = std::sync::Arc::new(Listing::new(
        order_schema(),
        InMemoryStore::with_rows(seed_orders()).unwrap(),
    ));

    let mut handles = Vec::new();
    for status in ["paid", "pending", "shipped", "cancelled"] {
        let listing = listing.clone();
        handles.push(tokio::spawn(async move {
            let result = listing
                .find_all(&describe(json!({ "where": { "status": { "eq": status } } })))
                .await;
            (status, result.filtered)
        }));
    }

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap());
    }
    assert_eq!(
        counts,
        vec![("paid", 3), ("pending", 1), ("shipped", 1), ("cancelled", 1)]
    );
}
