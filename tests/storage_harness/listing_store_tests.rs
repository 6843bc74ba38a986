//! Macro-generated listing scenarios for `Store<Order>` conformance.
//!
//! The `listing_store_tests!` macro generates a test module that runs the
//! same listing requests against any store seeded with [`seed_orders`]
//! and checks counts, rows and their order.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use sieve::storage::InMemoryStore;
//!
//! listing_store_tests!(InMemoryStore::with_rows(seed_orders()).unwrap());
//! ```
//!
//! Every scenario sorts explicitly, so stores without a natural order pass.
//!
//! [`seed_orders`]: super::seed_orders

/// Generate the listing conformance suite.
///
/// `$factory` must evaluate to a `Store<Order>` holding exactly
/// `seed_orders()`. It is re-evaluated for each test.
#[macro_export]
macro_rules! listing_store_tests {
    ($factory:expr) => {
        mod listing_store_contract_tests {
            use super::*;
            use serde_json::json;
            use sieve::core::envelope::CountResult;
            use sieve::core::field::FieldValue;
            use sieve::core::path::FieldPath;
            use sieve::core::predicate::{CompareOp, Predicate};
            use sieve::core::service::Listing;
            use sieve::core::shape::CollectionSchema;

            async fn run(wire: serde_json::Value) -> Vec<u64> {
                let listing = Listing::new(order_schema(), $factory);
                let result = listing.find_all(&describe(wire)).await;
                assert!(result.is_ok(), "unexpected error: {:?}", result.error);
                assert_eq!(result.total, 6);
                ids(&result)
            }

            // ==================================================================
            // Paging
            // ==================================================================

            #[tokio::test]
            async fn test_unfiltered_page_echoes_draw() {
                let listing = Listing::new(order_schema(), $factory);
                let result = listing
                    .find_all(&describe(json!({ "draw": 7, "order_by": { "id": "asc" } })))
                    .await;
                assert_eq!(result.draw, Some(7));
                assert_eq!(result.total, 6);
                assert_eq!(result.filtered, 6);
                assert_eq!(ids(&result), vec![1, 2, 3, 4, 5, 6]);
                assert!(result.error.is_none());
            }

            #[tokio::test]
            async fn test_page_window() {
                let listing = Listing::new(order_schema(), $factory);
                let result = listing
                    .find_all(&describe(json!({ "offset": 2, "limit": 2, "order_by": { "id": "asc" } })))
                    .await;
                assert_eq!(result.filtered, 6);
                assert_eq!(ids(&result), vec![3, 4]);
            }

            #[tokio::test]
            async fn test_unbounded_limit_returns_everything() {
                let found = run(json!({ "offset": 4, "limit": -1, "order_by": { "id": "desc" } })).await;
                assert_eq!(found, vec![6, 5, 4, 3, 2, 1]);
            }

            #[tokio::test]
            async fn test_zero_limit_counts_without_rows() {
                let listing = Listing::new(order_schema(), $factory);
                let result = listing
                    .find_all(&describe(json!({ "limit": 0, "where": { "status": { "eq": "paid" } } })))
                    .await;
                assert_eq!(result.filtered, 3);
                assert!(result.data.is_empty());
            }

            // ==================================================================
            // Operators
            // ==================================================================

            #[tokio::test]
            async fn test_eq_and_ne() {
                let paid = run(json!({ "where": { "status": { "eq": "paid" } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(paid, vec![1, 3, 6]);

                let other = run(json!({ "where": { "status": { "ne": "paid" } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(other, vec![2, 4, 5]);
            }

            #[tokio::test]
            async fn test_boolean_eq() {
                let found = run(json!({ "where": { "priority": { "eq": "true" } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(found, vec![3, 6]);
            }

            #[tokio::test]
            async fn test_in_and_nin() {
                let found = run(json!({
                    "where": { "status": { "in": ["paid", "shipped"] } },
                    "order_by": { "id": "asc" }
                }))
                .await;
                assert_eq!(found, vec![1, 3, 4, 6]);

                let rest = run(json!({
                    "where": { "status": { "nin": ["paid", "shipped"] } },
                    "order_by": { "id": "asc" }
                }))
                .await;
                assert_eq!(rest, vec![2, 5]);
            }

            #[tokio::test]
            async fn test_in_with_null_marker_matches_missing_values() {
                let found = run(json!({
                    "where": { "shippedAt": { "in": ["2024-03-06T16:00:00Z", null] } },
                    "order_by": { "id": "asc" }
                }))
                .await;
                assert_eq!(found, vec![2, 3, 5]);
            }

            #[tokio::test]
            async fn test_numeric_range_with_text_literals() {
                let found = run(json!({
                    "where": { "total": { "gte": "89.99", "lt": 300 } },
                    "order_by": { "id": "asc" }
                }))
                .await;
                assert_eq!(found, vec![1, 4, 6]);
            }

            #[tokio::test]
            async fn test_date_range() {
                let found = run(json!({
                    "where": { "createdAt": { "gte": "2024-03-03", "lt": "2024-03-10" } },
                    "order_by": { "createdAt": "asc" }
                }))
                .await;
                assert_eq!(found, vec![2, 3, 5, 4]);
            }

            #[tokio::test]
            async fn test_dates_with_milliseconds() {
                let after = run(json!({
                    "where": { "createdAt": { "gt": "2024-03-08T10:00:00Z" } },
                    "order_by": { "id": "asc" }
                }))
                .await;
                assert_eq!(after, vec![4, 6]);

                let up_to = run(json!({
                    "where": { "createdAt": { "lte": "2024-03-08T10:00:00Z" } },
                    "order_by": { "id": "asc" }
                }))
                .await;
                assert_eq!(up_to, vec![1, 2, 3, 5]);

                let exact = run(json!({ "where": { "createdAt": { "eq": "2024-03-08T10:00:00.500Z" } } })).await;
                assert_eq!(exact, vec![4]);

                let latest_first = run(json!({
                    "where": { "createdAt": { "gte": "2024-03-08" } },
                    "order_by": { "createdAt": "desc" }
                }))
                .await;
                assert_eq!(latest_first, vec![6, 4, 5]);
            }

            #[tokio::test]
            async fn test_like_is_case_insensitive() {
                let found = run(json!({ "where": { "reference": { "like": "acme%" } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(found, vec![1, 2, 4]);

                let inner = run(json!({ "where": { "customer.fullName": { "like": "%LOVE%" } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(inner, vec![1, 4]);
            }

            #[tokio::test]
            async fn test_regex() {
                let found = run(json!({ "where": { "reference": { "regex": "^[A-Z]+-1" } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(found, vec![3, 6]);
            }

            #[tokio::test]
            async fn test_is_null_both_ways() {
                let unshipped = run(json!({ "where": { "shippedAt": { "isNull": true } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(unshipped, vec![2, 5]);

                let shipped = run(json!({ "where": { "shippedAt": { "isNull": false } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(shipped, vec![1, 3, 4, 6]);
            }

            #[tokio::test]
            async fn test_exists() {
                let with = run(json!({ "where": { "coupon": { "exists": true } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(with, vec![1, 4]);

                let without = run(json!({ "where": { "coupon": { "exists": false } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(without, vec![2, 3, 5, 6]);
            }

            #[tokio::test]
            async fn test_is_empty_and_is_void() {
                let blank = run(json!({ "where": { "note": { "isEmpty": true } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(blank, vec![1, 3, 5]);

                let void = run(json!({ "where": { "customer.email": { "isVoid": true } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(void, vec![2, 5]);

                let reachable = run(json!({ "where": { "customer.email": { "isVoid": false } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(reachable, vec![1, 3, 4, 6]);
            }

            #[tokio::test]
            async fn test_unconvertible_literal_matches_nothing() {
                let listing = Listing::new(order_schema(), $factory);
                let result = listing
                    .find_all(&describe(json!({ "where": { "total": { "eq": "a lot" } } })))
                    .await;
                assert!(result.is_ok());
                assert_eq!(result.total, 6);
                assert_eq!(result.filtered, 0);
                assert!(result.data.is_empty());
            }

            #[tokio::test]
            async fn test_empty_in_matches_nothing() {
                let found = run(json!({ "where": { "status": { "in": [] } } })).await;
                assert!(found.is_empty());
            }

            // ==================================================================
            // Collections
            // ==================================================================

            #[tokio::test]
            async fn test_list_conditions_hold_for_one_element() {
                let found = run(json!({
                    "where": {
                        "items.sku": { "eq": "MS-7" },
                        "items.qty": { "gte": 2 }
                    },
                    "order_by": { "id": "asc" }
                }))
                .await;
                assert_eq!(found, vec![1]);

                let any = run(json!({ "where": { "items.sku": { "like": "kb-%" } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(any, vec![1, 3, 6]);
            }

            #[tokio::test]
            async fn test_is_empty_on_list_of_numbers() {
                let unrated = run(json!({ "where": { "ratings": { "isEmpty": true } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(unrated, vec![2, 4, 5]);

                let rated = run(json!({ "where": { "ratings": { "isVoid": false } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(rated, vec![1, 3, 6]);

                let low = run(json!({ "where": { "ratings": { "lte": 3 } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(low, vec![3]);
            }

            #[tokio::test]
            async fn test_list_of_scalars() {
                let found = run(json!({ "where": { "tags": { "eq": "early" } }, "order_by": { "id": "asc" } })).await;
                assert_eq!(found, vec![3, 4]);
            }

            // ==================================================================
            // Global search
            // ==================================================================

            #[tokio::test]
            async fn test_global_search_spans_searchable_fields() {
                let by_customer = run(json!({ "search": "ada", "order_by": { "id": "asc" } })).await;
                assert_eq!(by_customer, vec![1, 4]);

                let by_reference = run(json!({ "search": "  Acme ", "order_by": { "id": "asc" } })).await;
                assert_eq!(by_reference, vec![1, 2, 4]);
            }

            #[tokio::test]
            async fn test_global_search_is_anded_with_columns() {
                let found = run(json!({
                    "search": "acme",
                    "where": { "status": { "eq": "paid" } },
                    "order_by": { "id": "asc" }
                }))
                .await;
                assert_eq!(found, vec![1]);
            }

            #[tokio::test]
            async fn test_global_search_on_numeric_fields() {
                let schema = CollectionSchema::new("orders", order_shape()).with_searchable(["total", "items.qty"]);
                let listing = Listing::new(schema, $factory);
                let result = listing
                    .find_all(&describe(json!({ "search": "3", "order_by": { "id": "asc" } })))
                    .await;
                assert!(result.is_ok(), "unexpected error: {:?}", result.error);
                assert_eq!(ids(&result), vec![3, 6]);
            }

            #[tokio::test]
            async fn test_blank_search_is_ignored() {
                let found = run(json!({ "search": "   ", "order_by": { "id": "asc" } })).await;
                assert_eq!(found.len(), 6);
            }

            // ==================================================================
            // Sorting
            // ==================================================================

            #[tokio::test]
            async fn test_sort_descending() {
                let found = run(json!({ "limit": 3, "order_by": { "total": "desc" } })).await;
                assert_eq!(found, vec![3, 6, 1]);
            }

            #[tokio::test]
            async fn test_sort_keys_apply_in_order() {
                let found = run(json!({ "order_by": { "customer.fullName": "asc", "id": "desc" } })).await;
                assert_eq!(found, vec![4, 1, 2, 6, 5, 3]);
            }

            // ==================================================================
            // Listing features
            // ==================================================================

            #[tokio::test]
            async fn test_count_only() {
                let listing = Listing::new(order_schema(), $factory);
                let counts = listing
                    .count(&describe(json!({ "where": { "status": { "eq": "paid" } } })))
                    .await;
                assert_eq!(
                    counts,
                    CountResult {
                        total: 6,
                        filtered: 3,
                        error: None
                    }
                );
            }

            #[tokio::test]
            async fn test_pre_filter_narrows_total() {
                let not_cancelled =
                    Predicate::compare(FieldPath::parse("status"), CompareOp::Ne, FieldValue::from("cancelled"));
                let listing = Listing::new(order_schema(), $factory).with_pre_filter(not_cancelled);
                let result = listing
                    .find_all(&describe(json!({ "where": { "total": { "lt": 100 } }, "order_by": { "id": "asc" } })))
                    .await;
                assert_eq!(result.total, 5);
                assert_eq!(result.filtered, 2);
                assert_eq!(ids(&result), vec![2, 4]);
            }

            #[tokio::test]
            async fn test_additional_predicate_keeps_total() {
                let listing = Listing::new(order_schema(), $factory);
                let priority = Predicate::compare(FieldPath::parse("priority"), CompareOp::Eq, FieldValue::Boolean(true));
                let result = listing
                    .find_all_with(&describe(json!({ "order_by": { "id": "asc" } })), priority)
                    .await;
                assert_eq!(result.total, 6);
                assert_eq!(result.filtered, 2);
                assert_eq!(ids(&result), vec![3, 6]);
            }

            #[tokio::test]
            async fn test_find_all_as_converts_rows() {
                let listing = Listing::new(order_schema(), $factory);
                let result = listing
                    .find_all_as(
                        &describe(json!({ "where": { "status": { "eq": "paid" } }, "order_by": { "id": "asc" } })),
                        |order| order.reference,
                    )
                    .await;
                assert_eq!(result.data, vec!["ACME-001", "GLOBEX-17", "UMBRELLA-1"]);
                assert_eq!(result.filtered, 3);
            }
        }
    };
}
