//! Shared test harness for listing stores
//!
//! Provides the `Order` fixture with fields covering every column type,
//! its record shape, six seeded orders, a store that fails on demand, and
//! the `listing_store_tests!` macro that runs the same listing scenarios
//! against any `Store<Order>`.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod listing_store_tests;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

use sieve::core::envelope::QueryResult;
use sieve::core::predicate::Predicate;
use sieve::core::query::{PageRequest, QueryDescription, SortOrder};
use sieve::core::shape::{CollectionSchema, FieldDef, NativeType, RecordShape};
use sieve::core::store::Store;

// ---------------------------------------------------------------------------
// Order fixture
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub full_name: String,
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub sku: String,
    pub qty: u32,
}

/// An order with fields spanning all column types.
///
/// - `id`, `items.qty`: Integer
/// - `reference`, `status`, `note`: String
/// - `total`: Double
/// - `priority`: Boolean
/// - `created_at`, `shipped_at`: Date (`shipped_at` stored as null when unset)
/// - `coupon`: absent from the stored row when unset
/// - `ratings`: list of Integer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub reference: String,
    pub status: String,
    pub total: f64,
    pub priority: bool,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
    pub note: String,
    pub customer: Customer,
    pub items: Vec<Item>,
    pub tags: Vec<String>,
    pub ratings: Vec<i32>,
}

pub fn order_shape() -> RecordShape {
    RecordShape::new("order")
        .field(FieldDef::scalar("id", NativeType::U64))
        .field(FieldDef::scalar("reference", NativeType::String))
        .field(FieldDef::scalar("status", NativeType::String))
        .field(FieldDef::scalar("total", NativeType::F64))
        .field(FieldDef::scalar("priority", NativeType::Bool))
        .field(FieldDef::scalar("created_at", NativeType::DateTime).with_alias("createdAt"))
        .field(FieldDef::scalar("shipped_at", NativeType::DateTime).with_alias("shippedAt"))
        .field(FieldDef::scalar("coupon", NativeType::String))
        .field(FieldDef::scalar("note", NativeType::String))
        .field(FieldDef::record(
            "customer",
            RecordShape::new("customer")
                .field(FieldDef::scalar("full_name", NativeType::String).with_alias("fullName"))
                .field(FieldDef::scalar("email", NativeType::String)),
        ))
        .field(FieldDef::list_of(
            "items",
            RecordShape::new("item")
                .field(FieldDef::scalar("sku", NativeType::String))
                .field(FieldDef::scalar("qty", NativeType::U32)),
        ))
        .field(FieldDef::list_of_scalars("tags", NativeType::String))
        .field(FieldDef::list_of_scalars("ratings", NativeType::I32))
}

pub fn order_schema() -> CollectionSchema {
    CollectionSchema::new("orders", order_shape()).with_searchable(["reference", "customer.fullName"])
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn order(
    id: u64,
    reference: &str,
    status: &str,
    total: f64,
    created_day: u32,
    shipped_day: Option<u32>,
    customer: (&str, Option<&str>),
    items: &[(&str, u32)],
) -> Order {
    Order {
        id,
        reference: reference.to_string(),
        status: status.to_string(),
        total,
        priority: false,
        created_at: at(created_day, 10),
        shipped_at: shipped_day.map(|day| at(day, 16)),
        coupon: None,
        note: String::new(),
        customer: Customer {
            full_name: customer.0.to_string(),
            email: customer.1.map(str::to_string),
        },
        items: items
            .iter()
            .map(|(sku, qty)| Item {
                sku: sku.to_string(),
                qty: *qty,
            })
            .collect(),
        tags: Vec::new(),
        ratings: Vec::new(),
    }
}

/// Six orders, ids 1 to 6
///
/// | id | reference  | status    | total  | created       | shipped | coupon  | note       | customer        | email | items             | tags        | ratings |
/// |----|------------|-----------|--------|---------------|---------|---------|------------|-----------------|-------|-------------------|-------------|---------|
/// | 1  | ACME-001   | paid      | 129.90 | 03-01         | 03-02   | SPRING  | ""         | Ada Lovelace    | yes   | KB-101x1, MS-7x2  | vip         | 5, 4    |
/// | 2  | ACME-002   | pending   | 42.00  | 03-03         | -       | -       | call first | Alan Turing     | -     | CB-USBx4          |             |         |
/// | 3  | GLOBEX-17  | paid      | 310.50 | 03-05         | 03-06   | -       | ""         | Grace Hopper    | yes   | KB-202x2, MS-7x1  | vip, early  | 3       |
/// | 4  | ACME-003   | shipped   | 89.99  | 03-08 +500ms  | 03-09   | WELCOME | gift       | Ada Lovelace    | yes   | MS-9x1            | early       |         |
/// | 5  | INITECH-9  | cancelled | 15.00  | 03-08         | -       | -       | ""         | Edsger Dijkstra | ""    |                   |             |         |
/// | 6  | UMBRELLA-1 | paid      | 250.00 | 03-12         | 03-13   | -       | rush       | Barbara Liskov  | yes   | KB-101x3          | vip         | 5       |
///
/// Every order is created at 10:00 UTC; order 4 half a second later than
/// order 5. Orders 3 and 6 have `priority` set.
pub fn seed_orders() -> Vec<Order> {
    let ada = Some("ada@example.com");
    vec![
        Order {
            coupon: Some("SPRING".to_string()),
            tags: vec!["vip".to_string()],
            ratings: vec![5, 4],
            ..order(1, "ACME-001", "paid", 129.90, 1, Some(2), ("Ada Lovelace", ada), &[("KB-101", 1), ("MS-7", 2)])
        },
        Order {
            note: "call first".to_string(),
            ..order(2, "ACME-002", "pending", 42.00, 3, None, ("Alan Turing", None), &[("CB-USB", 4)])
        },
        Order {
            priority: true,
            tags: vec!["vip".to_string(), "early".to_string()],
            ratings: vec![3],
            ..order(
                3,
                "GLOBEX-17",
                "paid",
                310.50,
                5,
                Some(6),
                ("Grace Hopper", Some("grace@example.com")),
                &[("KB-202", 2), ("MS-7", 1)],
            )
        },
        Order {
            coupon: Some("WELCOME".to_string()),
            note: "gift".to_string(),
            tags: vec!["early".to_string()],
            created_at: at(8, 10) + chrono::Duration::milliseconds(500),
            ..order(4, "ACME-003", "shipped", 89.99, 8, Some(9), ("Ada Lovelace", ada), &[("MS-9", 1)])
        },
        order(5, "INITECH-9", "cancelled", 15.00, 8, None, ("Edsger Dijkstra", Some("")), &[]),
        Order {
            priority: true,
            note: "rush".to_string(),
            tags: vec!["vip".to_string()],
            ratings: vec![5],
            ..order(
                6,
                "UMBRELLA-1",
                "paid",
                250.00,
                12,
                Some(13),
                ("Barbara Liskov", Some("barbara@example.com")),
                &[("KB-101", 3)],
            )
        },
    ]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a wire query description
pub fn describe(wire: serde_json::Value) -> QueryDescription {
    serde_json::from_value(wire).expect("valid query description")
}

/// Ids of the returned rows, in order
pub fn ids(result: &QueryResult<Order>) -> Vec<u64> {
    result.data.iter().map(|order| order.id).collect()
}

/// A store whose `count` answers `total` and whose `find` (or every call
/// after the first count, with `fail_after_total`) fails
#[derive(Default)]
pub struct FailingStore {
    pub total: u64,
    pub fail_after_total: bool,
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Answers the first count, fails every later call
    pub fn failing_after_total(total: u64) -> Self {
        Self {
            total,
            fail_after_total: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store<Order> for FailingStore {
    async fn count(&self, _predicate: Option<&Predicate>) -> Result<u64> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after_total && call > 0 {
            return Err(anyhow!("count failed: connection reset"));
        }
        Ok(self.total)
    }

    async fn find(&self, _predicate: &Predicate, _page: &PageRequest, _sort: &[SortOrder]) -> Result<Vec<Order>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("find failed: connection reset"))
    }
}
