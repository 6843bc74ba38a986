//! Orders listing API
//!
//! Serves `POST /orders/query` and `POST /orders/count` over an in-memory
//! store seeded with a few orders. Try:
//!
//! ```sh
//! curl -s localhost:3000/orders/query -H 'content-type: application/json' -d '{
//!   "draw": 1, "limit": 2,
//!   "order_by": { "total": "desc" },
//!   "where": { "items.sku": { "like": "kb-%" } },
//!   "search": "acme"
//! }'
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sieve::prelude::*;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

const SCHEMA: &str = r#"
max_page_size: 100
collections:
  - name: orders
    searchable: [reference, customer.fullName]
    fields:
      - { name: id, type: u64 }
      - { name: reference, type: string }
      - { name: status, type: string }
      - { name: total, type: f64 }
      - { name: created_at, alias: createdAt, type: datetime }
      - { name: cancelled_at, alias: cancelledAt, type: datetime }
      - name: customer
        fields:
          - { name: full_name, alias: fullName, type: string }
          - { name: email, type: string }
      - name: items
        list: true
        fields:
          - { name: sku, type: string }
          - { name: qty, type: u32 }
      - { name: tags, list: true, type: string }
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Customer {
    full_name: String,
    email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Item {
    sku: String,
    qty: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Order {
    id: u64,
    reference: String,
    status: String,
    total: f64,
    created_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
    customer: Customer,
    items: Vec<Item>,
    tags: Vec<String>,
}

fn order(id: u64, reference: &str, status: &str, total: f64, day: u32, customer: &str, items: &[(&str, u32)]) -> Order {
    Order {
        id,
        reference: reference.to_string(),
        status: status.to_string(),
        total,
        created_at: Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 0).single().unwrap_or_default(),
        cancelled_at: None,
        customer: Customer {
            full_name: customer.to_string(),
            email: Some(format!("{}@example.com", customer.to_lowercase().replace(' ', "."))),
        },
        items: items
            .iter()
            .map(|(sku, qty)| Item {
                sku: sku.to_string(),
                qty: *qty,
            })
            .collect(),
        tags: Vec::new(),
    }
}

fn seed() -> Vec<Order> {
    vec![
        order(1, "ACME-001", "paid", 129.90, 1, "Ada Lovelace", &[("KB-101", 1), ("MS-7", 2)]),
        order(2, "ACME-002", "pending", 42.00, 3, "Alan Turing", &[("CB-USB", 4)]),
        order(3, "GLOBEX-17", "paid", 310.50, 5, "Grace Hopper", &[("KB-202", 2)]),
        order(4, "ACME-003", "shipped", 89.99, 8, "Ada Lovelace", &[("MS-9", 1)]),
        Order {
            cancelled_at: Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).single(),
            tags: vec!["refund".to_string()],
            ..order(5, "INITECH-9", "cancelled", 15.00, 10, "Edsger Dijkstra", &[])
        },
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sieve=debug")))
        .init();

    let config = SchemaConfig::from_yaml_str(SCHEMA)?;
    let schema = config.collection("orders")?;

    // cancelled orders never show up, not even in `total`
    let not_cancelled = Predicate::is_null(FieldPath::parse("cancelled_at"));
    let orders = Listing::new(schema, InMemoryStore::with_rows(seed())?)
        .with_max_page_size(config.max_page_size)
        .with_pre_filter(not_cancelled);

    let sample: QueryDescription = serde_json::from_value(json!({
        "draw": 1,
        "limit": 2,
        "order_by": { "total": "desc" },
        "where": { "createdAt": { "gte": "2024-03-02", "lt": "2024-03-09" } }
    }))?;
    let query = orders.assemble(&sample)?;
    tracing::info!(predicate = %query.predicate, "sample query");
    let page = orders.execute(&query).await;
    println!("{}", serde_json::to_string_pretty(&page)?);

    ServerBuilder::new()
        .register(orders)
        .with_cors(CorsLayer::permissive())
        .serve("127.0.0.1:3000")
        .await
}
