//! # Sieve
//!
//! A backend-agnostic compiler for DataTables-style listing requests.
//!
//! A client sends a [`QueryDescription`](core::query::QueryDescription):
//! pagination, sort keys, a map of field path to
//! [`FilterExpression`](core::filter::FilterExpression) and an optional
//! free-text search. Sieve resolves every path against a declared
//! [`RecordShape`](core::shape::RecordShape), converts literals to the
//! field's [`ColumnType`](core::column_type::ColumnType), and compiles the
//! whole request into one backend-neutral
//! [`Predicate`](core::predicate::Predicate). A [`Store`](core::store::Store)
//! runs it and the [`Listing`](core::service::Listing) wraps the rows in a
//! [`QueryResult`](core::envelope::QueryResult) envelope.
//!
//! ## Features
//!
//! - **Typed filters**: `eq`, `ne`, `in`, `nin`, ranges, `regex`, `like`,
//!   `exists`, `isNull`, `isEmpty`, `isVoid`, each typed by the record shape
//! - **Nested paths**: dotted paths through embedded records and lists;
//!   conditions on a list share one element
//! - **Global search**: case-insensitive substring over searchable fields
//! - **Backends**: in-memory evaluation, parameterized SQL rendering,
//!   MongoDB (feature `mongodb_backend`)
//! - **HTTP**: axum routes for query and count per collection
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sieve::prelude::*;
//!
//! let shape = RecordShape::new("order")
//!     .field(FieldDef::scalar("reference", NativeType::String))
//!     .field(FieldDef::scalar("total", NativeType::F64));
//! let schema = CollectionSchema::new("orders", shape).with_searchable(["reference"]);
//! let listing = Listing::new(schema, InMemoryStore::<Order>::with_rows(orders)?);
//!
//! let input: QueryDescription = serde_json::from_value(json!({
//!     "offset": 0,
//!     "limit": 20,
//!     "order_by": { "total": "desc" },
//!     "where": { "total": { "gte": 100 } },
//!     "search": "ACME"
//! }))?;
//! let page = listing.find_all(&input).await;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Compiler ===
    pub use crate::core::{
        assembler::{AssembledQuery, assemble},
        column_type::ColumnType,
        envelope::{CountResult, QueryResult},
        error::{ConfigError, QueryError, SieveError, StorageError},
        field::FieldValue,
        filter::FilterExpression,
        path::FieldPath,
        predicate::{CompareOp, Predicate},
        query::{Direction, PageRequest, QueryDescription, SortOrder},
        service::Listing,
        shape::{CollectionSchema, FieldDef, FieldKind, NativeType, RecordShape},
        store::Store,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoStore;
    pub use crate::storage::{Dialect, SqlRenderer};

    // === Config ===
    pub use crate::config::{CollectionConfig, FieldConfig, SchemaConfig};

    // === Server ===
    pub use crate::server::{ListingEndpoint, ListingRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::Router;
}
