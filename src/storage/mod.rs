//! Storage implementations for different backends
//!
//! - [`InMemoryStore`]: rows kept as JSON, predicates run by [`evaluator`]
//! - [`SqlRenderer`]: renders predicates into parameterized SQL
//! - `MongoStore` (feature `mongodb_backend`): renders predicates into BSON

pub mod evaluator;
#[cfg(feature = "in-memory")]
pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;
pub mod sql;

#[cfg(feature = "in-memory")]
pub use in_memory::InMemoryStore;
#[cfg(feature = "mongodb_backend")]
pub use mongodb::MongoStore;
pub use sql::{Dialect, SqlRenderer, SqlStatement};
