//! Core module: the filter/query compiler and its collaborator traits
//!
//! Everything in here is pure except [`service`], which drives a [`Store`].

pub mod assembler;
pub mod column_type;
pub mod compiler;
pub mod date;
pub mod envelope;
pub mod error;
pub mod field;
pub mod filter;
pub mod path;
pub mod predicate;
pub mod query;
pub mod service;
pub mod shape;
pub mod store;
pub mod tree;

pub use assembler::{AssembledQuery, assemble};
pub use column_type::ColumnType;
pub use envelope::{CountResult, QueryResult};
pub use error::{ConfigError, QueryError, SieveError, StorageError};
pub use field::FieldValue;
pub use filter::FilterExpression;
pub use path::{FieldPath, ResolvedField};
pub use predicate::{CompareOp, Predicate, like_to_regex};
pub use query::{Direction, PageRequest, QueryDescription, SortOrder};
pub use service::Listing;
pub use shape::{CollectionSchema, FieldDef, FieldKind, NativeType, RecordShape};
pub use store::Store;
pub use tree::{ColumnFilter, FilterNode, FilterTree};
