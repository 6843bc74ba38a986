//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides [`MongoStore<T>`], which renders compiled predicates into BSON
//! filter documents and runs them with `count_documents` / `find`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! sieve-rs = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Serialization strategy
//!
//! Rows are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. Any RFC 3339 string is stored in one
//! fixed-width UTC form with nanosecond digits, and date literals are
//! rendered the same way, so text order is time order for range filters and
//! sorts. The `id` field is mapped to MongoDB's `_id` convention.
//!
//! # Global search
//!
//! `$regex` only sees string values, so search fragments also test the
//! `$convert`ed text of the field in an `$expr`. Inside `$elemMatch`, where
//! `$expr` is not allowed, the `$regex` form is used alone; the nested
//! search fragments the assembler emits are covered at the top level with
//! `$anyElementTrue` over the list.

use crate::core::date;
use crate::core::field::FieldValue;
use crate::core::path::FieldPath;
use crate::core::predicate::{CompareOp, Predicate, like_to_regex};
use crate::core::query::{Direction, PageRequest, SortOrder};
use crate::core::store::Store;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Database;
use mongodb::bson::{Bson, Document, doc};
use serde::Serialize;
use serde::de::DeserializeOwned;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON Document,
/// renaming `id` → `_id` for MongoDB convention.
fn json_to_document(mut json: serde_json::Value) -> Result<Document> {
    normalize_dates(&mut json);
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value,
/// renaming `_id` → `id`.
fn document_to_json(mut doc: Document) -> serde_json::Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

/// Rewrite RFC 3339 strings, at any depth, into the stored date form
fn normalize_dates(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(text) => {
            if let Some(fixed) = stored_date(text) {
                *text = fixed;
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(normalize_dates),
        serde_json::Value::Object(map) => map.values_mut().for_each(normalize_dates),
        _ => {}
    }
}

fn stored_date(text: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| date::format_fixed(&dt.with_timezone(&Utc)))
}

fn field_name(path: &FieldPath) -> String {
    let dotted = path.dotted();
    if dotted == "id" { "_id".to_string() } else { dotted }
}

fn value_bson(value: &FieldValue) -> Bson {
    match value {
        FieldValue::String(s) => Bson::String(stored_date(s).unwrap_or_else(|| s.clone())),
        FieldValue::Integer(i) => Bson::Int64(*i),
        FieldValue::Double(d) => Bson::Double(*d),
        FieldValue::Boolean(b) => Bson::Boolean(*b),
        FieldValue::Date(dt) => Bson::String(date::format_fixed(dt)),
        FieldValue::Null => Bson::Null,
    }
}

fn values_bson(values: &[FieldValue]) -> Bson {
    Bson::Array(values.iter().map(value_bson).collect())
}

fn operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "$eq",
        CompareOp::Ne => "$ne",
        CompareOp::Gt => "$gt",
        CompareOp::Gte => "$gte",
        CompareOp::Lt => "$lt",
        CompareOp::Lte => "$lte",
    }
}

fn on_field(field: &FieldPath, condition: impl Into<Bson>) -> Document {
    let mut document = Document::new();
    document.insert(field_name(field), condition);
    document
}

fn condition(op: &str, value: impl Into<Bson>) -> Document {
    let mut document = Document::new();
    document.insert(op, value);
    document
}

/// Render a predicate into a MongoDB query filter
pub fn filter_document(predicate: &Predicate) -> Document {
    render(predicate, false)
}

/// `in_element` is set below `$elemMatch`
fn render(predicate: &Predicate, in_element: bool) -> Document {
    match predicate {
        Predicate::True => doc! {},
        Predicate::False => doc! { "$expr": false },
        Predicate::Compare { field, op, value } => on_field(field, condition(operator(*op), value_bson(value))),
        Predicate::In { field, values } => on_field(field, doc! { "$in": values_bson(values) }),
        Predicate::NotIn { field, values } => on_field(field, doc! { "$nin": values_bson(values) }),
        Predicate::Like { field, pattern } => {
            on_field(field, doc! { "$regex": like_to_regex(pattern), "$options": "i" })
        }
        Predicate::Regex { field, pattern } => on_field(field, doc! { "$regex": pattern.as_str() }),
        Predicate::Contains { field, needle } => {
            let text = on_field(field, doc! { "$regex": regex::escape(needle), "$options": "i" });
            match search_expression(predicate, "$") {
                Some(expression) if !in_element => doc! { "$or": [ text, { "$expr": expression } ] },
                _ => text,
            }
        }
        Predicate::Exists { field, exists } => on_field(field, doc! { "$exists": *exists }),
        Predicate::IsNull { field } => on_field(field, Bson::Null),
        Predicate::IsEmpty { field } => on_field(field, doc! { "$in": [ "", Bson::Array(Vec::new()) ] }),
        Predicate::Nested { field, predicate: inner } => {
            let element = on_field(field, doc! { "$elemMatch": render(inner, true) });
            match search_expression(predicate, "$") {
                Some(expression) if !in_element => doc! { "$or": [ element, { "$expr": expression } ] },
                _ => element,
            }
        }
        Predicate::Not(inner) => match inner.as_ref() {
            Predicate::IsNull { field } => on_field(field, doc! { "$ne": Bson::Null }),
            other => doc! { "$nor": [ render(other, in_element) ] },
        },
        Predicate::And(parts) => {
            let parts: Vec<Document> = parts.iter().map(|part| render(part, in_element)).collect();
            doc! { "$and": parts }
        }
        Predicate::Or(parts) => {
            let parts: Vec<Document> = parts.iter().map(|part| render(part, in_element)).collect();
            doc! { "$or": parts }
        }
    }
}

/// Aggregation form of a search fragment: a `Contains`, possibly under
/// `Nested` lists. Field references are prefixed with `base`.
fn search_expression(predicate: &Predicate, base: &str) -> Option<Document> {
    match predicate {
        Predicate::Contains { field, needle } => Some(text_match(reference(field, base), needle)),
        Predicate::Nested { field, predicate } => {
            let inner = search_expression(predicate, "$$this.")?;
            let list = reference(field, base);
            Some(doc! {
                "$anyElementTrue": [ {
                    "$map": {
                        "input": { "$cond": [ { "$isArray": [ list.clone() ] }, list, [] ] },
                        "in": inner
                    }
                } ]
            })
        }
        _ => None,
    }
}

fn reference(field: &FieldPath, base: &str) -> String {
    if base == "$" {
        format!("${}", field_name(field))
    } else {
        format!("{base}{}", field.dotted())
    }
}

/// Case-insensitive substring test on the string conversion of `input`;
/// values without one (arrays, documents) never match
fn text_match(input: String, needle: &str) -> Document {
    doc! {
        "$regexMatch": {
            "input": { "$convert": { "input": input, "to": "string", "onError": "", "onNull": "" } },
            "regex": regex::escape(needle),
            "options": "i"
        }
    }
}

/// Render sort keys into a MongoDB sort document
pub fn sort_document(sort: &[SortOrder]) -> Document {
    let mut document = Document::new();
    for order in sort {
        let direction = match order.direction {
            Direction::Asc => 1,
            Direction::Desc => -1,
        };
        document.insert(field_name(&order.field), direction);
    }
    document
}

// ---------------------------------------------------------------------------
// MongoStore<T>
// ---------------------------------------------------------------------------

/// Listing store backed by one MongoDB collection
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use sieve::storage::MongoStore;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoStore::<Order>::new(client.database("shop"), "orders");
/// let listing = Listing::new(schema, store);
/// ```
#[derive(Clone, Debug)]
pub struct MongoStore<T> {
    database: Database,
    collection: String,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> MongoStore<T> {
    pub fn new(database: Database, collection: impl Into<String>) -> Self {
        Self {
            database,
            collection: collection.into(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(&self.collection)
    }
}

impl<T: Serialize + DeserializeOwned> MongoStore<T> {
    /// Insert rows, in order
    pub async fn insert_many(&self, rows: &[T]) -> Result<()> {
        let documents = rows
            .iter()
            .map(|row| {
                let json = serde_json::to_value(row)
                    .map_err(|e| anyhow!("Failed to serialize row: {}", e))?;
                json_to_document(json)
            })
            .collect::<Result<Vec<_>>>()?;
        if documents.is_empty() {
            return Ok(());
        }

        self.collection()
            .insert_many(documents)
            .await
            .map_err(|e| anyhow!("Failed to insert rows: {}", e))?;
        Ok(())
    }

    fn document_to_row(doc: Document) -> Result<T> {
        let json = document_to_json(doc);
        serde_json::from_value(json).map_err(|e| anyhow!("Failed to deserialize row from document: {}", e))
    }
}

#[async_trait]
impl<T> Store<T> for MongoStore<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    async fn count(&self, predicate: Option<&Predicate>) -> Result<u64> {
        let filter = predicate.map(filter_document).unwrap_or_default();
        tracing::debug!(collection = %self.collection, %filter, "count_documents");
        self.collection()
            .count_documents(filter)
            .await
            .map_err(|e| anyhow!("Failed to count documents: {}", e))
    }

    async fn find(
        &self,
        predicate: &Predicate,
        page: &PageRequest,
        sort: &[SortOrder],
    ) -> Result<Vec<T>> {
        // a zero limit means "no limit" to the driver
        if page.limit == 0 {
            return Ok(Vec::new());
        }

        let filter = filter_document(predicate);
        tracing::debug!(collection = %self.collection, %filter, "find");
        let cursor = self
            .collection()
            .find(filter)
            .sort(sort_document(sort))
            .skip(page.offset)
            .limit(i64::try_from(page.limit).unwrap_or(i64::MAX))
            .await
            .map_err(|e| anyhow!("Failed to query documents: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect documents: {}", e))?;

        docs.into_iter().map(Self::document_to_row).collect()
    }
}
