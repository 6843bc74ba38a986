//! In-memory store for testing and development

use crate::core::error::StorageError;
use crate::core::predicate::Predicate;
use crate::core::query::{PageRequest, SortOrder};
use crate::core::store::Store;
use crate::storage::evaluator;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

/// In-memory store implementation
///
/// Rows are kept in their JSON form, so predicates are evaluated against
/// exactly what a document store would see. Uses RwLock for thread-safe
/// access; clones share the same rows.
pub struct InMemoryStore<T> {
    rows: Arc<RwLock<Vec<Value>>>,
    _rows: PhantomData<fn() -> T>,
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            _rows: PhantomData,
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            _rows: PhantomData,
        }
    }
}

impl<T> InMemoryStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `rows`, in order
    pub fn with_rows<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let store = Self::new();
        for row in rows {
            store.insert(&row)?;
        }
        Ok(store)
    }

    /// Append one row
    pub fn insert(&self, row: &T) -> Result<()> {
        let value = serde_json::to_value(row).map_err(|e| StorageError::SerializationError {
            message: e.to_string(),
        })?;
        let mut rows = self
            .rows
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        rows.push(value);
        Ok(())
    }

    /// Remove every row
    pub fn clear(&self) -> Result<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        rows.clear();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<T> Store<T> for InMemoryStore<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    async fn count(&self, predicate: Option<&Predicate>) -> Result<u64> {
        let rows = self
            .rows
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let count = match predicate {
            Some(predicate) => rows
                .iter()
                .filter(|row| evaluator::matches(predicate, row))
                .count(),
            None => rows.len(),
        };
        Ok(count as u64)
    }

    async fn find(
        &self,
        predicate: &Predicate,
        page: &PageRequest,
        sort: &[SortOrder],
    ) -> Result<Vec<T>> {
        let selected: Vec<Value> = {
            let rows = self
                .rows
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

            let mut matching: Vec<&Value> = rows
                .iter()
                .filter(|row| evaluator::matches(predicate, row))
                .collect();
            if !sort.is_empty() {
                matching.sort_by(|a, b| evaluator::compare_documents(a, b, sort));
            }

            let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
            let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
            matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect()
        };

        selected
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    StorageError::SerializationError {
                        message: e.to_string(),
                    }
                    .into()
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldValue;
    use crate::core::path::FieldPath;
    use crate::core::predicate::CompareOp;
    use crate::core::query::Direction;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct City {
        name: String,
        population: u64,
    }

    fn city(name: &str, population: u64) -> City {
        City {
            name: name.to_string(),
            population,
        }
    }

    fn store() -> InMemoryStore<City> {
        InMemoryStore::with_rows([
            city("Lyon", 522_000),
            city("Paris", 2_100_000),
            city("Nice", 342_000),
            city("Lille", 236_000),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_count_all_and_filtered() {
        let store = store();
        assert_eq!(store.count(None).await.unwrap(), 4);

        let big = Predicate::compare(
            FieldPath::parse("population"),
            CompareOp::Gt,
            FieldValue::Integer(400_000),
        );
        assert_eq!(store.count(Some(&big)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_sorts_and_pages() {
        let sort = vec![SortOrder {
            field: FieldPath::parse("population"),
            direction: Direction::Desc,
        }];
        let page = PageRequest { offset: 1, limit: 2 };
        let rows = store().find(&Predicate::True, &page, &sort).await.unwrap();
        assert_eq!(rows, vec![city("Lyon", 522_000), city("Nice", 342_000)]);
    }

    #[tokio::test]
    async fn test_find_keeps_insertion_order_without_sort() {
        let page = PageRequest { offset: 0, limit: u64::MAX };
        let rows = store().find(&Predicate::True, &page, &[]).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Lyon", "Paris", "Nice", "Lille"]);
    }

    #[tokio::test]
    async fn test_clones_share_rows() {
        let store = InMemoryStore::<City>::new();
        let other = store.clone();
        other.insert(&city("Brest", 139_000)).unwrap();
        assert_eq!(store.len(), 1);
        store.clear().unwrap();
        assert!(other.is_empty());
    }
}
