//! In-memory [`RecordLookup`] backend.

use crate::context::RecordLookup;
use crate::error::LookupError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Records grouped by collection, matched by JSON equality on one field.
///
/// ## Example
///
/// ```rust,ignore
/// let store = MemoryStore::new()
///     .with_record("User", json!({ "_id": "1", "email": "taken@example.com" }));
/// let ctx = ValidationContext::builder().records(store).build();
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, collection: impl Into<String>, record: Value) -> Self {
        self.insert(collection, record);
        self
    }

    pub fn insert(&self, collection: impl Into<String>, record: Value) {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections.entry(collection.into()).or_default().push(record);
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl RecordLookup for MemoryStore {
    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>, LookupError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| LookupError::new("memory store lock poisoned"))?;

        Ok(collections.get(collection).and_then(|records| {
            records
                .iter()
                .find(|record| record.get(field) == Some(value))
                .cloned()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn finds_matching_record() {
        let store = MemoryStore::new()
            .with_record("User", json!({ "_id": "1", "email": "a@example.com" }))
            .with_record("User", json!({ "_id": "2", "email": "b@example.com" }));

        let found = store
            .find_one("User", "email", &json!("b@example.com"))
            .await
            .unwrap();
        assert_eq!(found.unwrap()["_id"], "2");
        assert_eq!(store.count("User"), 2);
    }

    #[tokio::test]
    async fn misses_return_none() {
        let store = MemoryStore::new().with_record("User", json!({ "email": "a@example.com" }));

        assert!(store
            .find_one("User", "email", &json!("z@example.com"))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_one("Post", "email", &json!("a@example.com"))
            .await
            .unwrap()
            .is_none());
    }
}
