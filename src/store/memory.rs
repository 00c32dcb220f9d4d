//! In-memory document store

use crate::error::StoreError;
use crate::store::types::DocumentStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// [`DocumentStore`] backed by a process-local map, for tests and local
/// development.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Value>>,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail with [`StoreError::Unavailable`], for
    /// exercising lost-write paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, collection: &str, id: &str, record: Value) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.documents
            .write()
            .await
            .insert((collection.to_owned(), id.to_owned()), record);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .get(&(collection.to_owned(), id.to_owned()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryDocumentStore::new();
        store
            .put("users", "u1", json!({"email": "a@x.com"}))
            .await
            .unwrap();

        let record = store.get("users", "u1").await.unwrap();
        assert_eq!(record, Some(json!({"email": "a@x.com"})));

        assert_eq!(store.get("users", "u2").await.unwrap(), None);
        assert_eq!(store.get("posts", "u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites_last_write_wins() {
        let store = MemoryDocumentStore::new();
        store.put("users", "u1", json!({"v": 1})).await.unwrap();
        store.put("users", "u1", json!({"v": 2})).await.unwrap();

        assert_eq!(store.get("users", "u1").await.unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let store = MemoryDocumentStore::new();
        store.set_fail_writes(true);

        let result = store.put("users", "u1", json!({})).await;
        assert_eq!(result.unwrap_err(), StoreError::Unavailable);

        store.set_fail_writes(false);
        assert!(store.put("users", "u1", json!({})).await.is_ok());
    }
}
