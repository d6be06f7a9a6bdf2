//! In-memory storage backend.
//!
//! Stores all documents in a `BTreeMap` behind a `RwLock`. Not persistent;
//! everything is lost when the process exits. Used for development servers
//! and for tests that need a real store without touching disk.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{DocumentStore, InsertOutcome, StorageError, collection_prefix, document_key};

/// An in-memory document store backed by a `BTreeMap`.
///
/// Keys are sorted, so listing a collection is a range scan. Clones share
/// the same underlying map.
///
/// # Examples
///
/// ```
/// # use kravy_storage::{DocumentStore, InsertOutcome, MemoryBackend};
/// # #[tokio::main]
/// # async fn main() {
/// let backend = MemoryBackend::new();
/// let outcome = backend.insert("enquiries", "a1", b"{}").await.unwrap();
/// assert_eq!(outcome, InsertOutcome::Created);
/// assert_eq!(backend.count("enquiries").await.unwrap(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryBackend {
    async fn insert(
        &self,
        collection: &str,
        id: &str,
        document: &[u8],
    ) -> Result<InsertOutcome, StorageError> {
        let key = document_key(collection, id)?;
        let mut data = self.data.write().await;
        match data.entry(key) {
            Entry::Occupied(_) => Ok(InsertOutcome::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(document.to_vec());
                Ok(InsertOutcome::Created)
            }
        }
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let key = document_key(collection, id)?;
        let data = self.data.read().await;
        Ok(data.get(&key).cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, StorageError> {
        let prefix = collection_prefix(collection)?;
        let data = self.data.read().await;
        let ids = data
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k[prefix.len()..].to_owned())
            .collect();
        Ok(ids)
    }
}
