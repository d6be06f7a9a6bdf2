//! Document store abstraction for Kravy.
//!
//! This crate defines the [`DocumentStore`] trait, a minimal document
//! interface that knows nothing about enquiries or HTTP. Documents are opaque
//! byte arrays grouped into named collections and addressed by id. The
//! enquiry store in `kravy-core` serializes records before they reach this
//! layer.
//!
//! Three implementations are provided:
//!
//! - [`RedbBackend`]: production default, pure Rust (feature `redb-backend`)
//! - [`RocksDbBackend`]: backed by `RocksDB` (feature `rocksdb-backend`)
//! - [`MemoryBackend`]: in-memory, for development and tests

mod error;
mod memory;
#[cfg(feature = "redb-backend")]
mod redb_backend;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb_backend;

pub use error::StorageError;
pub use memory::MemoryBackend;
#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;
#[cfg(feature = "rocksdb-backend")]
pub use rocksdb_backend::RocksDbBackend;

/// Result of a conditional [`DocumentStore::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The document was written.
    Created,
    /// A document with the same id already existed and was left untouched.
    AlreadyExists,
}

/// A pluggable document storage backend.
///
/// Collections are flat namespaces (e.g. `enquiries`); ids are unique within
/// a collection. Documents are never updated in place: [`insert`] only
/// writes when the id is free, which is what makes idempotent resubmission
/// possible above this layer.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
///
/// [`insert`]: DocumentStore::insert
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Establish (or confirm) the connection to the underlying store.
    ///
    /// Called before every write. Must be idempotent; embedded backends
    /// that are connected from the moment they are opened keep the default.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the store cannot be reached.
    async fn connect(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Insert a document unless one with the same id already exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for a malformed collection or id,
    /// and [`StorageError::Write`] if the underlying backend fails.
    async fn insert(
        &self,
        collection: &str,
        id: &str,
        document: &[u8],
    ) -> Result<InsertOutcome, StorageError>;

    /// Retrieve a document by id.
    ///
    /// Returns `Ok(None)` if the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// List the ids of every document in a collection, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::List`] if the underlying backend fails.
    async fn list(&self, collection: &str) -> Result<Vec<String>, StorageError>;

    /// Count the documents in a collection.
    ///
    /// The default implementation calls [`list`](DocumentStore::list).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::List`] if the underlying backend fails.
    async fn count(&self, collection: &str) -> Result<usize, StorageError> {
        Ok(self.list(collection).await?.len())
    }
}

/// Build the flat storage key for a document: `{collection}/{id}`.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] if the collection is empty or
/// contains `/`, or the id is empty.
pub fn document_key(collection: &str, id: &str) -> Result<String, StorageError> {
    if collection.is_empty() || collection.contains('/') {
        return Err(StorageError::InvalidKey {
            reason: format!("invalid collection name '{collection}'"),
        });
    }
    if id.is_empty() {
        return Err(StorageError::InvalidKey {
            reason: "document id must not be empty".to_owned(),
        });
    }
    Ok(format!("{collection}/{id}"))
}

/// Prefix shared by every key of a collection.
pub(crate) fn collection_prefix(collection: &str) -> Result<String, StorageError> {
    if collection.is_empty() || collection.contains('/') {
        return Err(StorageError::InvalidKey {
            reason: format!("invalid collection name '{collection}'"),
        });
    }
    Ok(format!("{collection}/"))
}
