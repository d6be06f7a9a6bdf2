//! `RocksDB` storage backend.
//!
//! Wraps the `rocksdb` crate behind the [`DocumentStore`] trait. All
//! operations are dispatched to a blocking thread via
//! [`tokio::task::spawn_blocking`] since `RocksDB` is a synchronous C++ library.
//!
//! `RocksDB` has no native insert-if-absent, so conditional inserts are
//! serialized through a process-local write lock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rocksdb::{DBWithThreadMode, MultiThreaded, Options};

use crate::{DocumentStore, InsertOutcome, StorageError, collection_prefix, document_key};

type Db = DBWithThreadMode<MultiThreaded>;

/// A document store backed by `RocksDB`.
///
/// # Examples
///
/// ```no_run
/// # use kravy_storage::RocksDbBackend;
/// let backend = RocksDbBackend::open("/var/lib/kravy/leads").unwrap();
/// ```
#[derive(Clone)]
pub struct RocksDbBackend {
    db: Arc<Db>,
    write_lock: Arc<Mutex<()>>,
    path: PathBuf,
}

impl std::fmt::Debug for RocksDbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RocksDbBackend {
    /// Open a `RocksDB` database at the given path.
    ///
    /// Creates the database directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if `RocksDB` fails to open or create the
    /// database at the specified path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = Db::open(&opts, path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "rocksdb document store opened");

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
            path: path.to_path_buf(),
        })
    }

    /// Return the filesystem path of this database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl DocumentStore for RocksDbBackend {
    async fn insert(
        &self,
        collection: &str,
        id: &str,
        document: &[u8],
    ) -> Result<InsertOutcome, StorageError> {
        let db = Arc::clone(&self.db);
        let write_lock = Arc::clone(&self.write_lock);
        let key = document_key(collection, id)?;
        let document = document.to_vec();
        tokio::task::spawn_blocking(move || {
            let _guard = write_lock.lock().map_err(|_| StorageError::Transaction {
                reason: "write lock poisoned".to_owned(),
            })?;
            let existing = db.get(key.as_bytes()).map_err(|e| StorageError::Read {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            if existing.is_some() {
                return Ok(InsertOutcome::AlreadyExists);
            }
            db.put(key.as_bytes(), &document)
                .map_err(|e| StorageError::Write {
                    key,
                    reason: e.to_string(),
                })?;
            Ok(InsertOutcome::Created)
        })
        .await
        .map_err(|e| StorageError::Write {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let db = Arc::clone(&self.db);
        let key = document_key(collection, id)?;
        tokio::task::spawn_blocking(move || {
            db.get(key.as_bytes()).map_err(|e| StorageError::Read {
                key,
                reason: e.to_string(),
            })
        })
        .await
        .map_err(|e| StorageError::Read {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, StorageError> {
        let db = Arc::clone(&self.db);
        let prefix = collection_prefix(collection)?;
        tokio::task::spawn_blocking(move || {
            let iter = db.iterator(rocksdb::IteratorMode::From(
                prefix.as_bytes(),
                rocksdb::Direction::Forward,
            ));

            let mut ids = Vec::new();
            for item in iter {
                let (k, _) = item.map_err(|e| StorageError::List {
                    prefix: prefix.clone(),
                    reason: e.to_string(),
                })?;
                let key_str =
                    String::from_utf8(k.to_vec()).map_err(|e| StorageError::InvalidKey {
                        reason: e.to_string(),
                    })?;
                match key_str.strip_prefix(prefix.as_str()) {
                    Some(id) => ids.push(id.to_owned()),
                    None => break,
                }
            }
            Ok(ids)
        })
        .await
        .map_err(|e| StorageError::List {
            prefix: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn conditional_insert_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RocksDbBackend::open(dir.path()).unwrap();

        let first = backend.insert("enquiries", "a", b"1").await.unwrap();
        let again = backend.insert("enquiries", "a", b"2").await.unwrap();
        backend.insert("enquiries", "b", b"3").await.unwrap();

        assert_eq!(first, InsertOutcome::Created);
        assert_eq!(again, InsertOutcome::AlreadyExists);
        assert_eq!(backend.list("enquiries").await.unwrap(), vec!["a", "b"]);
        assert_eq!(
            backend.get("enquiries", "a").await.unwrap(),
            Some(b"1".to_vec())
        );
    }
}
