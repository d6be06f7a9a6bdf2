//! Pure-Rust redb storage backend, the production default.
//!
//! redb uses a copy-on-write B-tree with a single writer, so the
//! check-then-insert in [`DocumentStore::insert`] happens inside one write
//! transaction and cannot race with another insert of the same id.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};

use crate::{DocumentStore, InsertOutcome, StorageError, collection_prefix, document_key};

/// All collections share one table; keys are `{collection}/{id}`.
const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// A document store backed by a single redb file.
///
/// Thread-safe via `Arc<Database>`. Blocking redb calls are offloaded to the
/// Tokio blocking thread pool.
///
/// # Examples
///
/// ```no_run
/// # use kravy_storage::RedbBackend;
/// let backend = RedbBackend::open("/var/lib/kravy/leads.redb").unwrap();
/// ```
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
    path: PathBuf,
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbBackend {
    /// Open or create a redb database at the given path, creating missing
    /// parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if redb fails to open or create the
    /// database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Open {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        let db = Database::create(path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // Opening the table in a write transaction creates it if missing, so
        // readers never see a missing table on a fresh file.
        let txn = db.begin_write().map_err(|e| StorageError::Transaction {
            reason: e.to_string(),
        })?;
        {
            let _table = txn
                .open_table(DOCUMENTS)
                .map_err(|e| StorageError::MissingTable {
                    name: format!("documents: {e}"),
                })?;
        }
        txn.commit().map_err(|e| StorageError::Transaction {
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "redb document store opened");

        Ok(Self {
            db: Arc::new(db),
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
impl DocumentStore for RedbBackend {
    async fn insert(
        &self,
        collection: &str,
        id: &str,
        document: &[u8],
    ) -> Result<InsertOutcome, StorageError> {
        let db = Arc::clone(&self.db);
        let key = document_key(collection, id)?;
        let document = document.to_vec();
        tokio::task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(|e| StorageError::Transaction {
                reason: e.to_string(),
            })?;
            let outcome = {
                let mut table =
                    txn.open_table(DOCUMENTS)
                        .map_err(|e| StorageError::MissingTable {
                            name: format!("documents: {e}"),
                        })?;
                let exists = table
                    .get(key.as_str())
                    .map_err(|e| StorageError::Read {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?
                    .is_some();
                if exists {
                    InsertOutcome::AlreadyExists
                } else {
                    table
                        .insert(key.as_str(), document.as_slice())
                        .map_err(|e| StorageError::Write {
                            key: key.clone(),
                            reason: e.to_string(),
                        })?;
                    InsertOutcome::Created
                }
            };
            match outcome {
                InsertOutcome::Created => txn.commit().map_err(|e| StorageError::Transaction {
                    reason: e.to_string(),
                })?,
                InsertOutcome::AlreadyExists => txn.abort().map_err(|e| {
                    StorageError::Transaction {
                        reason: e.to_string(),
                    }
                })?,
            }
            Ok(outcome)
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
            let txn = db.begin_read().map_err(|e| StorageError::Transaction {
                reason: e.to_string(),
            })?;
            let table = txn
                .open_table(DOCUMENTS)
                .map_err(|e| StorageError::MissingTable {
                    name: format!("documents: {e}"),
                })?;
            let result = table
                .get(key.as_str())
                .map_err(|e| StorageError::Read {
                    key: key.clone(),
                    reason: e.to_string(),
                })?
                .map(|v| v.value().to_vec());
            Ok(result)
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
            let txn = db.begin_read().map_err(|e| StorageError::Transaction {
                reason: e.to_string(),
            })?;
            let table = txn
                .open_table(DOCUMENTS)
                .map_err(|e| StorageError::MissingTable {
                    name: format!("documents: {e}"),
                })?;

            let range = table
                .range(prefix.as_str()..)
                .map_err(|e| StorageError::List {
                    prefix: prefix.clone(),
                    reason: e.to_string(),
                })?;
            let mut ids = Vec::new();
            for item in range {
                let (k, _) = item.map_err(|e| StorageError::List {
                    prefix: prefix.clone(),
                    reason: e.to_string(),
                })?;
                match k.value().strip_prefix(prefix.as_str()) {
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
