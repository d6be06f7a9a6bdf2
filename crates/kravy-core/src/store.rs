//! Enquiry persistence.
//!
//! [`EnquiryStore`] is the only write path for enquiry records. Each
//! submission validates the request, confirms the store connection, and
//! performs at most one conditional insert into the `enquiries` collection.

use std::sync::Arc;

use chrono::Utc;
use kravy_storage::{DocumentStore, InsertOutcome};
use tracing::{debug, info};

use crate::enquiry::{Enquiry, EnquiryRequest};
use crate::error::EnquiryError;

/// Collection holding every enquiry document.
pub const COLLECTION: &str = "enquiries";

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A new record was written.
    Created(Enquiry),
    /// A record with the same idempotency key already existed; nothing was
    /// written.
    Replayed { id: String },
}

impl Submission {
    /// Id of the record this submission resolved to.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Created(enquiry) => &enquiry.id,
            Self::Replayed { id } => id,
        }
    }
}

/// Validates and persists enquiries.
pub struct EnquiryStore {
    storage: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for EnquiryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnquiryStore").finish_non_exhaustive()
    }
}

impl EnquiryStore {
    /// Create a store writing through the given backend.
    #[must_use]
    pub fn new(storage: Arc<dyn DocumentStore>) -> Self {
        Self { storage }
    }

    /// Validate and persist an enquiry.
    ///
    /// Validation happens before the store is touched, so a rejected request
    /// never causes a connection attempt or a write.
    ///
    /// # Errors
    ///
    /// - [`EnquiryError::MissingField`] if `name` or `phone` is absent or empty.
    /// - [`EnquiryError::Storage`] if connecting or writing fails.
    /// - [`EnquiryError::Serialization`] if the record cannot be encoded.
    pub async fn submit(&self, request: EnquiryRequest) -> Result<Submission, EnquiryError> {
        let valid = request.validate()?;

        self.storage.connect().await?;

        let enquiry = Enquiry::from_valid(valid, Utc::now());
        let document = serde_json::to_vec(&enquiry)?;

        match self.storage.insert(COLLECTION, &enquiry.id, &document).await? {
            InsertOutcome::Created => {
                info!(
                    enquiry_id = %enquiry.id,
                    source = enquiry.source.as_deref().unwrap_or("-"),
                    "enquiry stored"
                );
                Ok(Submission::Created(enquiry))
            }
            InsertOutcome::AlreadyExists => {
                debug!(enquiry_id = %enquiry.id, "enquiry replayed, nothing written");
                Ok(Submission::Replayed { id: enquiry.id })
            }
        }
    }

    /// Load a stored enquiry by id.
    ///
    /// # Errors
    ///
    /// Returns [`EnquiryError::Storage`] if the read fails, or
    /// [`EnquiryError::Serialization`] if the stored document is corrupt.
    pub async fn get(&self, id: &str) -> Result<Option<Enquiry>, EnquiryError> {
        match self.storage.get(COLLECTION, id).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Number of stored enquiries.
    ///
    /// # Errors
    ///
    /// Returns [`EnquiryError::Storage`] if listing fails.
    pub async fn count(&self) -> Result<usize, EnquiryError> {
        Ok(self.storage.count(COLLECTION).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use kravy_storage::{MemoryBackend, StorageError};

    fn make_store() -> (MemoryBackend, EnquiryStore) {
        let backend = MemoryBackend::new();
        let store = EnquiryStore::new(Arc::new(backend.clone()));
        (backend, store)
    }

    fn asha() -> EnquiryRequest {
        EnquiryRequest {
            name: Some("Asha".to_owned()),
            phone: Some("9876543210".to_owned()),
            source: Some("popup".to_owned()),
            ..Default::default()
        }
    }

    /// Backend whose connection always fails.
    struct Unreachable;

    #[async_trait::async_trait]
    impl DocumentStore for Unreachable {
        async fn connect(&self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable {
                reason: "connection refused".to_owned(),
            })
        }

        async fn insert(&self, _: &str, _: &str, _: &[u8]) -> Result<InsertOutcome, StorageError> {
            panic!("insert must not be reached without a connection");
        }

        async fn get(&self, _: &str, _: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(None)
        }

        async fn list(&self, _: &str) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn valid_submission_writes_one_record() {
        let (backend, store) = make_store();
        let submission = store.submit(asha()).await.unwrap();

        assert!(matches!(submission, Submission::Created(_)));
        assert_eq!(backend.count(COLLECTION).await.unwrap(), 1);

        let stored = store.get(submission.id()).await.unwrap().unwrap();
        assert_eq!(stored.name, "Asha");
        assert_eq!(stored.phone, "9876543210");
        assert_eq!(stored.source.as_deref(), Some("popup"));
        assert_eq!(stored.email, None);
    }

    #[tokio::test]
    async fn missing_phone_writes_nothing() {
        let (_, store) = make_store();
        let request = EnquiryRequest {
            phone: None,
            ..asha()
        };

        let err = store.submit(request).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn validation_runs_before_connecting() {
        let store = EnquiryStore::new(Arc::new(Unreachable));
        let err = store.submit(EnquiryRequest::default()).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn unreachable_store_surfaces_storage_error() {
        let store = EnquiryStore::new(Arc::new(Unreachable));
        let err = store.submit(asha()).await.unwrap_err();
        assert!(matches!(
            err,
            EnquiryError::Storage(StorageError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn same_idempotency_key_creates_one_record() {
        let (_, store) = make_store();
        let request = EnquiryRequest {
            idempotency_key: Some("open-7".to_owned()),
            ..asha()
        };

        let first = store.submit(request.clone()).await.unwrap();
        let second = store.submit(request).await.unwrap();

        assert!(matches!(first, Submission::Created(_)));
        assert_eq!(
            second,
            Submission::Replayed {
                id: "open-7".to_owned()
            }
        );
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn submissions_without_key_are_independent() {
        let (_, store) = make_store();
        store.submit(asha()).await.unwrap();
        store.submit(asha()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let (_, store) = make_store();
        assert!(store.get("nope").await.unwrap().is_none());
    }
}
