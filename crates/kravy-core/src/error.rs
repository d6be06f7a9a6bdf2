//! Error types for `kravy-core`.

use kravy_storage::StorageError;

/// Errors from submitting or reading enquiries.
#[derive(Debug, thiserror::Error)]
pub enum EnquiryError {
    /// A required field was absent or empty. Nothing was written.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// The document store failed.
    #[error("enquiry storage error: {0}")]
    Storage(#[from] StorageError),

    /// A record could not be encoded or a stored document could not be decoded.
    #[error("enquiry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EnquiryError {
    /// Whether the caller can fix this error by changing the request.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }
}
