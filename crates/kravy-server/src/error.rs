//! HTTP error type for the Kravy server.
//!
//! Every error renders the same `{success: false, message}` body the
//! success path uses. Internal errors are logged with full detail and
//! reach the caller only as a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use kravy_core::enquiry::{EnquiryResponse, REQUIRED_FIELDS_MESSAGE, SERVER_ERROR_MESSAGE};
use kravy_core::error::EnquiryError;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Client sent a request missing required input. The message is shown
    /// to the caller.
    BadRequest(String),
    /// Anything unexpected. The detail is logged, never returned.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "enquiry request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SERVER_ERROR_MESSAGE.to_owned(),
                )
            }
        };

        (status, axum::Json(EnquiryResponse::failure(message))).into_response()
    }
}

impl From<EnquiryError> for AppError {
    fn from(err: EnquiryError) -> Self {
        match err {
            EnquiryError::MissingField { .. } => Self::BadRequest(REQUIRED_FIELDS_MESSAGE.to_owned()),
            EnquiryError::Storage(_) | EnquiryError::Serialization(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("malformed request body: {err}"))
    }
}

impl From<axum::extract::rejection::BytesRejection> for AppError {
    fn from(err: axum::extract::rejection::BytesRejection) -> Self {
        Self::Internal(format!("unreadable request body: {err}"))
    }
}
