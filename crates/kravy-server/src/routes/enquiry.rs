//! Enquiry routes: `/api/enquiry`
//!
//! `POST` validates and stores an enquiry; `GET` is a liveness probe that
//! never touches storage.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::debug;

use kravy_core::enquiry::{EnquiryRequest, EnquiryResponse, PROBE_MESSAGE, SUBMITTED_MESSAGE};
use kravy_core::store::Submission;

use crate::error::AppError;
use crate::state::AppState;

/// Upper bound on an enquiry body; the form has a handful of short fields.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Build the `/api/enquiry` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(probe).post(submit_enquiry))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Liveness probe. Does not reflect storage health.
async fn probe() -> Json<EnquiryResponse> {
    Json(EnquiryResponse::success(PROBE_MESSAGE))
}

/// Validate and persist one enquiry.
///
/// The body is parsed as JSON regardless of `Content-Type`. A body that
/// cannot be read or parsed is an unexpected failure, not a validation one.
async fn submit_enquiry(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<EnquiryResponse>, AppError> {
    let request: EnquiryRequest = serde_json::from_slice(&body?)?;

    match state.enquiries.submit(request).await? {
        Submission::Created(enquiry) => {
            debug!(enquiry_id = %enquiry.id, "enquiry accepted");
        }
        Submission::Replayed { id } => {
            debug!(enquiry_id = %id, "duplicate submission acknowledged");
        }
    }

    Ok(Json(EnquiryResponse::success(SUBMITTED_MESSAGE)))
}
