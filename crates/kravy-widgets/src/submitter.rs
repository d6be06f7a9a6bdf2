//! Sending enquiries to `/api/enquiry`.
//!
//! The dialog only sees the [`EnquirySubmitter`] trait. [`HttpSubmitter`]
//! is the production implementation over `reqwest`; tests substitute their
//! own.

use std::time::Duration;

use kravy_core::enquiry::{EnquiryRequest, EnquiryResponse};
use reqwest::StatusCode;

/// Path of the enquiry endpoint relative to the site origin.
pub const ENQUIRY_PATH: &str = "/api/enquiry";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a submission did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The server answered with a non-success status or `success: false`.
    #[error("enquiry rejected with status {status}")]
    Rejected {
        status: u16,
        /// Server-provided message, when the body carried a non-empty one.
        message: Option<String>,
    },

    /// The server answered with a success status but an unreadable body.
    #[error("malformed enquiry response with status {status}")]
    Malformed { status: u16 },

    /// The request never got a response.
    #[error("enquiry network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SubmitError {
    /// Message the server asked us to show, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            Self::Malformed { .. } | Self::Network(_) => None,
        }
    }
}

/// Something that can deliver an enquiry to the backend.
#[async_trait::async_trait]
pub trait EnquirySubmitter: Send + Sync {
    /// Submit one enquiry.
    ///
    /// Returns the server's payload only when the submission succeeded.
    ///
    /// # Errors
    ///
    /// Any other outcome is a [`SubmitError`].
    async fn submit(&self, request: &EnquiryRequest) -> Result<EnquiryResponse, SubmitError>;
}

/// [`EnquirySubmitter`] posting JSON to `{base_url}/api/enquiry`.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// Create a submitter for the site at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("kravy-widgets/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{ENQUIRY_PATH}", base_url.trim_end_matches('/')),
        })
    }

    /// Full URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call the liveness probe (`GET /api/enquiry`).
    ///
    /// # Errors
    ///
    /// Same classification as [`EnquirySubmitter::submit`].
    pub async fn probe(&self) -> Result<EnquiryResponse, SubmitError> {
        let response = self.client.get(&self.endpoint).send().await?;
        read_reply(response).await
    }
}

#[async_trait::async_trait]
impl EnquirySubmitter for HttpSubmitter {
    async fn submit(&self, request: &EnquiryRequest) -> Result<EnquiryResponse, SubmitError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        read_reply(response).await
    }
}

async fn read_reply(response: reqwest::Response) -> Result<EnquiryResponse, SubmitError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    classify(status, serde_json::from_slice(&bytes).ok())
}

/// Collapse status and (optional) parsed body into one outcome. A body that
/// failed to parse is treated like a missing one.
fn classify(
    status: StatusCode,
    body: Option<EnquiryResponse>,
) -> Result<EnquiryResponse, SubmitError> {
    match body {
        Some(body) if status.is_success() && body.success => Ok(body),
        Some(body) => Err(SubmitError::Rejected {
            status: status.as_u16(),
            message: Some(body.message).filter(|m| !m.is_empty()),
        }),
        None if status.is_success() => Err(SubmitError::Malformed {
            status: status.as_u16(),
        }),
        None => Err(SubmitError::Rejected {
            status: status.as_u16(),
            message: None,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    use axum::Json;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;

    #[test]
    fn success_needs_both_status_and_flag() {
        let ok = classify(StatusCode::OK, Some(EnquiryResponse::success("done")));
        assert_eq!(ok.unwrap().message, "done");

        let flagged = classify(StatusCode::OK, Some(EnquiryResponse::failure("Duplicate")));
        assert_eq!(flagged.unwrap_err().server_message(), Some("Duplicate"));
    }

    #[test]
    fn error_status_keeps_server_message() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            Some(EnquiryResponse::failure("Name and phone are required.")),
        )
        .unwrap_err();
        assert!(matches!(err, SubmitError::Rejected { status: 400, .. }));
        assert_eq!(err.server_message(), Some("Name and phone are required."));
    }

    #[test]
    fn empty_server_message_is_dropped() {
        let err = classify(StatusCode::CONFLICT, Some(EnquiryResponse::failure(""))).unwrap_err();
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn unreadable_body_is_malformed_or_rejected() {
        let err = classify(StatusCode::OK, None).unwrap_err();
        assert!(matches!(err, SubmitError::Malformed { status: 200 }));

        let err = classify(StatusCode::BAD_GATEWAY, None).unwrap_err();
        assert!(matches!(err, SubmitError::Rejected { status: 502, message: None }));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let submitter = HttpSubmitter::new("https://kravy.in/").unwrap();
        assert_eq!(submitter.endpoint(), "https://kravy.in/api/enquiry");
    }

    async fn serve(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn posts_camel_case_json_and_reads_reply() {
        let app = axum::Router::new().route(
            ENQUIRY_PATH,
            get(|| async { Json(EnquiryResponse::success("probe")) }).post(
                |Json(body): Json<serde_json::Value>| async move {
                    if body["source"] == "popup" && body["idempotencyKey"] == "k1" {
                        (AxumStatus::OK, Json(EnquiryResponse::success("stored")))
                    } else {
                        (AxumStatus::BAD_REQUEST, Json(EnquiryResponse::failure("bad body")))
                    }
                },
            ),
        );
        let base = serve(app).await;
        let submitter = HttpSubmitter::new(&base).unwrap();

        let request = EnquiryRequest {
            name: Some("Asha".to_owned()),
            phone: Some("9876543210".to_owned()),
            source: Some("popup".to_owned()),
            idempotency_key: Some("k1".to_owned()),
            ..Default::default()
        };
        let reply = submitter.submit(&request).await.unwrap();
        assert_eq!(reply.message, "stored");

        assert_eq!(submitter.probe().await.unwrap().message, "probe");
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let submitter = HttpSubmitter::new(&format!("http://{addr}")).unwrap();
        let err = submitter.submit(&EnquiryRequest::default()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Network(_)));
        assert_eq!(err.server_message(), None);
    }
}
