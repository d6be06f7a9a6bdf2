//! Enquiry record and the `/api/enquiry` wire types.
//!
//! Field names are camelCase on the wire (`businessType`, `storeName`,
//! `idempotencyKey`) and in stored documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::EnquiryError;

/// Message returned when an enquiry was accepted.
pub const SUBMITTED_MESSAGE: &str = "Enquiry submitted successfully.";

/// Message returned when `name` or `phone` is missing.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Name and phone are required.";

/// Message returned for any unexpected server-side failure.
pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong on the server.";

/// Message returned by the liveness probe.
pub const PROBE_MESSAGE: &str = "Use POST to submit enquiries.";

// ── Wire types ───────────────────────────────────────────────────────

/// Body of `POST /api/enquiry`.
///
/// Every field is optional at the parsing layer; [`EnquiryRequest::validate`]
/// enforces the required ones. Text fields also accept JSON numbers and
/// booleans, stored in their JSON spelling (`9876543210`, `true`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryRequest {
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub business_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub store_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    /// Caller-supplied origin tag, e.g. `popup`.
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,
    /// Token that collapses retries of the same submission into one record.
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub idempotency_key: Option<String>,
}

/// Read an optional text field that may arrive as any JSON scalar.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(text) => Ok(Some(text)),
        serde_json::Value::Number(number) => Ok(Some(number.to_string())),
        serde_json::Value::Bool(flag) => Ok(Some(flag.to_string())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
            serde::de::Error::custom("expected a string, number or boolean"),
        ),
    }
}

/// Body of every `/api/enquiry` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquiryResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl EnquiryResponse {
    /// A success payload with the given message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failure payload with the given message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// ── Validation ───────────────────────────────────────────────────────

/// An [`EnquiryRequest`] whose required fields are present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEnquiry {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub message: Option<String>,
    pub business_type: Option<String>,
    pub store_name: Option<String>,
    pub city: Option<String>,
    pub source: Option<String>,
    pub idempotency_key: Option<String>,
}

impl EnquiryRequest {
    /// Check that `name` and `phone` are present and non-empty.
    ///
    /// Only presence is checked. Whitespace counts as content and the phone
    /// format is not inspected.
    ///
    /// # Errors
    ///
    /// Returns [`EnquiryError::MissingField`] naming the first missing field.
    pub fn validate(self) -> Result<ValidEnquiry, EnquiryError> {
        let name = non_empty(self.name).ok_or(EnquiryError::MissingField { field: "name" })?;
        let phone = non_empty(self.phone).ok_or(EnquiryError::MissingField { field: "phone" })?;

        Ok(ValidEnquiry {
            name,
            phone,
            email: self.email,
            message: self.message,
            business_type: self.business_type,
            store_name: self.store_name,
            city: self.city,
            source: self.source,
            idempotency_key: non_empty(self.idempotency_key),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ── Persisted record ─────────────────────────────────────────────────

/// A persisted enquiry. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Enquiry {
    /// Build a record from a validated request.
    ///
    /// The id is the request's idempotency key when present, otherwise a
    /// fresh UUID v4.
    #[must_use]
    pub fn from_valid(valid: ValidEnquiry, created_at: DateTime<Utc>) -> Self {
        let id = valid
            .idempotency_key
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            id,
            name: valid.name,
            email: valid.email,
            phone: valid.phone,
            message: valid.message,
            business_type: valid.business_type,
            store_name: valid.store_name,
            city: valid.city,
            source: valid.source,
            created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(name: Option<&str>, phone: Option<&str>) -> EnquiryRequest {
        EnquiryRequest {
            name: name.map(str::to_owned),
            phone: phone.map(str::to_owned),
            ..Default::default()
        }
    }

    #[test]
    fn validate_requires_phone() {
        let err = request(Some("Asha"), None).validate().unwrap_err();
        assert!(matches!(err, EnquiryError::MissingField { field: "phone" }));

        let err = request(Some("Asha"), Some("")).validate().unwrap_err();
        assert!(matches!(err, EnquiryError::MissingField { field: "phone" }));
    }

    #[test]
    fn validate_requires_name() {
        let err = request(None, Some("9876543210")).validate().unwrap_err();
        assert!(matches!(err, EnquiryError::MissingField { field: "name" }));
        assert!(err.is_validation());
    }

    #[test]
    fn text_fields_accept_json_scalars() {
        let request: EnquiryRequest = serde_json::from_str(
            r#"{"name":"Asha","phone":9876543210,"city":null,"message":true}"#,
        )
        .unwrap();
        assert_eq!(request.phone.as_deref(), Some("9876543210"));
        assert_eq!(request.message.as_deref(), Some("true"));
        assert_eq!(request.city, None);

        let valid = request.validate().unwrap();
        assert_eq!(valid.phone, "9876543210");
    }

    #[test]
    fn text_fields_reject_structured_values() {
        let parsed: Result<EnquiryRequest, _> =
            serde_json::from_str(r#"{"name":"Asha","phone":["98765","43210"]}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_checks_presence_only() {
        let valid = request(Some(" "), Some("not a number")).validate().unwrap();
        assert_eq!(valid.name, " ");
        assert_eq!(valid.phone, "not a number");
    }

    #[test]
    fn empty_idempotency_key_is_ignored() {
        let mut req = request(Some("Asha"), Some("9876543210"));
        req.idempotency_key = Some(String::new());
        assert_eq!(req.validate().unwrap().idempotency_key, None);
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let req: EnquiryRequest = serde_json::from_str(
            r#"{"name":"Asha","phone":"9876543210","businessType":"grocery",
                "storeName":"Asha Stores","idempotencyKey":"k1","unknown":1}"#,
        )
        .unwrap();
        assert_eq!(req.business_type.as_deref(), Some("grocery"));
        assert_eq!(req.store_name.as_deref(), Some("Asha Stores"));
        assert_eq!(req.idempotency_key.as_deref(), Some("k1"));
    }

    #[test]
    fn null_fields_parse_as_absent() {
        let req: EnquiryRequest =
            serde_json::from_str(r#"{"name":null,"phone":"9876543210"}"#).unwrap();
        assert_eq!(req.name, None);
    }

    #[test]
    fn record_id_prefers_idempotency_key() {
        let mut req = request(Some("Asha"), Some("9876543210"));
        req.idempotency_key = Some("open-1".to_owned());
        let record = Enquiry::from_valid(req.validate().unwrap(), Utc::now());
        assert_eq!(record.id, "open-1");

        let record = Enquiry::from_valid(
            request(Some("Asha"), Some("9876543210")).validate().unwrap(),
            Utc::now(),
        );
        assert!(uuid::Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn record_omits_unsupplied_fields() {
        let record = Enquiry::from_valid(
            request(Some("Asha"), Some("9876543210")).validate().unwrap(),
            Utc::now(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn response_message_defaults_to_empty() {
        let resp: EnquiryResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(resp, EnquiryResponse::failure(""));
    }
}
