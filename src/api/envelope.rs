//! The two canonical response shapes and their HTTP rendering.

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Status value carried by ordinary success envelopes.
pub const STATUS_SUCCESS: &str = "success";
/// Status value carried by the health envelope.
pub const STATUS_UP: &str = "UP";

/// Success envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// "success", or "UP" for health.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
    /// Operation payload.
    pub data: Value,
}

impl ApiResponse {
    /// Build a "success" envelope around any serializable payload.
    pub fn success(message: impl Into<String>, data: impl Serialize) -> Self {
        Self::with_status(STATUS_SUCCESS, message, data)
    }

    /// Build an envelope with an explicit status value.
    pub fn with_status(
        status: impl Into<String>,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            // Payloads are plain records and strings, which always serialize.
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }
}

/// Error envelope. `None` fields are left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub code: u16,
    /// Short category label.
    pub message: String,
    /// Elaboration of what went wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO-8601 instant the envelope was built.
    pub timestamp: String,
    /// Request path, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Request method, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Either envelope shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    /// Success path.
    Success(ApiResponse),
    /// Failure path.
    Error(ErrorResponse),
}

/// A fully decided response: status, envelope and any extra headers.
#[derive(Debug, Clone)]
pub struct ApiReply {
    /// HTTP status.
    pub status: StatusCode,
    /// JSON body.
    pub envelope: Envelope,
    /// Methods for the `Allow` header on 405 replies.
    pub allow: Vec<Method>,
}

impl ApiReply {
    /// Wrap a success envelope.
    pub fn success(status: StatusCode, body: ApiResponse) -> Self {
        Self {
            status,
            envelope: Envelope::Success(body),
            allow: Vec::new(),
        }
    }

    /// Wrap an error envelope; the status comes from its `code`.
    pub fn error(body: ErrorResponse) -> Self {
        let status =
            StatusCode::from_u16(body.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            envelope: Envelope::Error(body),
            allow: Vec::new(),
        }
    }

    /// Attach an `Allow` list.
    pub fn with_allow(mut self, allow: Vec<Method>) -> Self {
        self.allow = allow;
        self
    }

    /// The body as JSON, mainly for assertions.
    pub fn body_json(&self) -> Value {
        serde_json::to_value(&self.envelope).unwrap_or(Value::Null)
    }
}

impl IntoResponse for ApiReply {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.envelope)).into_response();

        if !self.allow.is_empty() {
            let allow = self
                .allow
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }

        response
    }
}

/// Current instant as an RFC 3339 / ISO-8601 string.
pub fn now_iso8601() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
