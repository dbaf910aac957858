//! Unified error types for the user API.

use axum::http::{Method, StatusCode};
use strum::IntoStaticStr;
use thiserror::Error;

/// Failure raised anywhere in the request pipeline.
///
/// Every variant is turned into an error envelope by the failure normalizer;
/// handlers never build error responses themselves.
#[derive(Error, Debug, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ApiError {
    /// A handler looked up an entity that does not exist.
    #[error("{resource} with ID '{id}' does not exist")]
    ResourceNotFound {
        /// Kind of entity, e.g. "User".
        resource: &'static str,
        /// The identifier that was requested.
        id: String,
        /// Request path the lookup came from.
        path: String,
        /// Request method the lookup came from.
        method: Method,
    },

    /// No registered pattern matches the request path.
    #[error("Path '{path}' does not exist. Check the URL.")]
    RouteNotFound {
        /// The unmatched request path.
        path: String,
        /// The request method.
        method: Method,
    },

    /// A pattern matches the path but not with this method.
    #[error("Method '{method}' is not allowed for path '{path}'.")]
    MethodNotAllowed {
        /// The matched request path.
        path: String,
        /// The rejected method.
        method: Method,
        /// Methods registered for the matched pattern.
        allowed: Vec<Method>,
    },

    /// The request body did not parse into the expected shape.
    #[error("{0}")]
    MalformedRequest(#[from] serde_json::Error),

    /// The transport could not read the request body.
    #[error("failed to read request body: {0}")]
    BodyUnreadable(String),

    /// Any other failure, including panics caught at the capture boundary.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this failure surfaces as.
    ///
    /// Malformed bodies deliberately map to 500 rather than 400.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } | Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::MalformedRequest(_) | Self::BodyUnreadable(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Human-readable elaboration for the envelope's `details` field.
    pub fn details(&self) -> Option<String> {
        let text = self.to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Short machine label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Build a "user not found" failure for the given request.
    pub fn user_not_found(id: impl Into<String>, path: impl Into<String>, method: Method) -> Self {
        Self::ResourceNotFound {
            resource: "User",
            id: id.into(),
            path: path.into(),
            method,
        }
    }
}

/// Errors raised while bootstrapping the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
