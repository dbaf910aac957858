//! Capture boundary and failure-to-envelope translation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use axum::http::Method;
use tracing::{error, warn};

use super::envelope::{now_iso8601, ApiReply, ErrorResponse};
use super::handlers::Reply;
use crate::config::ErrorMessages;
use crate::error::ApiError;
use crate::metrics;

/// What is known about the inbound request when a failure is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Request method.
    pub method: Method,
    /// Full request path.
    pub path: String,
}

impl RequestContext {
    /// Create a context.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

/// Turns every failure class into an error envelope with the right status.
#[derive(Debug, Clone, Default)]
pub struct FailureNormalizer {
    messages: ErrorMessages,
}

impl FailureNormalizer {
    /// Create a normalizer with the given category labels.
    pub fn new(messages: ErrorMessages) -> Self {
        Self { messages }
    }

    /// Category labels in use.
    pub fn messages(&self) -> &ErrorMessages {
        &self.messages
    }

    /// Run `f` inside the capture boundary.
    ///
    /// Errors and panics are both normalized here, exactly once.
    pub fn capture<F>(&self, context: Option<&RequestContext>, f: F) -> ApiReply
    where
        F: FnOnce() -> Result<Reply, ApiError>,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(reply)) => ApiReply::success(reply.status, reply.body),
            Ok(Err(failure)) => self.normalize(&failure, context),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    path = context.map(|c| c.path.as_str()),
                    panic_message = %message,
                    "Handler panicked"
                );
                metrics::inc_handler_panics();
                self.normalize(&ApiError::Internal(message), context)
            }
        }
    }

    /// Build the error reply for one failure.
    pub fn normalize(&self, failure: &ApiError, context: Option<&RequestContext>) -> ApiReply {
        let status = failure.status_code();

        // Handler-raised absences carry their own request context.
        let (path, method) = match failure {
            ApiError::ResourceNotFound { path, method, .. } => {
                (Some(path.clone()), Some(method.to_string()))
            }
            _ => (
                context.map(|c| c.path.clone()),
                context.map(|c| c.method.to_string()),
            ),
        };

        if status.is_server_error() {
            error!(kind = failure.kind(), path = ?path, method = ?method, error = %failure, "Request failed");
        } else {
            warn!(kind = failure.kind(), path = ?path, method = ?method, error = %failure, "Request rejected");
        }
        metrics::inc_handler_failures(failure.kind());

        let body = ErrorResponse {
            code: status.as_u16(),
            message: self.messages.message_for(status.as_u16()).to_string(),
            details: failure.details(),
            timestamp: now_iso8601(),
            path,
            method,
        };

        let reply = ApiReply::error(body);
        match failure {
            ApiError::MethodNotAllowed { allowed, .. } => reply.with_allow(allowed.clone()),
            _ => reply,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
