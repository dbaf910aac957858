//! One handler per API operation.
//!
//! A handler turns a resolved request into a success envelope or an
//! [`ApiError`]; it never renders error responses itself.

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use smallvec::SmallVec;

use super::envelope::{now_iso8601, ApiResponse, STATUS_UP};
use crate::error::ApiError;
use crate::store::{UserInput, UserStore};

/// Path parameters bound during routing, in pattern order.
pub type PathParams = SmallVec<[(&'static str, String); 2]>;

/// Fixed text raised by the deliberate-failure endpoint.
pub const TEST_ERROR_MESSAGE: &str = "This is a test error";

/// Request as seen by a handler.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// HTTP method.
    pub method: Method,
    /// Full request path, including the context path.
    pub path: String,
    /// Bound path parameters.
    pub params: PathParams,
    /// Raw request body.
    pub body: Bytes,
}

impl HandlerRequest {
    /// Get a path parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The `{id}` parameter; a route without one is a wiring bug.
    fn id(&self) -> Result<&str, ApiError> {
        self.param("id")
            .ok_or_else(|| ApiError::Internal("route is missing the {id} parameter".to_string()))
    }

    /// Parse the body as a user.
    fn user_input(&self) -> Result<UserInput, ApiError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Successful handler result.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// HTTP status for the success envelope.
    pub status: StatusCode,
    /// Success envelope.
    pub body: ApiResponse,
}

impl Reply {
    /// 200 OK.
    pub fn ok(body: ApiResponse) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// 201 Created.
    pub fn created(body: ApiResponse) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }
}

/// Anything that can serve one route.
pub trait Handler: Send + Sync {
    /// Run the operation.
    fn handle(&self, request: &HandlerRequest) -> Result<Reply, ApiError>;
}

/// Adapts a plain function or closure into a [`Handler`].
pub struct FnHandler<F>(pub F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(&HandlerRequest) -> Result<Reply, ApiError> + Send + Sync,
{
    fn handle(&self, request: &HandlerRequest) -> Result<Reply, ApiError> {
        (self.0)(request)
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHandler")
    }
}

/// `GET /users`
#[derive(Debug, Clone)]
pub struct ListUsers {
    store: Arc<UserStore>,
}

impl ListUsers {
    /// Create the handler.
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

impl Handler for ListUsers {
    fn handle(&self, _request: &HandlerRequest) -> Result<Reply, ApiError> {
        Ok(Reply::ok(ApiResponse::success(
            "Retrieved user list",
            self.store.list(),
        )))
    }
}

/// `GET /users/{id}`
#[derive(Debug, Clone)]
pub struct GetUser {
    store: Arc<UserStore>,
}

impl GetUser {
    /// Create the handler.
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

impl Handler for GetUser {
    fn handle(&self, request: &HandlerRequest) -> Result<Reply, ApiError> {
        let id = request.id()?;
        let user = self
            .store
            .get(id)
            .ok_or_else(|| ApiError::user_not_found(id, &request.path, Method::GET))?;

        Ok(Reply::ok(ApiResponse::success("Retrieved user details", user)))
    }
}

/// `POST /users`
#[derive(Debug, Clone)]
pub struct CreateUser {
    store: Arc<UserStore>,
}

impl CreateUser {
    /// Create the handler.
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

impl Handler for CreateUser {
    fn handle(&self, request: &HandlerRequest) -> Result<Reply, ApiError> {
        let input = request.user_input()?;
        let user = self.store.create(input);

        Ok(Reply::created(ApiResponse::success(
            format!("Created user (ID: {})", user.id),
            user,
        )))
    }
}

/// `PUT /users/{id}`
#[derive(Debug, Clone)]
pub struct UpdateUser {
    store: Arc<UserStore>,
}

impl UpdateUser {
    /// Create the handler.
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

impl Handler for UpdateUser {
    fn handle(&self, request: &HandlerRequest) -> Result<Reply, ApiError> {
        let id = request.id()?;
        let input = request.user_input()?;
        let user = self
            .store
            .update(id, input)
            .ok_or_else(|| ApiError::user_not_found(id, &request.path, Method::PUT))?;

        Ok(Reply::ok(ApiResponse::success("Updated user", user)))
    }
}

/// `DELETE /users/{id}`
#[derive(Debug, Clone)]
pub struct DeleteUser {
    store: Arc<UserStore>,
}

impl DeleteUser {
    /// Create the handler.
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

impl Handler for DeleteUser {
    fn handle(&self, request: &HandlerRequest) -> Result<Reply, ApiError> {
        let id = request.id()?;
        if !self.store.delete(id) {
            return Err(ApiError::user_not_found(id, &request.path, Method::DELETE));
        }

        Ok(Reply::ok(ApiResponse::success(
            format!("Deleted user (ID: {id})"),
            format!("Deleted User ID: {id}"),
        )))
    }
}

/// `GET /health`
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthCheck;

impl Handler for HealthCheck {
    fn handle(&self, _request: &HandlerRequest) -> Result<Reply, ApiError> {
        Ok(Reply::ok(ApiResponse::with_status(
            STATUS_UP,
            "Application is running normally",
            now_iso8601(),
        )))
    }
}

/// `GET /test/error` - always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailOnPurpose;

impl Handler for FailOnPurpose {
    fn handle(&self, _request: &HandlerRequest) -> Result<Reply, ApiError> {
        Err(ApiError::Internal(TEST_ERROR_MESSAGE.to_string()))
    }
}
