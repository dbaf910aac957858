//! HTTP API route definitions and the axum transport adapter.

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::Method,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::dispatcher::{Dispatcher, InboundRequest, RouteName};
use super::envelope::ApiReply;
use super::handlers::{
    CreateUser, DeleteUser, FailOnPurpose, GetUser, HealthCheck, ListUsers, UpdateUser,
};
use super::normalizer::{FailureNormalizer, RequestContext};
use crate::error::ApiError;
use crate::store::UserStore;

/// Application state shared with the transport handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The assembled dispatcher.
    pub dispatcher: Arc<Dispatcher>,
    /// Largest body the adapter will read.
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create new app state.
    pub fn new(dispatcher: Dispatcher, max_body_bytes: usize) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            max_body_bytes,
        }
    }
}

/// Build the dispatcher with the fixed user API route table.
pub fn user_api(
    store: Arc<UserStore>,
    context_path: impl Into<String>,
    normalizer: FailureNormalizer,
) -> Dispatcher {
    Dispatcher::new(context_path, normalizer)
        // Users
        .route(
            Method::GET,
            "/users",
            RouteName::ListUsers,
            ListUsers::new(Arc::clone(&store)),
        )
        .route(
            Method::GET,
            "/users/{id}",
            RouteName::GetUser,
            GetUser::new(Arc::clone(&store)),
        )
        .route(
            Method::POST,
            "/users",
            RouteName::CreateUser,
            CreateUser::new(Arc::clone(&store)),
        )
        .route(
            Method::PUT,
            "/users/{id}",
            RouteName::UpdateUser,
            UpdateUser::new(Arc::clone(&store)),
        )
        .route(
            Method::DELETE,
            "/users/{id}",
            RouteName::DeleteUser,
            DeleteUser::new(store),
        )
        // Health endpoint
        .route(Method::GET, "/health", RouteName::HealthCheck, HealthCheck)
        // Failure path exercise
        .route(Method::GET, "/test/error", RouteName::TestError, FailOnPurpose)
}

/// Create the API router.
///
/// Routing happens in the dispatcher, so axum only sees a single fallback.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn dispatch(State(state): State<AppState>, request: Request) -> ApiReply {
    let (parts, body) = request.into_parts();
    let method = parts.method;
    let path = parts.uri.path().to_string();

    match to_bytes(body, state.max_body_bytes).await {
        Ok(body) => state
            .dispatcher
            .dispatch(InboundRequest::new(method, path, body)),
        Err(e) => state.dispatcher.reject(
            Some(&RequestContext::new(method, path)),
            ApiError::BodyUnreadable(e.to_string()),
        ),
    }
}
