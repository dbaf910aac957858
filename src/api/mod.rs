//! HTTP API: route table, handlers, envelopes and the capture boundary.

pub mod dispatcher;
pub mod envelope;
pub mod handlers;
pub mod normalizer;
pub mod routes;

pub use dispatcher::{Dispatcher, InboundRequest, Resolution, RouteName};
pub use envelope::{ApiReply, ApiResponse, ErrorResponse};
pub use handlers::{Handler, HandlerRequest, Reply};
pub use normalizer::{FailureNormalizer, RequestContext};
pub use routes::{create_router, user_api, AppState};
