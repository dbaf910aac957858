//! Request dispatch over an explicit, ordered route table.
//!
//! Routes are matched segment by segment. A literal segment must match
//! exactly; a `{name}` segment binds the raw, non-empty path segment.
//! A path that matches a pattern under a different method produces
//! method-not-allowed; a path that matches nothing produces route-not-found.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::Method;
use strum::{Display, EnumIter, IntoStaticStr};
use tracing::{debug, info, instrument};

use super::envelope::ApiReply;
use super::handlers::{Handler, HandlerRequest, PathParams};
use super::normalizer::{FailureNormalizer, RequestContext};
use crate::error::ApiError;
use crate::metrics;

/// Metric/log label for requests that matched no route.
const UNMATCHED: &str = "unmatched";

/// Name of each registered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum RouteName {
    /// List all users.
    ListUsers,
    /// Fetch one user.
    GetUser,
    /// Create a user.
    CreateUser,
    /// Replace a user.
    UpdateUser,
    /// Delete a user.
    DeleteUser,
    /// Health probe.
    HealthCheck,
    /// Deliberate failure.
    TestError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(&'static str),
}

/// A parsed path pattern such as `/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: &'static str,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern; `{...}` segments become parameters.
    pub fn parse(raw: &'static str) -> Self {
        let segments = split_segments(raw)
            .map(|segment| {
                match segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                {
                    Some(name) => Segment::Param(name),
                    None => Segment::Literal(segment.to_string()),
                }
            })
            .collect();

        Self { raw, segments }
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &'static str {
        self.raw
    }

    /// Match a path relative to the context path, binding parameters.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::new();
        let mut parts = split_segments(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => params.push((*name, part.to_string())),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

/// Split `/a/b` into `["a", "b"]`; `/` yields a single empty segment.
fn split_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// One row of the route table.
pub struct Route {
    /// HTTP method.
    pub method: Method,
    /// Path pattern relative to the context path.
    pub pattern: RoutePattern,
    /// Operation name.
    pub name: RouteName,
    handler: Arc<dyn Handler>,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("name", &self.name)
            .finish()
    }
}

/// Outcome of looking a request up in the route table.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// A route accepts this method and path.
    Matched {
        /// The matched route.
        route: &'a Route,
        /// Bound path parameters.
        params: PathParams,
    },
    /// The path matches, the method does not.
    MethodNotAllowed {
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },
    /// No pattern matches the path.
    NotFound,
}

/// Request handed over by the transport.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// HTTP method.
    pub method: Method,
    /// Full request path.
    pub path: String,
    /// Raw body.
    pub body: Bytes,
}

impl InboundRequest {
    /// Create a request.
    pub fn new(method: Method, path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            path: path.into(),
            body: body.into(),
        }
    }
}

/// Maps (method, path) to a handler and runs it inside the capture boundary.
#[derive(Debug)]
pub struct Dispatcher {
    context_path: String,
    routes: Vec<Route>,
    normalizer: FailureNormalizer,
}

impl Dispatcher {
    /// Create a dispatcher with an empty route table.
    pub fn new(context_path: impl Into<String>, normalizer: FailureNormalizer) -> Self {
        Self {
            context_path: context_path.into(),
            routes: Vec::new(),
            normalizer,
        }
    }

    /// Register a route. Earlier registrations win on overlap.
    pub fn route<H>(
        mut self,
        method: Method,
        pattern: &'static str,
        name: RouteName,
        handler: H,
    ) -> Self
    where
        H: Handler + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: RoutePattern::parse(pattern),
            name,
            handler: Arc::new(handler),
        });
        self
    }

    /// The route table in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Base path every pattern lives under.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// Look up the route for a full request path.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let Some(relative) = self.relative_path(path) else {
            return Resolution::NotFound;
        };

        let mut allowed: Vec<Method> = Vec::new();
        for route in &self.routes {
            let Some(params) = route.pattern.matches(relative) else {
                continue;
            };
            if route.method == *method {
                return Resolution::Matched { route, params };
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed { allowed }
        }
    }

    /// Serve one request; every outcome is a well-formed envelope.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub fn dispatch(&self, request: InboundRequest) -> ApiReply {
        let start = Instant::now();
        let context = RequestContext::new(request.method.clone(), request.path.clone());
        let mut route_label: &'static str = UNMATCHED;

        let reply = self.normalizer.capture(Some(&context), || {
            match self.resolve(&request.method, &request.path) {
                Resolution::Matched { route, params } => {
                    debug!(route = %route.name, "route resolved");
                    route_label = route.name.into();
                    let handler_request = HandlerRequest {
                        method: request.method,
                        path: request.path,
                        params,
                        body: request.body,
                    };
                    route.handler.handle(&handler_request)
                }
                Resolution::MethodNotAllowed { allowed } => Err(ApiError::MethodNotAllowed {
                    path: request.path,
                    method: request.method,
                    allowed,
                }),
                Resolution::NotFound => Err(ApiError::RouteNotFound {
                    path: request.path,
                    method: request.method,
                }),
            }
        });

        metrics::record_request(start, route_label, reply.status.as_u16());
        info!(
            route = route_label,
            status = reply.status.as_u16(),
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "request handled"
        );
        reply
    }

    /// Normalize a failure that happened before dispatch could run.
    pub fn reject(&self, context: Option<&RequestContext>, failure: ApiError) -> ApiReply {
        let reply = self.normalizer.normalize(&failure, context);
        metrics::record_request(Instant::now(), UNMATCHED, reply.status.as_u16());
        reply
    }

    /// Strip the context path and one trailing slash.
    fn relative_path<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = if self.context_path.is_empty() {
            path
        } else {
            let rest = path.strip_prefix(self.context_path.as_str())?;
            if !rest.is_empty() && !rest.starts_with('/') {
                return None;
            }
            rest
        };

        match rest {
            "" => Some("/"),
            "/" => Some(rest),
            _ => Some(rest.strip_suffix('/').unwrap_or(rest)),
        }
    }
}
