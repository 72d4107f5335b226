use http::Method;
use thiserror::Error;

/// Errors raised while building the route table at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A handler is already bound to this `(method, path)`; the first one stays live.
    #[error("Route already registered: {method}:{path}")]
    DuplicateRoute { method: Method, path: String },

    /// Only GET, POST, PUT and DELETE routes can be registered.
    #[error("Unsupported method for route {path}: {method}")]
    UnsupportedMethod { method: Method, path: String },

    /// Handler group names are unique, compared case-insensitively.
    #[error("Handler group already registered: {0}")]
    DuplicateGroup(String),
}
