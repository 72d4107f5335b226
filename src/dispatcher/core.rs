//! Dispatcher core module - request/response envelopes and the dispatch path.

use crate::ids::RequestId;
use crate::router::{normalize_path, Router};
use http::Method;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Route-level failure: no handler for the `(method, path)` pair.
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Malformed request envelope (e.g. batch without `requests`).
pub const BAD_REQUEST: &str = "BAD_REQUEST";
/// Missing or malformed handler parameters.
pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
/// Handler failed in a way it could not turn into its own envelope.
pub const EXECUTION_ERROR: &str = "EXECUTION_ERROR";
/// Infrastructure fault inside the router itself.
pub const SERVER_ERROR: &str = "SERVER_ERROR";

/// Signature of a registered route handler.
///
/// Handlers receive the request and the dispatcher that invoked them, so a
/// composite handler (the batch endpoint) can re-enter dispatch without any
/// ambient global.
pub type HandlerFn = Arc<dyn Fn(&HandlerRequest, &Dispatcher) -> HandlerResponse + Send + Sync>;

/// Request data passed to a handler.
///
/// Handlers only ever see `&HandlerRequest`; batch steps build a fresh request
/// per step rather than mutating a shared one.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Correlation id for tracing
    pub request_id: RequestId,
    /// HTTP method (GET, POST, PUT, DELETE)
    pub method: Method,
    /// Request path without its query; the dispatcher normalizes it before lookup
    pub path: String,
    /// Query string parameters
    pub query_params: HashMap<String, String>,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Build a request for `path`. A `?query` suffix is split off into
    /// [`query_params`](Self::query_params).
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        let query = path.find('?').map(|at| {
            let query = path[at + 1..].to_string();
            path.truncate(at);
            query
        });
        let request = Self {
            request_id: RequestId::new(),
            method,
            path,
            query_params: HashMap::new(),
            body: None,
        };
        match query {
            Some(query) => request.with_query_string(&query),
            None => request,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = if body.is_null() { None } else { Some(body) };
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Merge a raw `a=1&b=two` query string into the parameters (percent-decoded,
    /// last write wins).
    #[must_use]
    pub fn with_query_string(mut self, query: &str) -> Self {
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            self.query_params.insert(k.into_owned(), v.into_owned());
        }
        self
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Get a query parameter by name
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Top-level field of an object body.
    #[must_use]
    pub fn body_field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get(name))
    }

    #[must_use]
    pub fn body_str(&self, name: &str) -> Option<&str> {
        self.body_field(name).and_then(Value::as_str)
    }

    /// Required non-empty string field; the error arm is the 400 envelope a
    /// handler should return as-is.
    pub fn required_str(&self, name: &str) -> Result<&str, HandlerResponse> {
        match self.body_str(name) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(HandlerResponse::invalid_params(&format!(
                "Missing required field: {name}"
            ))),
        }
    }

    #[must_use]
    pub fn optional_bool(&self, name: &str, default: bool) -> bool {
        self.body_field(name)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    #[must_use]
    pub fn optional_i64(&self, name: &str, default: i64) -> i64 {
        self.body_field(name)
            .and_then(Value::as_i64)
            .unwrap_or(default)
    }

    #[must_use]
    pub fn optional_f64(&self, name: &str, default: f64) -> f64 {
        self.body_field(name)
            .and_then(Value::as_f64)
            .unwrap_or(default)
    }
}

/// Uniform response envelope returned by every handler and by [`Dispatcher::dispatch`].
///
/// `success` is never stored; it is derived from `status` (2xx).
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// Response body as JSON
    pub body: Option<Value>,
}

impl HandlerResponse {
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    /// Create an error envelope: `{"success": false, "error": code, "message": message}`
    #[must_use]
    pub fn error(status: u16, code: &str, message: &str) -> Self {
        Self::json(
            status,
            json!({
                "success": false,
                "error": code,
                "message": message,
            }),
        )
    }

    #[must_use]
    pub fn not_found(message: &str) -> Self {
        Self::error(404, NOT_FOUND, message)
    }

    #[must_use]
    pub fn bad_request(message: &str) -> Self {
        Self::error(400, BAD_REQUEST, message)
    }

    #[must_use]
    pub fn invalid_params(message: &str) -> Self {
        Self::error(400, INVALID_PARAMS, message)
    }

    #[must_use]
    pub fn server_error(message: &str) -> Self {
        Self::error(500, SERVER_ERROR, message)
    }

    #[must_use]
    pub fn execution_error(message: &str) -> Self {
        Self::error(500, EXECUTION_ERROR, message)
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `error` code of an error envelope, if the body carries one.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(Value::as_str)
    }
}

impl Serialize for HandlerResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("HandlerResponse", 3)?;
        s.serialize_field("status", &self.status)?;
        s.serialize_field("success", &self.is_success())?;
        s.serialize_field("body", &self.body)?;
        s.end()
    }
}

/// Dispatcher that invokes the handler registered for a request's exact
/// `(method, path)` pair.
///
/// Wraps the router in an `Arc`: once a dispatcher exists the registry is
/// read-only, so clones can be handed to any thread without locking.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    /// Freeze a fully registered router and build a dispatcher over it.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    #[must_use]
    pub fn from_shared(router: Arc<Router>) -> Self {
        Self { router }
    }

    /// Read-only view of the registry, for introspection.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Dispatch a request to its handler and return the handler's envelope.
    ///
    /// Never panics: an unmatched route yields `404 NOT_FOUND`, and a handler
    /// that panics yields `500 EXECUTION_ERROR`.
    #[must_use]
    pub fn dispatch(&self, request: &HandlerRequest) -> HandlerResponse {
        let path = normalize_path(&self.router.config().api_prefix, &request.path);

        debug!(
            request_id = %request.request_id,
            method = %request.method,
            path = %path,
            registered_routes = self.router.route_count(),
            "Route lookup"
        );

        let Some(route) = self.router.match_route(&request.method, &path) else {
            warn!(
                request_id = %request.request_id,
                method = %request.method,
                path = %path,
                "Route not found"
            );
            return HandlerResponse::not_found(&format!(
                "Route not found: {}:{}",
                request.method, path
            ));
        };

        let start = Instant::now();
        let handler = Arc::clone(&route.handler);
        let outcome = catch_unwind(AssertUnwindSafe(|| handler(request, self)));

        match outcome {
            Ok(response) => {
                info!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %path,
                    status = response.status,
                    latency_us = start.elapsed().as_micros() as u64,
                    "Handler response received"
                );
                response
            }
            Err(panic) => {
                let panic_message = panic_message(panic.as_ref());
                error!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %path,
                    panic_message = %panic_message,
                    "Handler panicked"
                );
                HandlerResponse::execution_error(&format!(
                    "Handler for {}:{} failed: {}",
                    request.method, path, panic_message
                ))
            }
        }
    }

    /// Convenience entry point taking a method string (case-insensitive).
    ///
    /// An unrecognised method is answered with `400 BAD_REQUEST` rather than
    /// being routed.
    #[must_use]
    pub fn dispatch_method(&self, method: &str, path: &str, body: Option<Value>) -> HandlerResponse {
        match parse_method(method) {
            Some(method) => {
                let mut request = HandlerRequest::new(method, path);
                request.body = body.filter(|b| !b.is_null());
                self.dispatch(&request)
            }
            None => HandlerResponse::bad_request(&format!("Unsupported method: {method}")),
        }
    }
}

/// Parse one of the four supported methods, ignoring case.
#[must_use]
pub fn parse_method(method: &str) -> Option<Method> {
    match method.trim().to_ascii_uppercase().as_str() {
        "GET" => Some(Method::GET),
        "POST" => Some(Method::POST),
        "PUT" => Some(Method::PUT),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

/// Methods a route may be registered under.
#[must_use]
pub fn is_supported_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::POST | Method::PUT | Method::DELETE
    )
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Build a `{"success": true, ...}` body from key/value pairs.
#[must_use]
pub fn success_body(fields: Map<String, Value>) -> Value {
    let mut body = Map::with_capacity(fields.len() + 1);
    body.insert("success".to_string(), Value::Bool(true));
    body.extend(fields);
    Value::Object(body)
}
