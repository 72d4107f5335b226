//! # Dispatcher Module
//!
//! The dispatcher turns a [`HandlerRequest`] into a [`HandlerResponse`] by
//! looking up the exact `(method, path)` route in the [`Router`](crate::router::Router)
//! and invoking its handler.
//!
//! ## Overview
//!
//! - Request paths are normalized first (API prefix stripped, leading `/` ensured)
//! - Lookup is an exact match, no wildcards or path parameters
//! - Unmatched routes return `404` with error code `NOT_FOUND`
//! - Handler panics are caught and returned as `500` with `EXECUTION_ERROR`
//!
//! Dispatch runs synchronously on the caller's thread. A slow handler blocks
//! its caller for its full duration; there are no timeouts inside the core.
//!
//! ## Example
//!
//! ```rust
//! use cmdrouter::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
//! use cmdrouter::router::Router;
//! use http::Method;
//! use serde_json::json;
//!
//! let mut router = Router::new();
//! router
//!     .register_route(Method::GET, "/ping", |_req, _dispatcher| {
//!         HandlerResponse::ok(json!({"success": true, "pong": true}))
//!     })
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(router);
//! let response = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/ping"));
//! assert!(response.is_success());
//! ```
//!
//! ## Envelope
//!
//! Every response serializes as `{"status": u16, "success": bool, "body": json?}`.
//! Error envelopes carry `{"success": false, "error": CODE, "message": text}` in
//! the body.

mod core;
#[cfg(test)]
mod tests;

pub use core::{
    is_supported_method, parse_method, success_body, Dispatcher, HandlerFn, HandlerRequest,
    HandlerResponse, BAD_REQUEST, EXECUTION_ERROR, INVALID_PARAMS, NOT_FOUND, SERVER_ERROR,
};
