//! # Router Module
//!
//! The router is the handler registry: it maps an exact `(method, path)` pair
//! to a single handler closure and keeps track of the handler groups that
//! registered them.
//!
//! ## Overview
//!
//! - Routes are registered once at startup, before any dispatch happens
//! - Matching is exact; there are no wildcards or path parameters
//! - At most one handler per `(method, path)`; a second registration is rejected
//! - Groups ([`RouteGroup`]) bundle related routes with a name, base path and
//!   endpoint metadata for introspection
//!
//! ## Example
//!
//! ```rust
//! use cmdrouter::dispatcher::HandlerResponse;
//! use cmdrouter::router::Router;
//! use http::Method;
//! use serde_json::json;
//!
//! let mut router = Router::new();
//! router
//!     .register_route(Method::POST, "/things", |req, _| {
//!         HandlerResponse::ok(json!({"success": true, "echo": req.body}))
//!     })
//!     .unwrap();
//!
//! assert!(router.contains_route(&Method::POST, "/things"));
//! assert!(router.register_route(Method::POST, "/things", |_, _| {
//!     HandlerResponse::ok(json!({}))
//! }).is_err());
//! ```
//!
//! ## Introspection
//!
//! [`Router::groups`] and [`Router::routes`] are read-only snapshots of the
//! registered set, intended for schema-reporting collaborators. They have no
//! side effects.

mod core;
mod error;

pub use core::{
    normalize_path, EndpointInfo, EndpointMeta, GroupInfo, ParamMeta, Route, RouteGroup, RouteInfo, Router,
};
pub use error::RouteError;
