//! # cmdrouter
//!
//! **cmdrouter** is an in-process request router: handlers register under a
//! `(method, path)` key, requests are dispatched to them without any network
//! listener, and every outcome comes back as a uniform JSON envelope.
//!
//! ## Architecture
//!
//! - **[`dispatcher`]** - request and response envelopes, path normalization
//!   and panic-safe dispatch
//! - **[`router`]** - the handler registry, handler groups and route
//!   introspection
//! - **[`batch`]** - sequential multi-request execution with `$N.field`
//!   variable substitution between steps
//! - **[`handlers`]** - built-in groups (`/health`, `/handlers`, `/batch`, `/echo`)
//! - **[`runtime_config`]** - API prefix and server name from the environment
//! - **[`logging`]** - `tracing-subscriber` initialization
//! - **[`cli`]** - the `cmdrouter` command-line front end
//! - **[`ids`]** - ULID request identifiers
//!
//! ## Quick Start
//!
//! ```rust
//! use cmdrouter::dispatcher::{Dispatcher, HandlerRequest};
//! use cmdrouter::handlers::demo_router;
//! use cmdrouter::runtime_config::RuntimeConfig;
//! use http::Method;
//! use serde_json::json;
//!
//! let router = demo_router(RuntimeConfig::default()).unwrap();
//! let dispatcher = Dispatcher::new(router);
//!
//! let batch = HandlerRequest::new(Method::POST, "/api/v1/batch").with_body(json!({
//!     "requests": [
//!         {"method": "POST", "path": "/echo", "body": {"id": "abc"}},
//!         {"method": "POST", "path": "/echo", "body": {"ref": "$0.body.id"}}
//!     ]
//! }));
//! let response = dispatcher.dispatch(&batch);
//! let body = response.body.unwrap();
//! assert_eq!(body["results"][1]["data"]["body"]["ref"], "abc");
//! ```
//!
//! ## Response Envelope
//!
//! Successful bodies carry `"success": true`. Errors always look like:
//!
//! ```json
//! {"success": false, "error": "NOT_FOUND", "message": "Route not found: GET:/x"}
//! ```
//!
//! Codes in use: `NOT_FOUND`, `BAD_REQUEST`, `INVALID_PARAMS`,
//! `EXECUTION_ERROR` and `SERVER_ERROR`.

pub mod batch;
pub mod cli;
pub mod dispatcher;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod router;
pub mod runtime_config;

pub use dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
pub use router::{RouteGroup, Router};
