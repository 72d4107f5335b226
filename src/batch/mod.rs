//! # Batch Module
//!
//! Executes an ordered list of requests against the same [`Dispatcher`](crate::dispatcher::Dispatcher)
//! in one call, letting later requests reference fields of earlier results.
//!
//! ## Request
//!
//! ```json
//! {
//!   "requests": [
//!     {"method": "POST", "path": "/actors", "body": {"label": "Cube"}},
//!     {"method": "PUT",  "path": "/actors/move", "body": {"target": "$0.actor.label"}}
//!   ],
//!   "options": {"stop_on_error": true}
//! }
//! ```
//!
//! ## Response
//!
//! ```json
//! {
//!   "success": true,
//!   "results": [
//!     {"index": 0, "method": "POST", "path": "/actors", "status": 200, "success": true, "data": {}},
//!     {"index": 1, "method": "PUT", "path": "/actors/move", "status": 200, "success": true, "data": {}}
//!   ],
//!   "completed": 2,
//!   "failed": 0
//! }
//! ```
//!
//! ## Semantics
//!
//! - Steps run strictly in submission order, never in parallel
//! - Step `i` sees only the results of steps `0..i`
//! - `results` is never reordered; with `stop_on_error` (the default) it ends
//!   at the first failed step and the remaining steps never run
//! - Step failures are reported per step; the batch endpoint itself answers
//!   `200` unless the `requests` array is missing (`400`)
//!
//! See [`resolver`] for the `$N.path` token syntax.

mod orchestrator;
pub mod resolver;

pub use orchestrator::{
    BatchError, BatchOptions, BatchOrchestrator, BatchRequest, BatchResult, BatchStepResult,
    INVALID_REQUEST_OBJECT,
};
pub use resolver::{resolve_body, resolve_string};
