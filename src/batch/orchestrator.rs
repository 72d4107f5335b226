use super::resolver::resolve_body;
use crate::dispatcher::{parse_method, Dispatcher, HandlerRequest, HandlerResponse};
use crate::ids::RequestId;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

/// Message recorded for a descriptor that is not a JSON object.
pub const INVALID_REQUEST_OBJECT: &str = "Invalid request object";

/// Errors that reject a batch before any step runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("Missing required field: requests (array)")]
    MissingRequests,
}

/// Batch-level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchOptions {
    /// Stop at the first failed step (default `true`)
    pub stop_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            stop_on_error: true,
        }
    }
}

impl BatchOptions {
    /// Read options leniently: anything other than a boolean `stop_on_error`
    /// keeps the default.
    #[must_use]
    pub fn from_value(options: Option<&Value>) -> Self {
        let stop_on_error = options
            .and_then(|o| o.get("stop_on_error"))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        Self { stop_on_error }
    }
}

/// A parsed batch call: the raw descriptors plus options.
///
/// Descriptors stay as raw JSON so that a malformed entry fails only its
/// own step.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub requests: Vec<Value>,
    pub options: BatchOptions,
}

impl BatchRequest {
    #[must_use]
    pub fn new(requests: Vec<Value>, options: BatchOptions) -> Self {
        Self { requests, options }
    }

    /// Parse `{"requests": [...], "options": {...}}`.
    pub fn from_value(body: &Value) -> Result<Self, BatchError> {
        let requests = body
            .get("requests")
            .and_then(Value::as_array)
            .ok_or(BatchError::MissingRequests)?;
        Ok(Self {
            requests: requests.clone(),
            options: BatchOptions::from_value(body.get("options")),
        })
    }
}

/// Outcome of one batch step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStepResult {
    pub index: usize,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub success: bool,
    /// Response body of the step, when the handler produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Set only for descriptors that could not be interpreted at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchStepResult {
    fn invalid(index: usize) -> Self {
        Self {
            index,
            method: String::new(),
            path: String::new(),
            status: 400,
            success: false,
            data: None,
            error: Some(INVALID_REQUEST_OBJECT.to_string()),
        }
    }
}

/// Aggregate result of a batch call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    /// `true` when no step failed
    pub success: bool,
    pub results: Vec<BatchStepResult>,
    pub completed: usize,
    pub failed: usize,
}

/// Runs batch steps one after another through a [`Dispatcher`].
///
/// Steps are strictly sequential: step `i + 1` is not built until step `i`'s
/// envelope exists, because its body may reference step `i`'s output.
pub struct BatchOrchestrator<'a> {
    dispatcher: &'a Dispatcher,
    batch_id: RequestId,
}

impl<'a> BatchOrchestrator<'a> {
    #[must_use]
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self {
            dispatcher,
            batch_id: RequestId::new(),
        }
    }

    /// Tag step logs with the id of the request that carried the batch.
    #[must_use]
    pub fn with_batch_id(mut self, batch_id: RequestId) -> Self {
        self.batch_id = batch_id;
        self
    }

    /// Endpoint adapter: parse the request body, run the batch, and wrap the
    /// result in a `200` envelope.
    ///
    /// Step failures never change the outer status; only a missing
    /// `requests` array yields `400`.
    #[must_use]
    pub fn handle(&self, request: &HandlerRequest) -> HandlerResponse {
        let parsed = request
            .body
            .as_ref()
            .ok_or(BatchError::MissingRequests)
            .and_then(BatchRequest::from_value);

        let batch = match parsed {
            Ok(batch) => batch,
            Err(err) => {
                warn!(batch_id = %self.batch_id, error = %err, "Batch rejected");
                return HandlerResponse::bad_request(&err.to_string());
            }
        };

        let result = self.run(&batch);
        match serde_json::to_value(&result) {
            Ok(body) => HandlerResponse::ok(body),
            Err(err) => HandlerResponse::server_error(&format!("Failed to encode batch result: {err}")),
        }
    }

    /// Execute every step in submission order.
    #[must_use]
    pub fn run(&self, batch: &BatchRequest) -> BatchResult {
        let stop_on_error = batch.options.stop_on_error;
        let mut results: Vec<BatchStepResult> = Vec::with_capacity(batch.requests.len());
        let mut completed = 0;
        let mut failed = 0;

        info!(
            batch_id = %self.batch_id,
            steps = batch.requests.len(),
            stop_on_error,
            "Batch started"
        );

        for (index, descriptor) in batch.requests.iter().enumerate() {
            let _span = info_span!("batch_step", batch_id = %self.batch_id, index).entered();

            let step = self.run_step(index, descriptor, &results);
            let ok = step.success;
            results.push(step);

            if ok {
                completed += 1;
            } else {
                failed += 1;
                if stop_on_error {
                    info!(
                        batch_id = %self.batch_id,
                        index,
                        skipped = batch.requests.len() - index - 1,
                        "Batch stopped on failed step"
                    );
                    break;
                }
            }
        }

        info!(batch_id = %self.batch_id, completed, failed, "Batch finished");

        BatchResult {
            success: failed == 0,
            results,
            completed,
            failed,
        }
    }

    /// Build, resolve and dispatch a single step. `prior` holds exactly the
    /// results of steps `0..index`.
    fn run_step(&self, index: usize, descriptor: &Value, prior: &[BatchStepResult]) -> BatchStepResult {
        let Some(fields) = descriptor.as_object() else {
            warn!(batch_id = %self.batch_id, index, "Batch step is not an object");
            return BatchStepResult::invalid(index);
        };

        let raw_method = fields.get("method").and_then(Value::as_str).unwrap_or("");
        let method = parse_method(raw_method).unwrap_or_else(|| {
            warn!(
                batch_id = %self.batch_id,
                index,
                method = %raw_method,
                "Unrecognised batch method, dispatching as GET"
            );
            Method::GET
        });
        let submitted_path = fields.get("path").and_then(Value::as_str).unwrap_or("");

        let mut request = HandlerRequest::new(method.clone(), submitted_path);
        if let Some(body) = fields.get("body").filter(|b| !b.is_null()) {
            request = request.with_body(resolve_body(body, prior));
        }

        debug!(
            batch_id = %self.batch_id,
            request_id = %request.request_id,
            index,
            method = %method,
            path = %request.path,
            "Dispatching batch step"
        );

        let response = self.dispatcher.dispatch(&request);
        let success = response.is_success();

        BatchStepResult {
            index,
            method: method.as_str().to_string(),
            path: submitted_path.to_string(),
            status: response.status,
            success,
            data: response.body,
            error: None,
        }
    }
}
