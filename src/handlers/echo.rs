use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::router::{EndpointMeta, ParamMeta, RouteError, RouteGroup, Router};
use http::Method;
use serde_json::json;

/// Demo group that reflects requests back, used by the CLI and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoGroup;

impl EchoGroup {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RouteGroup for EchoGroup {
    fn name(&self) -> &str {
        "Echo"
    }

    fn base_path(&self) -> &str {
        "/echo"
    }

    fn description(&self) -> &str {
        "Reflects requests back to the caller"
    }

    fn endpoints(&self) -> Vec<EndpointMeta> {
        vec![
            EndpointMeta::new(Method::GET, "/echo", "Echo method, path and query"),
            EndpointMeta::new(Method::POST, "/echo", "Echo method, path, query and body"),
            EndpointMeta::new(Method::POST, "/echo/fail", "Return an error envelope")
                .with_param(ParamMeta::new("status", "number", false, "Status to fail with (default 400)"))
                .with_param(ParamMeta::new("code", "string", false, "Error code (default INVALID_PARAMS)")),
            EndpointMeta::new(Method::POST, "/echo/panic", "Panic inside the handler"),
        ]
    }

    fn register_routes(&self, router: &mut Router) -> Result<(), RouteError> {
        router.register_route(Method::GET, "/echo", echo_handler)?;
        router.register_route(Method::POST, "/echo", echo_handler)?;
        router.register_route(Method::POST, "/echo/fail", fail_handler)?;
        router.register_route(Method::POST, "/echo/panic", panic_handler)?;
        Ok(())
    }
}

/// Echoes back request id, method, path, query and body.
pub fn echo_handler(req: &HandlerRequest, _dispatcher: &Dispatcher) -> HandlerResponse {
    HandlerResponse::ok(json!({
        "success": true,
        "request_id": req.request_id,
        "method": req.method.as_str(),
        "path": req.path,
        "query": req.query_params,
        "body": req.body,
    }))
}

fn fail_handler(req: &HandlerRequest, _dispatcher: &Dispatcher) -> HandlerResponse {
    let status = req
        .optional_i64("status", 400)
        .clamp(400, 599);
    let code = req
        .body_str("code")
        .unwrap_or(crate::dispatcher::INVALID_PARAMS);
    let message = req.body_str("message").unwrap_or("Requested failure");
    HandlerResponse::error(status as u16, code, message)
}

#[allow(clippy::panic)]
fn panic_handler(_req: &HandlerRequest, _dispatcher: &Dispatcher) -> HandlerResponse {
    panic!("echo panic requested")
}
