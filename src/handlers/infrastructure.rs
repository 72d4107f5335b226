use crate::batch::BatchOrchestrator;
use crate::dispatcher::{success_body, Dispatcher, HandlerRequest, HandlerResponse};
use crate::router::{EndpointMeta, ParamMeta, RouteError, RouteGroup, Router};
use http::Method;
use serde_json::{json, Map, Value};

/// Server health, handler listing, and the batch endpoint.
///
/// Endpoints:
///   GET  /health   - liveness and registered group names
///   GET  /handlers - registered groups with their endpoint metadata
///   POST /batch    - run several requests in one call
#[derive(Debug, Default, Clone, Copy)]
pub struct InfrastructureGroup;

impl InfrastructureGroup {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RouteGroup for InfrastructureGroup {
    fn name(&self) -> &str {
        "Infrastructure"
    }

    fn base_path(&self) -> &str {
        ""
    }

    fn description(&self) -> &str {
        "Server health, handler discovery and batch execution"
    }

    fn endpoints(&self) -> Vec<EndpointMeta> {
        vec![
            EndpointMeta::new(Method::GET, "/health", "Server health check"),
            EndpointMeta::new(Method::GET, "/handlers", "List registered handler groups")
                .with_param(ParamMeta::new("name", "string", false, "Only the group with this name"))
                .with_param(ParamMeta::new("endpoint", "string", false, "Only endpoints declared for this path")),
            EndpointMeta::new(Method::POST, "/batch", "Execute multiple requests sequentially")
                .with_param(ParamMeta::new(
                    "requests",
                    "array",
                    true,
                    "Ordered request descriptors: {method, path, body?}. String values in body may reference earlier results as $N.field",
                ))
                .with_param(ParamMeta::new(
                    "options",
                    "object",
                    false,
                    "{stop_on_error: bool = true}",
                )),
        ]
    }

    fn register_routes(&self, router: &mut Router) -> Result<(), RouteError> {
        router.register_route(Method::GET, "/health", handle_health)?;
        router.register_route(Method::GET, "/handlers", handle_handlers)?;
        router.register_route(Method::POST, "/batch", handle_batch)?;
        Ok(())
    }
}

fn handle_health(_req: &HandlerRequest, dispatcher: &Dispatcher) -> HandlerResponse {
    let router = dispatcher.router();
    let mut fields = Map::new();
    fields.insert("healthy".to_string(), Value::Bool(true));
    fields.insert("status".to_string(), json!("running"));
    fields.insert(
        "server".to_string(),
        json!({
            "name": router.config().server_name,
            "version": env!("CARGO_PKG_VERSION"),
        }),
    );
    fields.insert("handlers".to_string(), json!(router.group_names()));
    fields.insert("routes".to_string(), json!(router.route_count()));
    HandlerResponse::ok(success_body(fields))
}

fn handle_handlers(req: &HandlerRequest, dispatcher: &Dispatcher) -> HandlerResponse {
    let router = dispatcher.router();

    if let Some(path) = req.get_query_param("endpoint").filter(|p| !p.is_empty()) {
        let found = router.find_endpoints(path);
        if found.is_empty() {
            return HandlerResponse::json(
                404,
                json!({
                    "success": false,
                    "error": crate::dispatcher::NOT_FOUND,
                    "message": format!("Endpoint '{path}' not found"),
                    "available_endpoints": router.endpoint_paths(),
                }),
            );
        }
        return HandlerResponse::ok(json!({"success": true, "endpoints": found}));
    }

    if let Some(name) = req.get_query_param("name").filter(|n| !n.is_empty()) {
        return match router.find_group(name) {
            Some(group) => HandlerResponse::ok(json!({"success": true, "handler": group})),
            None => HandlerResponse::json(
                404,
                json!({
                    "success": false,
                    "error": crate::dispatcher::NOT_FOUND,
                    "message": format!("Handler '{name}' not found"),
                    "available_handlers": router.group_names(),
                }),
            ),
        };
    }

    HandlerResponse::ok(json!({
        "success": true,
        "handlers": router.groups(),
    }))
}

fn handle_batch(req: &HandlerRequest, dispatcher: &Dispatcher) -> HandlerResponse {
    BatchOrchestrator::new(dispatcher)
        .with_batch_id(req.request_id)
        .handle(req)
}
