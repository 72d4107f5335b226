#![allow(dead_code)]

pub mod test_tracing {
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Install a test-writer subscriber once per test binary.
    ///
    /// Set `RUST_LOG=cmdrouter=debug` to see dispatcher and batch logs in
    /// failing test output.
    pub fn init_test_tracing() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });
    }
}

pub mod routers {
    use cmdrouter::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
    use cmdrouter::handlers::{EchoGroup, InfrastructureGroup};
    use cmdrouter::router::{EndpointMeta, RouteError, RouteGroup, Router};
    use cmdrouter::runtime_config::RuntimeConfig;
    use http::Method;
    use serde_json::json;
    use std::sync::Arc;

    /// Item store stand-in: returns canned records so batch steps have
    /// something to reference.
    pub struct ItemsGroup;

    impl RouteGroup for ItemsGroup {
        fn name(&self) -> &str {
            "Items"
        }

        fn base_path(&self) -> &str {
            "/items"
        }

        fn description(&self) -> &str {
            "Canned item records"
        }

        fn endpoints(&self) -> Vec<EndpointMeta> {
            vec![
                EndpointMeta::new(Method::POST, "/items/create", "Create an item"),
                EndpointMeta::new(Method::POST, "/items/get", "Fetch an item by id"),
            ]
        }

        fn register_routes(&self, router: &mut Router) -> Result<(), RouteError> {
            router.register_route(Method::POST, "/items/create", create_item)?;
            router.register_route(Method::POST, "/items/get", get_item)?;
            router.register_route(Method::GET, "/items/stats", item_stats)?;
            Ok(())
        }
    }

    fn create_item(req: &HandlerRequest, _d: &Dispatcher) -> HandlerResponse {
        let name = match req.required_str("name") {
            Ok(name) => name,
            Err(resp) => return resp,
        };
        HandlerResponse::ok(json!({
            "success": true,
            "id": "item-42",
            "name": name,
            "owner": {"profile": {"name": "ada"}},
            "count": 5,
            "ratio": 0.25,
            "active": true,
            "tags": ["a", "b"]
        }))
    }

    fn get_item(req: &HandlerRequest, _d: &Dispatcher) -> HandlerResponse {
        let id = match req.required_str("id") {
            Ok(id) => id,
            Err(resp) => return resp,
        };
        if id != "item-42" {
            return HandlerResponse::not_found(&format!("Item not found: {id}"));
        }
        HandlerResponse::ok(json!({"success": true, "id": id, "echo": req.body}))
    }

    fn item_stats(_req: &HandlerRequest, _d: &Dispatcher) -> HandlerResponse {
        HandlerResponse::ok(json!({"success": true, "total": 1}))
    }

    /// Infrastructure, echo and items groups with the default config.
    pub fn full_router() -> Router {
        full_router_with(RuntimeConfig::default())
    }

    pub fn full_router_with(config: RuntimeConfig) -> Router {
        let mut router = Router::with_config(config);
        router
            .register_group(Arc::new(InfrastructureGroup::new()))
            .expect("register infrastructure");
        router
            .register_group(Arc::new(EchoGroup::new()))
            .expect("register echo");
        router
            .register_group(Arc::new(ItemsGroup))
            .expect("register items");
        router
    }

    pub fn full_dispatcher() -> Dispatcher {
        super::test_tracing::init_test_tracing();
        Dispatcher::new(full_router())
    }
}
