//! Tests for the built-in infrastructure endpoints: `/health` and
//! `/handlers`.

mod common;

use cmdrouter::dispatcher::{Dispatcher, HandlerRequest};
use cmdrouter::router::RouteError;
use cmdrouter::runtime_config::RuntimeConfig;
use common::routers::{full_dispatcher, full_router, full_router_with, ItemsGroup};
use http::Method;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_health_reports_server_and_groups() {
    let dispatcher = full_dispatcher();
    let resp = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/api/v1/health"));

    assert_eq!(resp.status, 200);
    let body = resp.body.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["healthy"], json!(true));
    assert_eq!(body["status"], "running");
    assert_eq!(body["server"]["name"], "cmdrouter");
    assert_eq!(body["server"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["handlers"], json!(["Infrastructure", "Echo", "Items"]));
    assert_eq!(body["routes"], json!(dispatcher.router().route_count()));
}

#[test]
fn test_health_uses_configured_server_name() {
    let config = RuntimeConfig {
        server_name: "orders-svc".to_string(),
        ..RuntimeConfig::default()
    };
    let dispatcher = Dispatcher::new(full_router_with(config));
    let body = dispatcher
        .dispatch(&HandlerRequest::new(Method::GET, "/health"))
        .body
        .unwrap();
    assert_eq!(body["server"]["name"], "orders-svc");
}

#[test]
fn test_handlers_lists_every_group() {
    let dispatcher = full_dispatcher();
    let body = dispatcher
        .dispatch(&HandlerRequest::new(Method::GET, "/handlers"))
        .body
        .unwrap();

    let handlers = body["handlers"].as_array().unwrap();
    let names: Vec<&str> = handlers.iter().map(|h| h["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Infrastructure", "Echo", "Items"]);

    let items = &handlers[2];
    assert_eq!(items["base_path"], "/items");
    assert_eq!(items["description"], "Canned item records");
    assert_eq!(items["endpoints"][0]["method"], "POST");
    assert_eq!(items["endpoints"][0]["path"], "/items/create");

    let batch = handlers[0]["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["path"] == "/batch")
        .unwrap();
    assert_eq!(batch["params"][0]["name"], "requests");
    assert_eq!(batch["params"][0]["type"], "array");
    assert_eq!(batch["params"][0]["required"], json!(true));
}

#[test]
fn test_handlers_lookup_by_name_is_case_insensitive() {
    let dispatcher = full_dispatcher();
    let req = HandlerRequest::new(Method::GET, "/handlers").with_query("name", "items");
    let resp = dispatcher.dispatch(&req);

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body.unwrap()["handler"]["name"], "Items");
}

#[test]
fn test_handlers_lookup_miss_lists_available() {
    let dispatcher = full_dispatcher();
    let resp = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/handlers?name=Billing"));

    assert_eq!(resp.status, 404);
    assert_eq!(resp.error_code(), Some("NOT_FOUND"));
    let body = resp.body.unwrap();
    assert_eq!(body["message"], "Handler 'Billing' not found");
    assert_eq!(body["available_handlers"], json!(["Infrastructure", "Echo", "Items"]));
}

#[test]
fn test_introspection_matches_route_table() {
    let router = full_router();
    let routes = router.routes();
    assert_eq!(routes.len(), router.route_count());
    assert!(routes
        .iter()
        .any(|r| r.path == "/items/get" && r.group.as_deref() == Some("Items")));
}

#[test]
fn test_group_cannot_be_registered_twice() {
    let mut router = full_router();
    let before = router.route_count();
    let err = router.register_group(Arc::new(ItemsGroup)).unwrap_err();
    assert_eq!(err, RouteError::DuplicateGroup("Items".to_string()));
    assert_eq!(router.route_count(), before);
}

#[test]
fn test_handlers_endpoint_lookup() {
    let dispatcher = full_dispatcher();
    let resp = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/handlers?endpoint=items/create"));

    assert_eq!(resp.status, 200);
    let body = resp.body.unwrap();
    let endpoints = body["endpoints"].as_array().unwrap();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0]["group"], "Items");
    assert_eq!(endpoints[0]["method"], "POST");
    assert_eq!(endpoints[0]["path"], "/items/create");
}

#[test]
fn test_handlers_endpoint_lookup_returns_every_method() {
    let dispatcher = full_dispatcher();
    let req = HandlerRequest::new(Method::GET, "/handlers").with_query("endpoint", "/ECHO");
    let body = dispatcher.dispatch(&req).body.unwrap();
    let methods: Vec<&str> = body["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["method"].as_str().unwrap())
        .collect();
    assert_eq!(methods, vec!["GET", "POST"]);
}

#[test]
fn test_handlers_endpoint_lookup_miss_lists_available() {
    let dispatcher = full_dispatcher();
    let resp = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/handlers?endpoint=/nope"));

    assert_eq!(resp.status, 404);
    assert_eq!(resp.error_code(), Some("NOT_FOUND"));
    let body = resp.body.unwrap();
    assert_eq!(body["message"], "Endpoint '/nope' not found");
    let available = body["available_endpoints"].as_array().unwrap();
    assert!(available.contains(&json!("/batch")));
    assert!(available.contains(&json!("/items/get")));
    assert_eq!(available.iter().filter(|p| **p == "/echo").count(), 1);
}
