use super::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::ids::RequestId;
use crate::router::Router;
use http::Method;
use serde_json::json;
use std::sync::Arc;

fn query_echo_router() -> Router {
    let mut router = Router::new();
    router
        .register_route(Method::GET, "/search", |req: &HandlerRequest, _: &Dispatcher| {
            HandlerResponse::ok(json!({
                "success": true,
                "path": req.path,
                "query": req.query_params,
            }))
        })
        .unwrap();
    router
}

#[test]
fn test_new_splits_query_from_path() {
    let req = HandlerRequest::new(Method::GET, "/search?q=a%20b&limit=10");
    assert_eq!(req.path, "/search");
    assert_eq!(req.get_query_param("q"), Some("a b"));
    assert_eq!(req.get_query_param("limit"), Some("10"));
}

#[test]
fn test_new_without_query_leaves_params_empty() {
    let req = HandlerRequest::new(Method::GET, "/search");
    assert_eq!(req.path, "/search");
    assert!(req.query_params.is_empty());

    let req = HandlerRequest::new(Method::GET, "/search?");
    assert_eq!(req.path, "/search");
    assert!(req.query_params.is_empty());
}

#[test]
fn test_explicit_query_overrides_inline_query() {
    let req = HandlerRequest::new(Method::GET, "/search?q=inline").with_query("q", "explicit");
    assert_eq!(req.get_query_param("q"), Some("explicit"));
}

#[test]
fn test_dispatch_delivers_inline_query_to_handler() {
    let dispatcher = Dispatcher::new(query_echo_router());
    let resp = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/api/v1/search?q=rust"));
    assert_eq!(resp.status, 200);
    let body = resp.body.unwrap();
    assert_eq!(body["path"], "/api/v1/search");
    assert_eq!(body["query"], json!({"q": "rust"}));
}

#[test]
fn test_with_request_id_replaces_generated_id() {
    let id: RequestId = "01ARZ3NDEKTSV4RRFFQ69G5FAV".parse().unwrap();
    let req = HandlerRequest::new(Method::GET, "/search").with_request_id(id);
    assert_eq!(req.request_id, id);
}

#[test]
fn test_optional_body_accessors() {
    let req = HandlerRequest::new(Method::POST, "/x").with_body(json!({
        "flag": true,
        "count": 7,
        "ratio": 0.5,
        "label": "seven"
    }));

    assert!(req.optional_bool("flag", false));
    assert!(req.optional_bool("missing", true));
    assert!(!req.optional_bool("label", false));

    assert_eq!(req.optional_i64("count", 0), 7);
    assert_eq!(req.optional_i64("ratio", -1), -1);

    assert!((req.optional_f64("ratio", 0.0) - 0.5).abs() < f64::EPSILON);
    assert!((req.optional_f64("count", 0.0) - 7.0).abs() < f64::EPSILON);
    assert!((req.optional_f64("label", 1.5) - 1.5).abs() < f64::EPSILON);
}

#[test]
fn test_optional_accessors_without_body_use_defaults() {
    let req = HandlerRequest::new(Method::GET, "/x");
    assert!(req.optional_bool("flag", true));
    assert!((req.optional_f64("ratio", 2.5) - 2.5).abs() < f64::EPSILON);
}

#[test]
fn test_from_shared_uses_same_registry() {
    let router = Arc::new(query_echo_router());
    let first = Dispatcher::from_shared(Arc::clone(&router));
    let second = Dispatcher::from_shared(Arc::clone(&router));

    assert_eq!(Arc::strong_count(&router), 3);
    assert!(std::ptr::eq(first.router(), second.router()));
    let resp = second.dispatch(&HandlerRequest::new(Method::GET, "/search"));
    assert_eq!(resp.status, 200);
}
