//! Router core module - route table, handler groups and introspection.

use crate::dispatcher::{is_supported_method, Dispatcher, HandlerFn, HandlerRequest, HandlerResponse};
use crate::runtime_config::RuntimeConfig;
use http::Method;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::RouteError;

/// A group of related endpoints registered together (e.g. everything under `/echo`).
///
/// The group owns its route registration and describes its endpoints for
/// introspection. Individual routes are plain closures; the group is only the
/// unit of registration and reporting.
pub trait RouteGroup: Send + Sync {
    /// Human-readable name, unique across the router (case-insensitive)
    fn name(&self) -> &str;

    /// Common prefix of this group's routes, e.g. `/echo`
    fn base_path(&self) -> &str;

    fn description(&self) -> &str;

    /// Endpoint metadata reported through [`Router::groups`].
    fn endpoints(&self) -> Vec<EndpointMeta> {
        Vec::new()
    }

    /// Register this group's routes. Called once by [`Router::register_group`].
    fn register_routes(&self, router: &mut Router) -> Result<(), RouteError>;

    /// Release any resources; called once from [`Router::shutdown_groups`].
    fn shutdown(&self) {}
}

fn serialize_method<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

/// Description of a single endpoint parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamMeta {
    pub name: String,
    /// JSON type of the parameter (`string`, `number`, `boolean`, `object`, `array`)
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    pub description: String,
}

impl ParamMeta {
    #[must_use]
    pub fn new(name: &str, kind: &str, required: bool, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            required,
            description: description.to_string(),
        }
    }
}

/// Metadata describing one endpoint of a [`RouteGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointMeta {
    #[serde(serialize_with = "serialize_method")]
    pub method: Method,
    pub path: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamMeta>,
}

impl EndpointMeta {
    #[must_use]
    pub fn new(method: Method, path: &str, description: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            description: description.to_string(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: ParamMeta) -> Self {
        self.params.push(param);
        self
    }
}

/// Snapshot of a registered group, as reported to introspection callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub name: String,
    pub base_path: String,
    pub description: String,
    pub endpoints: Vec<EndpointMeta>,
}

/// An endpoint found by path, tagged with the group that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointInfo {
    pub group: String,
    #[serde(flatten)]
    pub endpoint: EndpointMeta,
}

/// Snapshot of a registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    #[serde(serialize_with = "serialize_method")]
    pub method: Method,
    pub path: String,
    /// Name of the group that registered the route, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// A bound route: the normalized path, its method and the handler to invoke.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub group: Option<String>,
    pub handler: HandlerFn,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

/// Normalize a request path for lookup.
///
/// Drops any `?query` suffix, strips `prefix` when it matches on a segment
/// boundary, and guarantees a leading `/`. An empty path becomes `/`.
#[must_use]
pub fn normalize_path(prefix: &str, raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw.split_once('?').map_or(raw, |(path, _)| path);
    let stripped = if prefix.is_empty() {
        raw
    } else {
        match raw.strip_prefix(prefix) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => raw,
        }
    };
    if stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{stripped}")
    }
}

/// Route table mapping `(method, path)` to exactly one handler.
///
/// Built mutably at startup, then frozen by handing it to
/// [`Dispatcher::new`](crate::dispatcher::Dispatcher::new).
pub struct Router {
    config: RuntimeConfig,
    routes: HashMap<Method, HashMap<String, Route>>,
    groups: Vec<Arc<dyn RouteGroup>>,
    /// Group whose `register_routes` is currently running
    registering: Option<String>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create an empty router with the default runtime configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            config,
            routes: HashMap::new(),
            groups: Vec::new(),
            registering: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Bind `handler` to the exact `(method, path)` pair.
    ///
    /// Registering the same pair twice is rejected and the first handler
    /// stays bound.
    pub fn register_route<F>(&mut self, method: Method, path: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&HandlerRequest, &Dispatcher) -> HandlerResponse + Send + Sync + 'static,
    {
        self.register_handler_fn(method, path, Arc::new(handler))
    }

    /// Same as [`register_route`](Self::register_route) for an already shared handler.
    pub fn register_handler_fn(
        &mut self,
        method: Method,
        path: &str,
        handler: HandlerFn,
    ) -> Result<(), RouteError> {
        let path = normalize_path("", path);
        if !is_supported_method(&method) {
            return Err(RouteError::UnsupportedMethod { method, path });
        }

        let table = self.routes.entry(method.clone()).or_default();
        if table.contains_key(&path) {
            warn!(
                method = %method,
                path = %path,
                "Duplicate route registration rejected"
            );
            return Err(RouteError::DuplicateRoute { method, path });
        }

        debug!(method = %method, path = %path, group = ?self.registering, "Route registered");
        table.insert(
            path.clone(),
            Route {
                method,
                path,
                group: self.registering.clone(),
                handler,
            },
        );
        Ok(())
    }

    /// Register a handler group and all of its routes.
    ///
    /// Registration is all-or-nothing: if any of the group's routes is
    /// rejected, the routes it had already added are removed again and the
    /// group is not recorded.
    pub fn register_group(&mut self, group: Arc<dyn RouteGroup>) -> Result<(), RouteError> {
        let name = group.name().to_string();
        if self.find_group_arc(&name).is_some() {
            return Err(RouteError::DuplicateGroup(name));
        }

        let before: Vec<(Method, String)> = self.route_keys();
        self.registering = Some(name.clone());
        let result = group.register_routes(self);
        self.registering = None;

        if let Err(err) = result {
            self.routes.values_mut().for_each(|table| {
                table.retain(|_, route| {
                    before
                        .iter()
                        .any(|(m, p)| *m == route.method && *p == route.path)
                })
            });
            warn!(group = %name, error = %err, "Handler group registration rolled back");
            return Err(err);
        }

        info!(
            group = %name,
            base_path = %group.base_path(),
            total_routes = self.route_count(),
            "Registered handler group"
        );
        self.groups.push(group);
        Ok(())
    }

    /// Exact-match lookup on an already normalized path.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.get(method).and_then(|table| table.get(path))
    }

    #[must_use]
    pub fn contains_route(&self, method: &Method, path: &str) -> bool {
        self.match_route(method, &normalize_path("", path)).is_some()
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    /// All registered routes, sorted by path and then method.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut routes: Vec<RouteInfo> = self
            .routes
            .values()
            .flat_map(HashMap::values)
            .map(|route| RouteInfo {
                method: route.method.clone(),
                path: route.path.clone(),
                group: route.group.clone(),
            })
            .collect();
        routes.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.method.as_str().cmp(b.method.as_str()))
        });
        routes
    }

    /// Registered groups in registration order.
    #[must_use]
    pub fn groups(&self) -> Vec<GroupInfo> {
        self.groups.iter().map(|g| group_info(g.as_ref())).collect()
    }

    #[must_use]
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name().to_string()).collect()
    }

    /// Look up a group by name, ignoring case.
    #[must_use]
    pub fn find_group(&self, name: &str) -> Option<GroupInfo> {
        self.find_group_arc(name).map(|g| group_info(g.as_ref()))
    }

    /// Endpoint metadata declared for `path`, across all groups.
    ///
    /// Paths compare ignoring ASCII case and a missing leading `/`; every
    /// method declared for the path is returned.
    #[must_use]
    pub fn find_endpoints(&self, path: &str) -> Vec<EndpointInfo> {
        let wanted = path.trim().trim_start_matches('/');
        self.groups
            .iter()
            .flat_map(|group| {
                group
                    .endpoints()
                    .into_iter()
                    .filter(|e| e.path.trim_start_matches('/').eq_ignore_ascii_case(wanted))
                    .map(|endpoint| EndpointInfo {
                        group: group.name().to_string(),
                        endpoint,
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Distinct endpoint paths declared by all groups, in registration order.
    #[must_use]
    pub fn endpoint_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for endpoint in self.groups.iter().flat_map(|g| g.endpoints()) {
            if !paths.contains(&endpoint.path) {
                paths.push(endpoint.path);
            }
        }
        paths
    }

    /// Call every group's shutdown hook in registration order.
    pub fn shutdown_groups(&self) {
        for group in &self.groups {
            debug!(group = %group.name(), "Shutting down handler group");
            group.shutdown();
        }
    }

    fn find_group_arc(&self, name: &str) -> Option<&Arc<dyn RouteGroup>> {
        self.groups
            .iter()
            .find(|g| g.name().eq_ignore_ascii_case(name))
    }

    fn route_keys(&self) -> Vec<(Method, String)> {
        self.routes
            .values()
            .flat_map(HashMap::values)
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect()
    }
}

fn group_info(group: &dyn RouteGroup) -> GroupInfo {
    GroupInfo {
        name: group.name().to_string(),
        base_path: group.base_path().to_string(),
        description: group.description().to_string(),
        endpoints: group.endpoints(),
    }
}
