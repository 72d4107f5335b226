//! Built-in handler groups.
//!
//! - [`InfrastructureGroup`] - `/health`, `/handlers` and the `/batch` endpoint
//! - [`EchoGroup`] - request reflection, used by the CLI demo router and tests
//!
//! Domain handlers live outside this crate; they implement
//! [`RouteGroup`](crate::router::RouteGroup) and are registered next to these.

mod echo;
mod infrastructure;

pub use echo::{echo_handler, EchoGroup};
pub use infrastructure::InfrastructureGroup;

use crate::router::{RouteError, Router};
use crate::runtime_config::RuntimeConfig;
use std::sync::Arc;

/// Router with the infrastructure and echo groups registered.
pub fn demo_router(config: RuntimeConfig) -> Result<Router, RouteError> {
    let mut router = Router::with_config(config);
    router.register_group(Arc::new(InfrastructureGroup::new()))?;
    router.register_group(Arc::new(EchoGroup::new()))?;
    Ok(router)
}
