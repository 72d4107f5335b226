//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the router.
//!
//! ## Environment Variables
//!
//! ### `CMDR_API_PREFIX`
//!
//! Prefix stripped from inbound request paths before route lookup, so that a
//! transport mounted at `/api/v1` can hand `/api/v1/health` straight to the
//! dispatcher and have it match the `/health` route.
//!
//! Default: `/api/v1`. Set to an empty string to disable prefix stripping.
//!
//! ### `CMDR_SERVER_NAME`
//!
//! Name reported by `GET /health`.
//!
//! Default: `cmdrouter`
//!
//! ## Usage
//!
//! ```rust
//! use cmdrouter::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("API prefix: {}", config.api_prefix);
//! ```

use std::env;

/// Default prefix stripped from request paths.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Default name reported by the health endpoint.
pub const DEFAULT_SERVER_NAME: &str = "cmdrouter";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Path prefix removed before route lookup (empty disables stripping)
    pub api_prefix: String,
    /// Server name reported by `GET /health`
    pub server_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a closure over a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_prefix = lookup("CMDR_API_PREFIX")
            .map(|p| p.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());
        let server_name = lookup("CMDR_SERVER_NAME")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());
        RuntimeConfig {
            api_prefix,
            server_name,
        }
    }
}
