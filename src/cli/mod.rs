//! # CLI Module
//!
//! Command-line front end for exercising the router without a network
//! listener.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! ```bash
//! cmdrouter routes            # flat route table
//! cmdrouter routes --groups   # handler groups with endpoint metadata
//! ```
//!
//! ### `dispatch`
//!
//! ```bash
//! cmdrouter dispatch --method POST --path /echo --body '{"x": 1}' -q verbose=true
//! ```
//!
//! ### `batch`
//!
//! ```bash
//! cmdrouter batch --file steps.json
//! cat steps.json | cmdrouter batch --continue-on-error
//! ```
//!
//! The process exits with status 1 when the resulting envelope is not 2xx.

mod commands;


pub use commands::{demo_dispatcher, run_cli, run_command, Cli, Commands};
