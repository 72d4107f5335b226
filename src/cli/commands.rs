use crate::dispatcher::{parse_method, Dispatcher, HandlerRequest, HandlerResponse};
use crate::handlers::demo_router;
use crate::ids::RequestId;
use crate::runtime_config::RuntimeConfig;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Command-line interface for the command router
///
/// Runs requests against a demo router made of the built-in
/// infrastructure group (`/health`, `/handlers`, `/batch`) and the echo
/// group (`/echo`, `/echo/fail`, `/echo/panic`).
#[derive(Parser, Debug)]
#[command(name = "cmdrouter")]
#[command(about = "In-process command router with batch execution", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the registered routes (or handler groups) as JSON
    Routes {
        /// List handler groups with endpoint metadata instead of flat routes
        #[arg(long, default_value_t = false)]
        groups: bool,
    },
    /// Dispatch a single request
    Dispatch {
        /// HTTP method (GET, POST, PUT, DELETE)
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path, e.g. /health
        #[arg(short, long)]
        path: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_key_val)]
        query: Vec<(String, String)>,

        /// Correlation id (ULID) to tag the request with; a fresh one is
        /// generated when absent or unparsable
        #[arg(long, env = "CMDR_REQUEST_ID")]
        request_id: Option<String>,
    },
    /// Run a batch request read from a file (or stdin when no file is given)
    Batch {
        /// Path to a JSON file holding {"requests": [...], "options": {...}}
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Keep executing after a failed step (sets options.stop_on_error=false)
        #[arg(long, default_value_t = false)]
        continue_on_error: bool,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))
}

/// Build the demo dispatcher used by every CLI command.
pub fn demo_dispatcher(config: RuntimeConfig) -> Result<Dispatcher> {
    let router = demo_router(config).context("Failed to register demo routes")?;
    Ok(Dispatcher::new(router))
}

/// Execute a command and return the envelope to print.
///
/// `stdin` is only read by `batch` without `--file`.
pub fn run_command<R: Read>(command: &Commands, dispatcher: &Dispatcher, stdin: R) -> Result<HandlerResponse> {
    match command {
        Commands::Routes { groups } => {
            let router = dispatcher.router();
            let body = if *groups {
                json!({"success": true, "handlers": router.groups()})
            } else {
                json!({"success": true, "routes": router.routes()})
            };
            Ok(HandlerResponse::ok(body))
        }
        Commands::Dispatch {
            method,
            path,
            body,
            query,
            request_id,
        } => {
            let method = parse_method(method).ok_or_else(|| anyhow!("Unsupported method: {method}"))?;
            let mut request = HandlerRequest::new(method, path.as_str())
                .with_request_id(RequestId::parse_or_new(request_id.as_deref()));
            for (k, v) in query {
                request = request.with_query(k.as_str(), v.as_str());
            }
            if let Some(raw) = body {
                let value: Value = serde_json::from_str(raw).context("--body is not valid JSON")?;
                request = request.with_body(value);
            }
            Ok(dispatcher.dispatch(&request))
        }
        Commands::Batch {
            file,
            continue_on_error,
        } => {
            let mut batch = read_batch(file.as_deref(), stdin)?;
            if *continue_on_error {
                set_continue_on_error(&mut batch)?;
            }
            let request = HandlerRequest::new(Method::POST, "/batch").with_body(batch);
            Ok(dispatcher.dispatch(&request))
        }
    }
}

fn read_batch<R: Read>(file: Option<&Path>, mut stdin: R) -> Result<Value> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file {}", path.display()))?,
        None => {
            let mut raw = String::new();
            stdin
                .read_to_string(&mut raw)
                .context("Failed to read batch from stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("Batch input is not valid JSON")
}

fn set_continue_on_error(batch: &mut Value) -> Result<()> {
    let Some(root) = batch.as_object_mut() else {
        bail!("Batch input must be a JSON object");
    };
    let options = root
        .entry("options")
        .or_insert_with(|| json!({}));
    match options.as_object_mut() {
        Some(options) => {
            options.insert("stop_on_error".to_string(), Value::Bool(false));
            Ok(())
        }
        None => bail!("Batch options must be a JSON object"),
    }
}

/// Parse arguments, run the command, print the envelope body and return the
/// process exit code (0 on a 2xx envelope, 1 otherwise).
pub fn run_cli(cli: Cli) -> Result<i32> {
    let dispatcher = demo_dispatcher(RuntimeConfig::from_env())?;
    let response = run_command(&cli.command, &dispatcher, std::io::stdin().lock())?;
    let body = response.body.clone().unwrap_or(Value::Null);
    println!(
        "{}",
        serde_json::to_string_pretty(&body).context("Failed to encode response")?
    );
    dispatcher.router().shutdown_groups();
    Ok(if response.is_success() { 0 } else { 1 })
}
