//! Energy anomaly engine
//!
//! Reads one JSON request from stdin, routes it through the engine, and
//! writes one JSON response to stdout. Diagnostics go to stderr so the
//! stdout contract stays a single well-formed object, even on failure.

use anyhow::{Context, Result};
use engine_lib::models::EngineRequest;
use engine_lib::store::FsModelStore;
use engine_lib::Engine;
use serde_json::{json, Value};
use std::io::Read;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    info!(version = ENGINE_VERSION, "Starting energy-engine");

    let config = config::EngineConfig::load()?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read request from stdin")?;

    let response = respond(&config, &input);
    println!("{response}");
    Ok(())
}

/// Turn one raw request into one response object, converting every
/// failure into an `{"error": ...}` payload
fn respond(config: &config::EngineConfig, input: &str) -> Value {
    let request: EngineRequest = match serde_json::from_str(input) {
        Ok(request) => request,
        Err(err) => return json!({ "error": format!("Invalid request: {err}") }),
    };

    let store = match FsModelStore::new(&config.model_dir) {
        Ok(store) => store,
        Err(err) => return json!({ "error": err.to_string() }),
    };

    Engine::new(Arc::new(store), &config.default_dataset).process(&request)
}
