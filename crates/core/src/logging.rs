//! Structured logging setup for VeriPass services and tools.
//!
//! Initialization is centralized here so every binary in the workspace
//! emits the same shape of logs. The filter comes from `RUST_LOG` and
//! falls back to `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize human-readable log output.
///
/// # Example
/// ```no_run
/// veripass_core::logging::init();
/// tracing::info!("registry loaded");
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true))
        .init();
}

/// Initialize JSON log output for aggregation pipelines.
pub fn init_json() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true).with_current_span(false))
        .init();
}
