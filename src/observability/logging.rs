//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Pick the output format and level from settings
//!
//! # Design Decisions
//! - RUST_LOG wins over the configured level when set
//! - JSON format for production, pretty format for development

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber.
///
/// `level_override` (from the command line) replaces the configured level.
pub fn init_logging(config: &ObservabilityConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(config.log_level.as_str());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("nginx_fleet_sync={level},kube=warn").into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
