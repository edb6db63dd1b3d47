//! NGINX fleet configuration sync.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────┐      ┌──────────────────────────────────────────┐
//!   │  Kubernetes API      │      │              nginx-fleet-sync            │
//!   │                      │      │                                          │
//!   │  ConfigMap (ns nkl)  │─────▶│  sync::KubeWatchSource                   │
//!   │  data.nginx-hosts    │watch │      │ add / update / delete             │
//!   └──────────────────────┘      │      ▼                                   │
//!                                 │  sync::ConfigSync ──▶ SharedHostList ────┼──▶ host consumers
//!                                 │                                          │
//!   ┌──────────────────────┐      │  authentication::assemble                │
//!   │  PEM files + mode    │─────▶│      │                                   │
//!   └──────────────────────┘      │      ▼                                   │
//!                                 │  TlsConfiguration ──▶ rustls ClientConfig┼──▶ connection layer
//!                                 └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use nginx_fleet_sync::authentication::{assemble, TrustRoots};
use nginx_fleet_sync::config::{load_settings, Settings};
use nginx_fleet_sync::lifecycle::{signals, Shutdown};
use nginx_fleet_sync::observability::logging::init_logging;
use nginx_fleet_sync::sync::{ConfigSync, KubeWatchSource};

#[derive(Parser)]
#[command(name = "nginx-fleet-sync")]
#[command(about = "Sync NGINX hosts from a Kubernetes ConfigMap", long_about = None)]
struct Cli {
    /// Settings file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overrides the settings file.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };

    init_logging(&settings.observability, cli.log_level.as_deref());

    tracing::info!("nginx-fleet-sync v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        namespace = %settings.watcher.namespace,
        tls_mode = %settings.tls.mode,
        "Settings loaded"
    );

    // TLS first: a broken bundle should stop startup before anything is watched.
    let mode = settings.tls.trust_mode();
    let bundle = settings.tls.load_bundle()?;
    let tls = assemble(mode, &bundle).inspect_err(|e| {
        tracing::error!(mode = %mode, error = %e, "Failed to assemble TLS configuration");
    })?;
    let client_config = tls.client_config()?;

    let roots = match tls.roots() {
        TrustRoots::None => "none",
        TrustRoots::Default => "default",
        TrustRoots::Custom(_) => "custom",
    };
    tracing::info!(
        mode = %mode,
        roots,
        client_auth = client_config.client_auth_cert_resolver.has_certs(),
        skip_verification = tls.skip_verification(),
        "TLS client configuration validated"
    );

    let client = kube::Client::try_default().await?;

    let mut config_sync = ConfigSync::new(&settings.watcher);
    config_sync.initialize(KubeWatchSource::new(client, settings.watcher.retry.clone()))?;
    let hosts = config_sync.hosts();

    let shutdown = Shutdown::new();
    let sync_task = tokio::spawn(config_sync.run(shutdown.subscribe()));

    signals::shutdown_on_signal(&shutdown).await;
    tracing::info!("Shutdown signal received, stopping watcher");

    sync_task.await??;

    tracing::info!(hosts = hosts.len(), "Shutdown complete");
    Ok(())
}
