//! Settings schema definitions.
//!
//! This module defines the complete settings structure for the service.
//! All types derive Serde traits for deserialization from the settings file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::authentication::{CertificateBundle, TrustError, TrustMode};

/// Root settings, loaded once at startup and never mutated.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// ConfigMap watch settings.
    pub watcher: WatcherSettings,

    /// Trust mode and certificate locations.
    pub tls: TlsSettings,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Which ConfigMaps are watched and how watch failures are retried.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherSettings {
    /// Namespace holding the host ConfigMap.
    pub namespace: String,

    /// Backoff applied when the watch stream fails.
    pub retry: WorkQueueSettings,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            namespace: "nkl".to_string(),
            retry: WorkQueueSettings::default(),
        }
    }
}

/// Rate limiter bounds for a retrying consumer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkQueueSettings {
    /// Name used in logs.
    pub name: String,

    /// Delay after the first failure, in milliseconds.
    pub rate_limiter_base_ms: u64,

    /// Upper bound on the delay, in milliseconds.
    pub rate_limiter_max_ms: u64,
}

impl Default for WorkQueueSettings {
    fn default() -> Self {
        Self {
            name: "nkl-handler".to_string(),
            rate_limiter_base_ms: 2_000,
            rate_limiter_max_ms: 60_000,
        }
    }
}

/// TLS settings for connections to the fleet.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsSettings {
    /// Trust mode selector (`no-tls`, `ca-tls`, `ca-mtls`, `ss-tls`, `ss-mtls`).
    pub mode: String,

    /// Path to the CA certificate (PEM).
    pub ca_cert_path: Option<PathBuf>,

    /// Path to the client certificate (PEM).
    pub client_cert_path: Option<PathBuf>,

    /// Path to the client private key (PEM).
    pub client_key_path: Option<PathBuf>,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            mode: TrustMode::NoTls.as_str().to_string(),
            ca_cert_path: None,
            client_cert_path: None,
            client_key_path: None,
        }
    }
}

impl TlsSettings {
    /// The configured trust mode; unknown selectors fall back to `no-tls`.
    pub fn trust_mode(&self) -> TrustMode {
        match self.mode.parse() {
            Ok(mode) => mode,
            Err(_) => {
                tracing::warn!(
                    mode = %self.mode,
                    "Unrecognized TLS mode, falling back to no-tls (server verification disabled)"
                );
                TrustMode::NoTls
            }
        }
    }

    /// Read the configured certificate files.
    pub fn load_bundle(&self) -> Result<CertificateBundle, TrustError> {
        CertificateBundle::from_files(
            self.ca_cert_path.as_deref(),
            self.client_cert_path.as_deref(),
            self.client_key_path.as_deref(),
        )
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format (`pretty` or `json`).
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
