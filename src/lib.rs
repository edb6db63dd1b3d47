//! NGINX fleet configuration sync.
//!
//! Keeps the NGINX host list in step with a Kubernetes ConfigMap and builds
//! the TLS client configuration used to reach those hosts.

pub mod authentication;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod sync;

pub use authentication::{assemble, CertificateBundle, TlsConfiguration, TrustError, TrustMode};
pub use config::Settings;
pub use lifecycle::Shutdown;
pub use sync::{ConfigSync, SharedHostList};
