//! Settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → watcher settings → ConfigSync / KubeWatchSource
//!     → tls settings → CertificateBundle + TrustMode → trust factory
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; live state lives in ConfigSync
//! - All fields have defaults so the file can be omitted entirely
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, ConfigError};
pub use schema::{ObservabilityConfig, Settings, TlsSettings, WatcherSettings, WorkQueueSettings};
pub use validation::ValidationError;
