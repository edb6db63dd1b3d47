//! ConfigMap-driven host list synchronization.
//!
//! # Data Flow
//! ```text
//! Kubernetes ConfigMap watch (namespace "nkl")
//!     → kubernetes.rs (watcher events → add/update/delete callbacks)
//!     → source.rs (WatchSource / ResourceEventHandler seam)
//!     → config_sync.rs (interpret payload, read `nginx-hosts`)
//!     → hosts.rs (split on ',' → atomic publish)
//!     → SharedHostList readers (load balancing, fleet updates)
//! ```
//!
//! # Design Decisions
//! - Callbacks run serially on the watch task; readers run anywhere
//! - The host list is swapped whole, never edited in place
//! - A bad event is logged and dropped; it never stops the watch
//! - Delete fails safe to an empty list, a bad update fails open to the old one

pub mod config_sync;
pub mod event;
pub mod hosts;
pub mod kubernetes;
pub mod source;

pub use config_sync::ConfigSync;
pub use event::{ConfigResource, ConfigurationEvent};
pub use hosts::{parse_hosts, SharedHostList, HOSTS_DATA_KEY};
pub use kubernetes::KubeWatchSource;
pub use source::{ChannelWatchSource, EventSender, RegistrationError, ResourceEventHandler, WatchSource};
