//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigSync, watch adapters, settings layer:
//!     → tracing events with structured fields (namespace, count, error)
//!     → logging.rs subscriber (pretty or JSON on stdout)
//! ```
//!
//! # Design Decisions
//! - The trust factory never logs; callers log its errors
//! - Host counts are logged, not host names, at info level

pub mod logging;
