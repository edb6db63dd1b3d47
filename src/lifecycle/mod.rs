//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → ConfigSync::run stops the watch loop → run returns
//! ```
//!
//! # Design Decisions
//! - One broadcast signal; every long-running task subscribes
//! - The watch loop is stopped only after ConfigSync stops accepting events

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
