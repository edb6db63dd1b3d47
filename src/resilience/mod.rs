//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Watch stream error:
//!     → backoff.rs (delay grows with consecutive failures)
//!     → watch source sleeps, or stops early on shutdown
//!     → first successful event resets the failure count
//! ```
//!
//! # Design Decisions
//! - Only the watch adapter retries; the trust factory never does
//! - Jittered backoff keeps a fleet of watchers from relisting in lockstep
//! - Bounds come from the work queue settings, not constants

pub mod backoff;
