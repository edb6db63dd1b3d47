//! TLS trust assembly for connections to the NGINX fleet.
//!
//! # Data Flow
//! ```text
//! trust mode selector ("ss-mtls", ...)
//!     → mode.rs (TrustMode, lenient fallback to no-tls)
//! PEM material (CA, client cert, client key)
//!     → certificates.rs (CertificateBundle, caller owned)
//!     → parsing.rs (trust root, client identity)
//!     → factory.rs (dispatch per trust mode)
//!     → TlsConfiguration
//!     → rustls::ClientConfig for the connection layer
//! ```
//!
//! # Design Decisions
//! - The factory is a pure function: no I/O, no logging, no retries
//! - Every failure names the material that caused it
//! - Self-signed modes trust exactly one CA certificate (no chain building)

pub mod certificates;
pub mod error;
pub mod factory;
pub mod mode;
pub mod parsing;
mod verifier;

pub use certificates::CertificateBundle;
pub use error::{Material, TrustError};
pub use factory::{assemble, assemble_selector, TlsConfiguration, TrustRoots};
pub use mode::TrustMode;
pub use parsing::{build_client_identity, build_trust_root, ClientIdentity};
