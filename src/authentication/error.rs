//! Trust assembly errors.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The piece of certificate material an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    CaCertificate,
    ClientCertificate,
    ClientKey,
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Material::CaCertificate => "CA certificate",
            Material::ClientCertificate => "client certificate",
            Material::ClientKey => "client private key",
        };
        f.write_str(name)
    }
}

/// Errors produced while turning certificate material into a TLS configuration.
#[derive(Debug, Error)]
pub enum TrustError {
    /// No PEM block of the expected kind was found.
    #[error("failed to decode PEM block containing {material}")]
    InvalidPem { material: Material },

    /// A PEM block was found but does not hold a well-formed certificate.
    #[error("error parsing {material}: {source}")]
    CertificateParse {
        material: Material,
        #[source]
        source: rustls::Error,
    },

    /// The client private key does not belong to the client certificate.
    #[error("client private key does not match the client certificate")]
    KeyPairMismatch,

    /// The client private key could not be loaded as a signing key.
    #[error("error loading client private key: {0}")]
    PrivateKeyParse(#[source] rustls::Error),

    /// The trust mode needs material the bundle does not carry.
    #[error("trust mode requires a {material} but none was supplied")]
    MissingMaterial { material: Material },

    #[error("unknown trust mode `{0}`")]
    UnknownTrustMode(String),

    #[error("failed to read {material} from {}: {source}", path.display())]
    Io {
        material: Material,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build TLS client configuration: {0}")]
    ClientConfig(#[source] rustls::Error),

    /// The trust roots could not back a server certificate verifier.
    #[error("failed to build server certificate verifier: {0}")]
    ServerVerifier(#[source] rustls::client::VerifierBuilderError),
}
