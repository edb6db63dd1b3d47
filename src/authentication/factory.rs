//! Trust mode dispatch.
//!
//! | mode      | roots            | client identity | skip verify |
//! |-----------|------------------|-----------------|-------------|
//! | `no-tls`  | none             | no              | yes         |
//! | `ca-tls`  | default          | no              | no          |
//! | `ca-mtls` | default          | yes             | no          |
//! | `ss-tls`  | supplied CA only | no              | no          |
//! | `ss-mtls` | supplied CA only | yes             | no          |

use std::sync::Arc;

use rustls::client::WebPkiServerVerifier;
use rustls::{ClientConfig, RootCertStore};

use crate::authentication::certificates::CertificateBundle;
use crate::authentication::error::{Material, TrustError};
use crate::authentication::mode::TrustMode;
use crate::authentication::parsing::{
    build_client_identity, build_trust_root, crypto_provider, ClientIdentity,
};
use crate::authentication::verifier::SkipServerVerification;

/// Where server certificates are anchored.
#[derive(Debug, Clone)]
pub enum TrustRoots {
    /// Empty root store. Only meaningful with verification skipped.
    None,
    /// The bundled public web PKI roots.
    Default,
    /// Exactly the roots supplied by the caller.
    Custom(RootCertStore),
}

/// The assembled TLS client settings for one trust mode.
#[derive(Debug, Clone)]
pub struct TlsConfiguration {
    roots: TrustRoots,
    identity: Option<ClientIdentity>,
    skip_verification: bool,
}

impl TlsConfiguration {
    fn insecure() -> Self {
        Self {
            roots: TrustRoots::None,
            identity: None,
            skip_verification: true,
        }
    }

    fn verified(roots: TrustRoots, identity: Option<ClientIdentity>) -> Self {
        Self {
            roots,
            identity,
            skip_verification: false,
        }
    }

    /// Where server certificates are anchored.
    pub fn roots(&self) -> &TrustRoots {
        &self.roots
    }

    /// The certificate presented to servers, if the mode has one.
    pub fn client_identity(&self) -> Option<&ClientIdentity> {
        self.identity.as_ref()
    }

    /// Whether server certificates are accepted unchecked.
    pub fn skip_verification(&self) -> bool {
        self.skip_verification
    }

    /// Render the configuration as a rustls client config.
    pub fn client_config(&self) -> Result<ClientConfig, TrustError> {
        let provider = crypto_provider();
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(TrustError::ClientConfig)?;

        let builder = match self.server_verifier()? {
            Some(verifier) => builder.with_webpki_verifier(verifier),
            None => builder
                .dangerous()
                .with_custom_certificate_verifier(SkipServerVerification::new(provider)),
        };

        match &self.identity {
            Some(identity) => builder
                .with_client_auth_cert(identity.chain().to_vec(), identity.key().clone_key())
                .map_err(TrustError::ClientConfig),
            None => Ok(builder.with_no_client_auth()),
        }
    }

    /// The verifier server certificates are checked against.
    ///
    /// `None` when verification is skipped.
    pub fn server_verifier(&self) -> Result<Option<Arc<WebPkiServerVerifier>>, TrustError> {
        if self.skip_verification {
            return Ok(None);
        }
        WebPkiServerVerifier::builder_with_provider(self.root_store(), crypto_provider())
            .build()
            .map(Some)
            .map_err(TrustError::ServerVerifier)
    }

    fn root_store(&self) -> Arc<RootCertStore> {
        let store = match &self.roots {
            TrustRoots::None => RootCertStore::empty(),
            TrustRoots::Default => webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect(),
            TrustRoots::Custom(store) => store.clone(),
        };
        Arc::new(store)
    }
}

/// Build the TLS configuration `mode` calls for from `bundle`.
pub fn assemble(mode: TrustMode, bundle: &CertificateBundle) -> Result<TlsConfiguration, TrustError> {
    match mode {
        TrustMode::NoTls => Ok(TlsConfiguration::insecure()),
        TrustMode::CaTls => Ok(TlsConfiguration::verified(TrustRoots::Default, None)),
        TrustMode::CaMtls => {
            let identity = client_identity(bundle)?;
            Ok(TlsConfiguration::verified(TrustRoots::Default, Some(identity)))
        }
        TrustMode::SsTls => {
            let roots = custom_roots(bundle)?;
            Ok(TlsConfiguration::verified(roots, None))
        }
        TrustMode::SsMtls => {
            let roots = custom_roots(bundle)?;
            let identity = client_identity(bundle)?;
            Ok(TlsConfiguration::verified(roots, Some(identity)))
        }
    }
}

/// [`assemble`] for a raw selector string; unknown selectors act as `no-tls`.
pub fn assemble_selector(
    selector: &str,
    bundle: &CertificateBundle,
) -> Result<TlsConfiguration, TrustError> {
    assemble(TrustMode::from_selector(selector), bundle)
}

fn custom_roots(bundle: &CertificateBundle) -> Result<TrustRoots, TrustError> {
    let ca = required(bundle.ca_certificate(), Material::CaCertificate)?;
    build_trust_root(ca).map(TrustRoots::Custom)
}

fn client_identity(bundle: &CertificateBundle) -> Result<ClientIdentity, TrustError> {
    let cert = required(bundle.client_certificate(), Material::ClientCertificate)?;
    let key = required(bundle.client_key(), Material::ClientKey)?;
    build_client_identity(cert, key)
}

fn required(pem: Option<&[u8]>, material: Material) -> Result<&[u8], TrustError> {
    pem.ok_or(TrustError::MissingMaterial { material })
}
