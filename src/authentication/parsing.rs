//! PEM parsing primitives: CA trust roots and client key pairs.

use std::sync::Arc;

use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use rustls::{CertificateError, InconsistentKeys, RootCertStore};
use rustls_pemfile::Item;

use crate::authentication::error::{Material, TrustError};

/// A certificate chain paired with the private key that signs for it.
#[derive(Debug)]
pub struct ClientIdentity {
    chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl ClientIdentity {
    /// Certificate chain, leaf first.
    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.chain
    }

    /// Private key for the leaf certificate.
    pub fn key(&self) -> &PrivateKeyDer<'static> {
        &self.key
    }
}

impl Clone for ClientIdentity {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            key: self.key.clone_key(),
        }
    }
}

pub(crate) fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Build a root store holding exactly the first PEM block in `ca_pem`.
///
/// That block must be a certificate. Later blocks are ignored.
pub fn build_trust_root(ca_pem: &[u8]) -> Result<RootCertStore, TrustError> {
    let certificate = first_certificate(ca_pem, Material::CaCertificate)?;

    let mut roots = RootCertStore::empty();
    roots
        .add(certificate)
        .map_err(|source| TrustError::CertificateParse {
            material: Material::CaCertificate,
            source,
        })?;

    Ok(roots)
}

/// Pair a client certificate chain with its private key.
///
/// The key must match the public key of the first certificate in the chain.
pub fn build_client_identity(cert_pem: &[u8], key_pem: &[u8]) -> Result<ClientIdentity, TrustError> {
    let chain = certificate_chain(cert_pem)?;
    let key = private_key(key_pem)?;

    let signing_key = crypto_provider()
        .key_provider
        .load_private_key(key.clone_key())
        .map_err(TrustError::PrivateKeyParse)?;

    match CertifiedKey::new(chain.clone(), signing_key).keys_match() {
        // Unknown: the key type cannot expose its public half, nothing to compare.
        Ok(()) | Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => {}
        Err(rustls::Error::InconsistentKeys(_)) => return Err(TrustError::KeyPairMismatch),
        Err(source) => {
            return Err(TrustError::CertificateParse {
                material: Material::ClientCertificate,
                source,
            })
        }
    }

    Ok(ClientIdentity { chain, key })
}

fn first_certificate(pem: &[u8], material: Material) -> Result<CertificateDer<'static>, TrustError> {
    let mut reader = pem;
    let first = rustls_pemfile::read_one(&mut reader);
    match first {
        Ok(Some(Item::X509Certificate(certificate))) => Ok(certificate),
        // A block is present but it is not a certificate.
        Ok(Some(_)) => Err(TrustError::CertificateParse {
            material,
            source: rustls::Error::InvalidCertificate(CertificateError::BadEncoding),
        }),
        Ok(None) | Err(_) => Err(TrustError::InvalidPem { material }),
    }
}

fn certificate_chain(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, TrustError> {
    let invalid = || TrustError::InvalidPem {
        material: Material::ClientCertificate,
    };

    let mut reader = pem;
    let chain = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    if chain.is_empty() {
        return Err(invalid());
    }
    Ok(chain)
}

fn private_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, TrustError> {
    let mut reader = pem;
    rustls_pemfile::private_key(&mut reader)
        .ok()
        .flatten()
        .ok_or(TrustError::InvalidPem {
            material: Material::ClientKey,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{CertificateParams, KeyPair};

    fn self_signed() -> (String, String) {
        let key = KeyPair::generate().unwrap();
        let cert = CertificateParams::new(vec!["nginx.nkl.local".to_string()])
            .unwrap()
            .self_signed(&key)
            .unwrap();
        (cert.pem(), key.serialize_pem())
    }

    #[test]
    fn test_trust_root_holds_one_certificate() {
        let (cert, _) = self_signed();
        let roots = build_trust_root(cert.as_bytes()).unwrap();
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_trust_root_uses_first_block_only() {
        let (first, _) = self_signed();
        let (second, _) = self_signed();
        let pem = format!("{first}{second}");

        let roots = build_trust_root(pem.as_bytes()).unwrap();
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_trust_root_without_pem_block() {
        let err = build_trust_root(b"not a certificate").unwrap_err();
        assert!(matches!(
            err,
            TrustError::InvalidPem {
                material: Material::CaCertificate
            }
        ));

        let err = build_trust_root(b"").unwrap_err();
        assert!(matches!(err, TrustError::InvalidPem { .. }));
    }

    #[test]
    fn test_trust_root_with_garbage_certificate() {
        let pem = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        let err = build_trust_root(pem.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TrustError::CertificateParse {
                material: Material::CaCertificate,
                ..
            }
        ));
    }

    #[test]
    fn test_trust_root_rejects_key_block() {
        let (_, key) = self_signed();
        let err = build_trust_root(key.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TrustError::CertificateParse {
                material: Material::CaCertificate,
                ..
            }
        ));
    }

    #[test]
    fn test_trust_root_rejects_key_before_certificate() {
        let (cert, key) = self_signed();
        let pem = format!("{key}{cert}");

        let err = build_trust_root(pem.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TrustError::CertificateParse {
                material: Material::CaCertificate,
                ..
            }
        ));
    }

    #[test]
    fn test_client_identity_matching_pair() {
        let (cert, key) = self_signed();
        let identity = build_client_identity(cert.as_bytes(), key.as_bytes()).unwrap();
        assert_eq!(identity.chain().len(), 1);

        let cloned = identity.clone();
        assert_eq!(cloned.chain(), identity.chain());
    }

    #[test]
    fn test_client_identity_mismatched_pair() {
        let (cert, _) = self_signed();
        let (_, other_key) = self_signed();

        let err = build_client_identity(cert.as_bytes(), other_key.as_bytes()).unwrap_err();
        assert!(matches!(err, TrustError::KeyPairMismatch));
    }

    #[test]
    fn test_client_identity_missing_blocks() {
        let (cert, key) = self_signed();

        let err = build_client_identity(b"", key.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TrustError::InvalidPem {
                material: Material::ClientCertificate
            }
        ));

        let err = build_client_identity(cert.as_bytes(), cert.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TrustError::InvalidPem {
                material: Material::ClientKey
            }
        ));
    }
}
