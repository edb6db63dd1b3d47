//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use rcgen::{BasicConstraints, CertificateParams, IsCa, KeyPair};
use serde_json::{json, Value};

/// Name on the server certificate issued by [`TestPki`].
pub const SERVER_NAME: &str = "nginx.nkl.local";

/// A throwaway PKI: one CA plus the client and server certificates it signed.
pub struct TestPki {
    pub ca_pem: String,
    pub client_cert_pem: String,
    pub client_key_pem: String,
    pub server_cert_der: Vec<u8>,
}

impl TestPki {
    pub fn generate() -> Self {
        let ca_key = KeyPair::generate().unwrap();
        let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let ca = ca_params.self_signed(&ca_key).unwrap();

        let client_key = KeyPair::generate().unwrap();
        let client = CertificateParams::new(vec!["nginx-agent.nkl.local".to_string()])
            .unwrap()
            .signed_by(&client_key, &ca, &ca_key)
            .unwrap();

        let server_key = KeyPair::generate().unwrap();
        let server = CertificateParams::new(vec![SERVER_NAME.to_string()])
            .unwrap()
            .signed_by(&server_key, &ca, &ca_key)
            .unwrap();

        Self {
            ca_pem: ca.pem(),
            client_cert_pem: client.pem(),
            client_key_pem: client_key.serialize_pem(),
            server_cert_der: server.der().to_vec(),
        }
    }
}

/// A private key unrelated to any certificate in [`TestPki`].
pub fn unrelated_key_pem() -> String {
    KeyPair::generate().unwrap().serialize_pem()
}

/// ConfigMap payload carrying `hosts` under the `nginx-hosts` key.
pub fn hosts_payload(hosts: &str) -> Value {
    json!({
        "metadata": { "name": "nginx-hosts", "namespace": "nkl" },
        "data": { "nginx-hosts": hosts }
    })
}

/// ConfigMap payload without the `nginx-hosts` key.
pub fn payload_without_hosts() -> Value {
    json!({
        "metadata": { "name": "nginx-hosts", "namespace": "nkl" },
        "data": { "other": "value" }
    })
}
