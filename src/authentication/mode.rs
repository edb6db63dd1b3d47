//! Trust mode selection.

use std::fmt;
use std::str::FromStr;

use crate::authentication::error::TrustError;

/// Which certificates are required and whether the peer is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrustMode {
    /// No verification, no client identity.
    #[default]
    NoTls,
    /// Default trust roots.
    CaTls,
    /// Default trust roots plus a client identity.
    CaMtls,
    /// A single self-signed CA as the only trust root.
    SsTls,
    /// A single self-signed CA plus a client identity.
    SsMtls,
}

impl TrustMode {
    pub const ALL: [TrustMode; 5] = [
        TrustMode::NoTls,
        TrustMode::CaTls,
        TrustMode::CaMtls,
        TrustMode::SsTls,
        TrustMode::SsMtls,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TrustMode::NoTls => "no-tls",
            TrustMode::CaTls => "ca-tls",
            TrustMode::CaMtls => "ca-mtls",
            TrustMode::SsTls => "ss-tls",
            TrustMode::SsMtls => "ss-mtls",
        }
    }

    /// Lenient parse: anything unrecognized behaves like `no-tls`.
    ///
    /// Use [`str::parse`] when an unknown selector should be rejected instead.
    pub fn from_selector(selector: &str) -> Self {
        selector.parse().unwrap_or(TrustMode::NoTls)
    }

    /// Whether the mode trusts a caller-supplied CA instead of the default roots.
    pub const fn requires_ca(&self) -> bool {
        matches!(self, TrustMode::SsTls | TrustMode::SsMtls)
    }

    /// Whether the mode presents a client certificate.
    pub const fn requires_client_identity(&self) -> bool {
        matches!(self, TrustMode::CaMtls | TrustMode::SsMtls)
    }
}

impl FromStr for TrustMode {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrustMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| TrustError::UnknownTrustMode(s.to_string()))
    }
}

impl fmt::Display for TrustMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
