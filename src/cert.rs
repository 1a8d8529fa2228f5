//! Certificate handles: DER bytes plus derived fingerprint and parsed view.

use crate::error::{OcspError, Result};
use ring::digest;
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

/// An owned X.509 certificate, identified by its DER bytes.
///
/// The platform hands these to us as opaque handles; we keep the raw DER
/// around so the fingerprint and any extracted fields are reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
}

/// Positionally distinct from [`Certificate`] only in that it signed the
/// leaf; structurally identical.
pub type IssuerCertificate = Certificate;

/// Hex-encoded SHA-256 over a certificate's DER bytes; the cache key.
pub type Fingerprint = String;

impl Certificate {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Self {
        Self { der: der.into() }
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Lowercase hex SHA-256 over the DER bytes.
    pub fn fingerprint(&self) -> Fingerprint {
        let hash = digest::digest(&digest::SHA256, &self.der);
        hex::encode(hash.as_ref())
    }

    /// Parse the DER bytes into a borrowed `x509_parser` view.
    pub fn parse(&self) -> Result<X509Certificate<'_>> {
        let (_, cert) = X509Certificate::from_der(&self.der).map_err(|e| {
            OcspError::ConstructingRequestFailed {
                stage: crate::error::RequestStage::X509Decode,
                detail: e.to_string(),
            }
        })?;
        Ok(cert)
    }
}

/// Minimal hex encoding so we don't pull in an extra dependency beyond
/// what `base64` already covers for the persistence layer.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        use std::fmt::Write;
        let mut out = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            write!(out, "{:02x}", b).expect("writing to a String cannot fail");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        let cert = Certificate::from_der(vec![1, 2, 3, 4]);
        assert_eq!(cert.fingerprint(), cert.fingerprint());
        assert_eq!(cert.fingerprint().len(), 64);
    }

    #[test]
    fn fingerprint_differs_by_content() {
        let a = Certificate::from_der(vec![1, 2, 3]);
        let b = Certificate::from_der(vec![1, 2, 4]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
