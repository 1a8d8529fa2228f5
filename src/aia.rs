//! Authority Information Access extraction: find OCSP responder URLs.

use crate::cert::Certificate;
use crate::error::{OcspError, Result};
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::oid_registry::Oid;

/// AIA extension OID: 1.3.6.1.5.5.7.1.1
fn aia_oid() -> Oid<'static> {
    Oid::from(&[1, 3, 6, 1, 5, 5, 7, 1, 1]).expect("static OID is well-formed")
}

/// OCSP access method OID: 1.3.6.1.5.5.7.48.1
fn ocsp_access_method_oid() -> Oid<'static> {
    Oid::from(&[1, 3, 6, 1, 5, 5, 7, 48, 1]).expect("static OID is well-formed")
}

/// Collect every OCSP responder URL named in `cert`'s AIA extension, in
/// the order the extension lists them. AIA entries whose access method
/// isn't OCSP, or whose location isn't a URI, are skipped without
/// complaint — a well-formed certificate may legitimately carry other
/// kinds of AIA entries (e.g. `caIssuers`).
pub fn ocsp_urls(cert: &Certificate) -> Result<Vec<String>> {
    let parsed = cert.parse()?;

    let aia_ext = parsed
        .get_extension_unique(&aia_oid())
        .ok()
        .flatten()
        .ok_or(OcspError::NoOcspUrls)?;

    let mut urls = Vec::new();
    if let ParsedExtension::AuthorityInfoAccess(aia) = aia_ext.parsed_extension() {
        let ocsp_oid = ocsp_access_method_oid();
        for access_desc in &aia.accessdescs {
            if access_desc.access_method == ocsp_oid {
                if let GeneralName::URI(uri) = &access_desc.access_location {
                    urls.push(uri.to_string());
                }
            }
        }
    }

    if urls.is_empty() {
        return Err(OcspError::NoOcspUrls);
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_aia_is_no_ocsp_urls() {
        let cert = Certificate::from_der(vec![0x30, 0x00]);
        let result = ocsp_urls(&cert);
        assert!(result.is_err());
    }
}
