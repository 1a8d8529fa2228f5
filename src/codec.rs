//! DER encoding of OCSP requests and parsing of OCSP responses.

use crate::cert::{Certificate, IssuerCertificate};
use crate::error::{OcspError, RequestStage, Result};
use chrono::{DateTime, Utc};
use der::asn1::{ObjectIdentifier, OctetString};
use der::{Decode, Encode};
use ring::digest;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::AlgorithmIdentifierOwned;
use x509_ocsp::{
    BasicOcspResponse, CertId, CertStatus, OcspRequest, OcspResponse as RawOcspResponse,
    OcspResponseStatus, Request, TbsRequest,
};

/// SHA-1 OID (1.3.14.3.2.26). OCSP's CertID hash algorithm is fixed by the
/// protocol; this is not a security-relevant choice made here.
const SHA1_OID: &str = "1.3.14.3.2.26";
const ID_PKIX_OCSP_BASIC: &str = "1.3.6.1.5.5.7.48.1.1";

fn alloc_err(detail: impl ToString) -> OcspError {
    OcspError::ConstructingRequestFailed {
        stage: RequestStage::Alloc,
        detail: detail.to_string(),
    }
}

/// Build a one-entry DER-encoded `OCSPRequest` (RFC 6960 §4.1) for `leaf`,
/// identified against `issuer`. No nonce, no signature.
pub fn build_request(leaf: &Certificate, issuer: &IssuerCertificate) -> Result<Vec<u8>> {
    let leaf_parsed = leaf.parse()?;
    let issuer_parsed = issuer.parse()?;

    let issuer_name_hash = {
        let hash = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, issuer_parsed.subject().as_raw());
        OctetString::new(hash.as_ref()).map_err(alloc_err)?
    };

    let issuer_key_hash = {
        let ski = extract_subject_key_identifier(&issuer_parsed)?;
        OctetString::new(ski).map_err(alloc_err)?
    };

    let hash_algorithm = AlgorithmIdentifierOwned {
        oid: ObjectIdentifier::new(SHA1_OID).map_err(alloc_err)?,
        parameters: None,
    };

    let serial = SerialNumber::new(&leaf_parsed.serial.to_bytes_be()).map_err(alloc_err)?;

    let cert_id = CertId {
        hash_algorithm,
        issuer_name_hash,
        issuer_key_hash,
        serial_number: serial,
    };

    let request = Request {
        req_cert: cert_id,
        single_request_extensions: None,
    };

    let tbs_request = TbsRequest {
        version: x509_ocsp::Version::V1,
        requestor_name: None,
        request_list: vec![request],
        request_extensions: None,
    };

    let ocsp_request = OcspRequest {
        tbs_request,
        optional_signature: None,
    };

    ocsp_request
        .to_der()
        .map_err(|e| OcspError::ConstructingRequestFailed {
            stage: RequestStage::Serialize,
            detail: e.to_string(),
        })
}

fn extract_subject_key_identifier(
    issuer: &x509_parser::certificate::X509Certificate<'_>,
) -> Result<Vec<u8>> {
    use x509_parser::extensions::ParsedExtension;
    use x509_parser::oid_registry::Oid;

    let ski_oid = Oid::from(&[2, 5, 29, 14]).expect("static OID is well-formed");
    let ski_ext = issuer
        .get_extension_unique(&ski_oid)
        .ok()
        .flatten()
        .ok_or_else(|| alloc_err("issuer certificate has no Subject Key Identifier extension"))?;

    if let ParsedExtension::SubjectKeyIdentifier(ski) = ski_ext.parsed_extension() {
        Ok(ski.0.to_vec())
    } else {
        Err(alloc_err("Subject Key Identifier extension did not parse"))
    }
}

/// Raw response status codes from RFC 6960 §4.2.1, typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Successful,
    MalformedRequest,
    InternalError,
    TryLater,
    SigRequired,
    Unauthorized,
}

impl From<OcspResponseStatus> for ResponseStatus {
    fn from(raw: OcspResponseStatus) -> Self {
        match raw {
            OcspResponseStatus::Successful => ResponseStatus::Successful,
            OcspResponseStatus::MalformedRequest => ResponseStatus::MalformedRequest,
            OcspResponseStatus::InternalError => ResponseStatus::InternalError,
            OcspResponseStatus::TryLater => ResponseStatus::TryLater,
            OcspResponseStatus::SigRequired => ResponseStatus::SigRequired,
            OcspResponseStatus::Unauthorized => ResponseStatus::Unauthorized,
        }
    }
}

/// Per-certificate status and validity window within a parsed response.
#[derive(Debug, Clone)]
pub struct SingleResponse {
    pub status: CertStatusKind,
    pub this_update: DateTime<Utc>,
    pub next_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStatusKind {
    Good,
    Revoked,
    Unknown,
}

/// A parsed OCSP response. Construct with [`parse_response`].
pub struct Response {
    status: ResponseStatus,
    singles: Vec<SingleResponse>,
}

impl Response {
    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn successful(&self) -> bool {
        self.status == ResponseStatus::Successful
    }

    pub fn single_responses(&self) -> &[SingleResponse] {
        &self.singles
    }

    /// Whether any contained single response has expired as of `now`.
    pub fn has_expired_response(&self, now: DateTime<Utc>) -> bool {
        self.singles
            .iter()
            .any(|s| expired(s.next_update, now))
    }

    /// `true` iff successful and nothing inside it has expired.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.successful() && !self.has_expired_response(now)
    }
}

/// A [`SingleResponse`] is expired iff it names a `nextUpdate` that has
/// already passed. Absent `nextUpdate`, it never expires here — the
/// platform enforces freshness independently.
fn expired(next_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    next_update.is_some_and(|nu| nu <= now)
}

/// Parse raw bytes into an `OCSPResponse` and extract its statuses.
pub fn parse_response(bytes: &[u8]) -> Result<Response> {
    let raw = RawOcspResponse::from_der(bytes).map_err(|e| OcspError::InvalidResponseData {
        detail: e.to_string(),
    })?;

    let status = ResponseStatus::from(raw.response_status);

    if status != ResponseStatus::Successful {
        return Ok(Response {
            status,
            singles: Vec::new(),
        });
    }

    let response_bytes = raw.response_bytes.ok_or_else(|| OcspError::InvalidResponseData {
        detail: "successful response carried no responseBytes".to_string(),
    })?;

    if response_bytes.response_type.to_string() != ID_PKIX_OCSP_BASIC {
        return Err(OcspError::InvalidResponseData {
            detail: format!(
                "unsupported OCSP response type: {}",
                response_bytes.response_type
            ),
        });
    }

    let basic = BasicOcspResponse::from_der(response_bytes.response.as_bytes()).map_err(|e| {
        OcspError::InvalidResponseData {
            detail: e.to_string(),
        }
    })?;

    let mut singles = Vec::with_capacity(basic.tbs_response_data.responses.len());
    for single in &basic.tbs_response_data.responses {
        let kind = match &single.cert_status {
            CertStatus::Good(_) => CertStatusKind::Good,
            CertStatus::Revoked(_) => CertStatusKind::Revoked,
            CertStatus::Unknown(_) => CertStatusKind::Unknown,
        };

        let this_update = generalized_time_to_utc(&single.this_update)?;
        let next_update = single
            .next_update
            .as_ref()
            .map(generalized_time_to_utc)
            .transpose()?;

        singles.push(SingleResponse {
            status: kind,
            this_update,
            next_update,
        });
    }

    Ok(Response { status, singles })
}

fn generalized_time_to_utc(time: &der::asn1::GeneralizedTime) -> Result<DateTime<Utc>> {
    let unix_duration = time.to_date_time().unix_duration();
    let system_time = std::time::UNIX_EPOCH + unix_duration;
    Ok(DateTime::<Utc>::from(system_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_conversion_roundtrips() {
        assert_eq!(
            ResponseStatus::from(OcspResponseStatus::Successful),
            ResponseStatus::Successful
        );
        assert_eq!(
            ResponseStatus::from(OcspResponseStatus::TryLater),
            ResponseStatus::TryLater
        );
    }

    #[test]
    fn unsuccessful_status_parses_without_responses() {
        let response = RawOcspResponse {
            response_status: OcspResponseStatus::TryLater,
            response_bytes: None,
        };
        let encoded = response.to_der().unwrap();
        let parsed = parse_response(&encoded).unwrap();
        assert!(!parsed.successful());
        assert!(parsed.single_responses().is_empty());
    }

    #[test]
    fn successful_status_without_response_bytes_is_invalid() {
        let response = RawOcspResponse {
            response_status: OcspResponseStatus::Successful,
            response_bytes: None,
        };
        let encoded = response.to_der().unwrap();
        assert!(parse_response(&encoded).is_err());
    }
}
