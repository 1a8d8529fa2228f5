//! Error types for OCSP lookup and trust-evaluation operations

use thiserror::Error;

/// The stage of request construction that failed, attached to
/// [`OcspError::ConstructingRequestFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    X509Decode,
    CertId,
    Alloc,
    Serialize,
}

impl std::fmt::Display for RequestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStage::X509Decode => "x509 decode",
            RequestStage::CertId => "cert id",
            RequestStage::Alloc => "request alloc",
            RequestStage::Serialize => "serialize",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone)]
pub enum OcspError {
    #[error("invalid trust object: {reason}")]
    InvalidTrustObject { reason: String },

    #[error("failed to construct OCSP request at {stage}: {detail}")]
    ConstructingRequestFailed { stage: RequestStage, detail: String },

    #[error("certificate carries no OCSP responder URLs")]
    NoOcspUrls,

    #[error("OCSP request to {url} failed: {detail}")]
    RequestFailed { url: String, detail: String },

    #[error("invalid OCSP response data: {detail}")]
    InvalidResponseData { detail: String },

    #[error("no OCSP responder returned a successful response (attempts: {})", .attempts.join("; "))]
    NoSuccessfulResponse { attempts: Vec<String> },

    #[error("OCSP lookup timed out")]
    LookupTimedOut,

    #[error("unknown OCSP error: {detail}")]
    Unknown { detail: String },
}

impl From<reqwest::Error> for OcspError {
    fn from(err: reqwest::Error) -> Self {
        OcspError::RequestFailed {
            url: err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string()),
            detail: err.to_string(),
        }
    }
}

impl OcspError {
    /// Codec/AIA failures that retrying a different URL cannot fix.
    pub fn is_terminal_for_lookup(&self) -> bool {
        matches!(
            self,
            OcspError::InvalidTrustObject { .. }
                | OcspError::ConstructingRequestFailed { .. }
                | OcspError::NoOcspUrls
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, OcspError::LookupTimedOut)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, OcspError::RequestFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, OcspError>;
