//! HTTP transport for OCSP requests: caller-injectable POST, plus the
//! sequential fan-out across a list of responder URLs.

use crate::codec::{self, Response};
use crate::error::{OcspError, Result};
use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A caller-injectable HTTP POST, so this crate never leaks plaintext
/// OCSP traffic outside whatever transport (proxy-aware or otherwise)
/// the embedding application wires up.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, body: Vec<u8>) -> std::result::Result<Vec<u8>, String>;
}

/// Default transport backed by `reqwest`, built the way the rest of this
/// crate's HTTP-facing code builds its client: no proxy by default, a
/// configurable timeout, nothing clever.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OcspError::from)?;
        Ok(Self { client })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(10)).expect("default reqwest client builds")
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, url: &str, body: Vec<u8>) -> std::result::Result<Vec<u8>, String> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/ocsp-request")
            .body(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP status {}", response.status()));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| e.to_string())
    }
}

/// Build the RFC 6960 Appendix A.1.1 GET-form request URL: the base64url
/// encoding of the DER request body appended to the responder's base URL.
/// Not used by the orchestrator's own pipeline (which always POSTs); kept
/// for callers who need GET-form OCSP for parity with the wider protocol.
pub fn get_request_url(base_url: &str, body: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(body);
    format!("{}/{}", base_url.trim_end_matches('/'), encoded)
}

/// The raw bytes alongside their parsed form — the cache stores the raw
/// DER, while callers generally want the parsed view.
pub struct RawResponse {
    pub bytes: Vec<u8>,
    pub response: Response,
}

/// Perform a single OCSP POST and parse the result.
pub async fn single_request(
    url: &str,
    body: Vec<u8>,
    transport: &dyn Transport,
) -> Result<RawResponse> {
    debug!(%url, "posting OCSP request");
    let bytes = transport
        .post(url, body)
        .await
        .map_err(|detail| OcspError::RequestFailed {
            url: url.to_string(),
            detail,
        })?;

    trace!(%url, bytes = bytes.len(), "received OCSP response body");
    let response = codec::parse_response(&bytes)?;
    Ok(RawResponse { bytes, response })
}

/// Attempt each URL in order; return the first response whose status is
/// `successful`. If every URL fails or returns a non-successful status,
/// return `NoSuccessfulResponse` carrying one diagnostic line per attempt.
pub async fn first_successful(
    urls: &[String],
    body: Vec<u8>,
    transport: Arc<dyn Transport>,
) -> Result<RawResponse> {
    let mut attempts = Vec::with_capacity(urls.len());

    for url in urls {
        match single_request(url, body.clone(), transport.as_ref()).await {
            Ok(raw) if raw.response.successful() => return Ok(raw),
            Ok(raw) => {
                attempts.push(format!(
                    "{url}: responder status {:?}",
                    raw.response.status()
                ));
            }
            Err(err) => {
                warn!(%url, error = %err, "OCSP attempt failed");
                attempts.push(format!("{url}: {err}"));
            }
        }
    }

    Err(OcspError::NoSuccessfulResponse { attempts })
}
