//! Leaf/issuer extraction from a platform trust chain, and the
//! staple → cache → CRL dispatch that decides whether to trust it.

use crate::cache::OcspCache;
use crate::cert::Certificate;
use crate::config::{EvaluateOverrides, LookupOptions, OrchestratorConfig};
use crate::error::{OcspError, Result};
use std::sync::Arc;
use tracing::{debug, trace};

/// Policy the orchestrator installs on a trust object before asking it to
/// re-evaluate.
#[derive(Debug, Clone, Default)]
pub struct OcspPolicy {
    pub require_positive_response: bool,
    pub network_enabled: bool,
    /// A response to attach as if it had been stapled by the server.
    pub staple: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CrlPolicy {
    pub require_positive_response: bool,
    pub network_enabled: bool,
}

/// The platform's trust-evaluation primitive, treated as an external
/// oracle: given a chain and a set of installed policies, it decides
/// whether the chain is trusted. Implementors adapt a real platform
/// verifier (Security.framework, a TLS stack's own verifier, ...) to
/// this contract.
pub trait PlatformTrust {
    fn chain(&self) -> &[Certificate];
    fn has_staple(&self) -> bool;
    fn set_ocsp_policy(&mut self, policy: OcspPolicy);
    fn set_crl_policy(&mut self, policy: CrlPolicy);
    /// Re-evaluate under the currently installed policies. May block
    /// briefly; the source performs this synchronously too.
    fn evaluate(&mut self) -> bool;
}

/// Extract the leaf and issuer certificates from a trust object's
/// evaluated chain. Refuses a single-certificate chain outright: this
/// core never special-cases self-signed roots.
pub fn leaf_and_issuer<T: PlatformTrust>(trust: &T) -> Result<(Certificate, Certificate)> {
    let chain = trust.chain();
    let leaf = chain
        .first()
        .cloned()
        .ok_or_else(|| OcspError::InvalidTrustObject {
            reason: "trust chain has no leaf certificate".to_string(),
        })?;
    let issuer = chain
        .get(1)
        .cloned()
        .ok_or_else(|| OcspError::InvalidTrustObject {
            reason: "trust chain has no issuer certificate".to_string(),
        })?;
    Ok((leaf, issuer))
}

/// What the embedding TLS stack should do with the authentication
/// challenge once the orchestrator has decided.
pub enum AuthDisposition {
    PerformDefaultHandling,
    UseCredential,
    CancelAuthenticationChallenge,
}

pub struct TrustOrchestrator {
    cache: Arc<OcspCache>,
    config: OrchestratorConfig,
}

impl TrustOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            cache: config.cache_handle(),
            config,
        }
    }

    /// Run the five-strategy dispatch and invoke `completion` with the
    /// resulting disposition. Returns the same boolean `completion`
    /// receives encoded as a disposition, for callers that just want the
    /// verdict.
    pub async fn evaluate<T: PlatformTrust>(
        &self,
        trust: &mut T,
        overrides: Option<EvaluateOverrides>,
        completion: impl FnOnce(AuthDisposition) + Send,
    ) -> bool {
        let trusted = self.evaluate_inner(trust, overrides).await;

        let disposition = if trusted {
            AuthDisposition::UseCredential
        } else {
            AuthDisposition::PerformDefaultHandling
        };
        completion(disposition);
        trusted
    }

    async fn evaluate_inner<T: PlatformTrust>(
        &self,
        trust: &mut T,
        overrides: Option<EvaluateOverrides>,
    ) -> bool {
        // 1. Staple: require a positive response, no network, rely on
        // whatever staple the platform already holds.
        trust.set_ocsp_policy(OcspPolicy {
            require_positive_response: true,
            network_enabled: false,
            staple: None,
        });
        if trust.has_staple() && trust.evaluate() {
            trace!("trusted via stapled OCSP response");
            return true;
        }

        // 2. Cache / remote OCSP.
        if let Ok((leaf, issuer)) = leaf_and_issuer(trust) {
            let options = self.lookup_options(&overrides);
            match self.cache.lookup(&leaf, &issuer, &options).await {
                Ok(lookup) => {
                    debug!(cached = lookup.cached, "attaching fetched OCSP response");
                    trust.set_ocsp_policy(OcspPolicy {
                        require_positive_response: true,
                        network_enabled: false,
                        staple: Some((*lookup.response).clone()),
                    });
                    if trust.evaluate() {
                        trace!("trusted via cache/remote OCSP");
                        return true;
                    }
                }
                Err(e) => {
                    if let Some(logger) = &self.config.logger {
                        logger(&format!("OCSP lookup failed: {e}"));
                    }
                }
            }
        } else if let Some(logger) = &self.config.logger {
            logger("trust object did not yield a leaf/issuer pair");
        }

        // 3. CRL, requiring a positive response, network enabled.
        trust.set_crl_policy(CrlPolicy {
            require_positive_response: true,
            network_enabled: true,
        });
        if trust.evaluate() {
            trace!("trusted via CRL (positive response required)");
            return true;
        }

        // 4. CRL, network enabled, no positive-response requirement.
        trust.set_crl_policy(CrlPolicy {
            require_positive_response: false,
            network_enabled: true,
        });
        if trust.evaluate() {
            trace!("trusted via CRL (network only)");
            return true;
        }

        // 5. Default: untrusted.
        false
    }

    fn lookup_options(&self, overrides: &Option<EvaluateOverrides>) -> LookupOptions {
        let url_rewriter = overrides
            .as_ref()
            .and_then(|o| o.url_rewriter.clone())
            .or_else(|| self.config.default_url_rewriter.clone());
        let transport = overrides
            .as_ref()
            .and_then(|o| o.transport.clone())
            .unwrap_or_else(|| self.config.default_transport.clone());

        LookupOptions {
            timeout: self.config.timeout,
            url_rewriter,
            transport: Some(transport),
            logger: self.config.logger.clone(),
        }
    }
}
