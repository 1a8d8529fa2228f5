//! End-to-end dispatch tests for `TrustOrchestrator`: staple short-circuit,
//! cache/remote-OCSP failure falling through to CRL strategies, and the
//! final untrusted default.

use ocsp_privacy_cache::cache::OcspCache;
use ocsp_privacy_cache::cert::Certificate;
use ocsp_privacy_cache::config::OrchestratorConfig;
use ocsp_privacy_cache::transport::ReqwestTransport;
use ocsp_privacy_cache::trust::{AuthDisposition, CrlPolicy, OcspPolicy, PlatformTrust, TrustOrchestrator};
use std::sync::Arc;

/// A trust double whose `evaluate()` verdict is scripted per call, in the
/// order the five strategies invoke it.
struct ScriptedTrust {
    chain: Vec<Certificate>,
    staple: bool,
    verdicts: Vec<bool>,
    calls: usize,
}

impl PlatformTrust for ScriptedTrust {
    fn chain(&self) -> &[Certificate] {
        &self.chain
    }
    fn has_staple(&self) -> bool {
        self.staple
    }
    fn set_ocsp_policy(&mut self, _policy: OcspPolicy) {}
    fn set_crl_policy(&mut self, _policy: CrlPolicy) {}
    fn evaluate(&mut self) -> bool {
        let verdict = self.verdicts.get(self.calls).copied().unwrap_or(false);
        self.calls += 1;
        verdict
    }
}

fn new_orchestrator() -> TrustOrchestrator {
    let cache = Arc::new(OcspCache::new(Arc::new(ReqwestTransport::default())));
    let config = OrchestratorConfig::builder().cache(cache).build();
    TrustOrchestrator::new(config)
}

#[tokio::test]
async fn falls_through_to_crl_when_no_staple_and_no_aia() {
    let orchestrator = new_orchestrator();

    // No leaf/issuer split possible with only the default chain entries
    // below (they won't parse as certificates), so the cache/remote OCSP
    // strategy fails fast and we fall into CRL handling.
    // `has_staple()` is false, so strategy 1 short-circuits before ever
    // calling `evaluate()`. The cache/remote-OCSP strategy also never
    // calls `evaluate()`: the chain entries aren't parseable certificates,
    // so the lookup fails during request construction. The first
    // recorded verdict therefore belongs to CRL-with-positive-response
    // (strategy 3); the second to CRL-network-only (strategy 4).
    let mut trust = ScriptedTrust {
        chain: vec![Certificate::from_der(vec![1]), Certificate::from_der(vec![2])],
        staple: false,
        verdicts: vec![false, true],
        calls: 0,
    };

    let mut disposition_was_use_credential = false;
    let trusted = orchestrator
        .evaluate(&mut trust, None, |d| {
            disposition_was_use_credential = matches!(d, AuthDisposition::UseCredential);
        })
        .await;

    assert!(trusted);
    assert!(disposition_was_use_credential);
}

#[tokio::test]
async fn default_false_when_every_strategy_fails() {
    let orchestrator = new_orchestrator();

    let mut trust = ScriptedTrust {
        chain: vec![Certificate::from_der(vec![1]), Certificate::from_der(vec![2])],
        staple: false,
        verdicts: vec![false, false, false],
        calls: 0,
    };

    let mut disposition_was_default = false;
    let trusted = orchestrator
        .evaluate(&mut trust, None, |d| {
            disposition_was_default = matches!(d, AuthDisposition::PerformDefaultHandling);
        })
        .await;

    assert!(!trusted);
    assert!(disposition_was_default);
}

#[tokio::test]
async fn staple_short_circuits_everything_else() {
    let orchestrator = new_orchestrator();

    let mut trust = ScriptedTrust {
        chain: vec![Certificate::from_der(vec![1]), Certificate::from_der(vec![2])],
        staple: true,
        verdicts: vec![true],
        calls: 0,
    };

    let trusted = orchestrator.evaluate(&mut trust, None, |_| {}).await;

    assert!(trusted);
    assert_eq!(trust.calls, 1);
}
