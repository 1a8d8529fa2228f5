//! Privacy-preserving OCSP revocation checking.
//!
//! Applications that proxy all network traffic can't let the platform's
//! built-in revocation checking phone home outside that proxy: a
//! plaintext OCSP request leaks the certificate being validated, which
//! uniquely identifies the destination host to a network observer. This
//! crate intercepts that OCSP traffic, performs the lookup itself through
//! a caller-chosen [`Transport`](transport::Transport), caches successful
//! responses, and hands a trust decision back to the embedding TLS stack.
//!
//! # Module Organization
//!
//! - [`cert`]: certificate handles and fingerprints
//! - [`codec`]: DER encoding of OCSP requests, parsing of OCSP responses
//! - [`aia`]: Authority Information Access responder-URL extraction
//! - [`transport`]: the injectable HTTP POST plus sequential URL fan-out
//! - [`cache`]: the concurrent, coalescing, persistable OCSP cache
//! - [`trust`]: leaf/issuer extraction and the staple → cache → CRL orchestrator
//! - [`config`]: builders for per-call and shared options
//! - [`error`]: the crate's error taxonomy
//! - [`testing`] (feature `test-support`): in-memory transport and store doubles
//!
//! # Quick Start
//!
//! ```no_run
//! use ocsp_privacy_cache::cache::OcspCache;
//! use ocsp_privacy_cache::cert::Certificate;
//! use ocsp_privacy_cache::config::LookupOptions;
//! use ocsp_privacy_cache::transport::ReqwestTransport;
//! use std::sync::Arc;
//!
//! # async fn example(leaf_der: Vec<u8>, issuer_der: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let cache = OcspCache::new(Arc::new(ReqwestTransport::default()));
//! let leaf = Certificate::from_der(leaf_der);
//! let issuer = Certificate::from_der(issuer_der);
//!
//! let lookup = cache.lookup(&leaf, &issuer, &LookupOptions::default()).await?;
//! println!("cached = {}", lookup.cached);
//! # Ok(())
//! # }
//! ```
//!
//! # Trust Orchestration
//!
//! ```no_run
//! use ocsp_privacy_cache::cache::OcspCache;
//! use ocsp_privacy_cache::config::OrchestratorConfig;
//! use ocsp_privacy_cache::trust::{AuthDisposition, PlatformTrust, TrustOrchestrator};
//! use std::sync::Arc;
//!
//! # async fn example<T: PlatformTrust>(cache: Arc<OcspCache>, mut trust: T) {
//! let config = OrchestratorConfig::builder().cache(cache).build();
//! let orchestrator = TrustOrchestrator::new(config);
//! orchestrator
//!     .evaluate(&mut trust, None, |disposition| match disposition {
//!         AuthDisposition::UseCredential => { /* proceed with the TLS handshake */ }
//!         AuthDisposition::PerformDefaultHandling => { /* defer to the platform */ }
//!         AuthDisposition::CancelAuthenticationChallenge => { /* abort */ }
//!     })
//!     .await;
//! # }
//! ```

pub mod aia;
pub mod cache;
pub mod cert;
pub mod codec;
pub mod config;
pub mod error;
#[cfg(feature = "test-support")]
pub mod error_tree;
pub mod transport;
pub mod trust;

#[cfg(feature = "test-support")]
pub mod testing;

pub use cache::{CacheLookup, OcspCache, PersistentStore};
pub use cert::{Certificate, Fingerprint, IssuerCertificate};
pub use codec::{CertStatusKind, Response, ResponseStatus, SingleResponse};
pub use config::{EvaluateOverrides, LookupOptions, Logger, OrchestratorConfig, UrlRewriter};
pub use error::{OcspError, Result};
pub use transport::{ReqwestTransport, Transport};
pub use trust::{AuthDisposition, CrlPolicy, OcspPolicy, PlatformTrust, TrustOrchestrator};
