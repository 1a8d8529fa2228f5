//! Caller-configurable options for lookups and trust evaluation.

use crate::cache::OcspCache;
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Rewrites an OCSP responder URL before it's dialed (e.g. to route
/// through a proxy endpoint instead of the literal AIA URL). Returning
/// `None` keeps the original URL.
pub type UrlRewriter = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Receives diagnostic strings as the lookup progresses. A second,
/// explicit channel alongside `tracing`, for callers who want the exact
/// text without wiring a subscriber (the attempted URLs may be
/// privacy-sensitive, so this is opt-in rather than always-on).
pub type Logger = Arc<dyn Fn(&str) + Send + Sync>;

/// Per-call overrides for a single [`crate::trust::TrustOrchestrator::evaluate`]
/// invocation, without mutating the orchestrator's shared defaults.
#[derive(Clone, Default)]
pub struct EvaluateOverrides {
    pub url_rewriter: Option<UrlRewriter>,
    pub transport: Option<Arc<dyn Transport>>,
}

/// Options for a single [`crate::cache::OcspCache::lookup`] call.
#[derive(Clone, TypedBuilder)]
pub struct LookupOptions {
    /// Zero means unbounded.
    #[builder(default = Duration::ZERO)]
    pub timeout: Duration,
    #[builder(default, setter(strip_option))]
    pub url_rewriter: Option<UrlRewriter>,
    #[builder(default, setter(strip_option))]
    pub transport: Option<Arc<dyn Transport>>,
    #[builder(default, setter(strip_option))]
    pub logger: Option<Logger>,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            url_rewriter: None,
            transport: None,
            logger: None,
        }
    }
}

/// Shared configuration for a [`crate::trust::TrustOrchestrator`].
#[derive(Clone, TypedBuilder)]
pub struct OrchestratorConfig {
    /// The cache strategies 2 (cache/remote OCSP) consults and populates.
    pub cache: Arc<OcspCache>,
    #[builder(default, setter(strip_option))]
    pub logger: Option<Logger>,
    #[builder(default, setter(strip_option))]
    pub default_url_rewriter: Option<UrlRewriter>,
    #[builder(default = Arc::new(crate::transport::ReqwestTransport::default()))]
    pub default_transport: Arc<dyn Transport>,
    #[builder(default = Duration::from_secs(10))]
    pub timeout: Duration,
}

impl OrchestratorConfig {
    pub(crate) fn cache_handle(&self) -> Arc<OcspCache> {
        self.cache.clone()
    }
}
