//! Concurrent, fingerprint-keyed cache of successful OCSP responses, with
//! in-flight request coalescing, expiry-driven eviction, and snapshot
//! persistence.

use crate::aia;
use crate::cert::{Certificate, Fingerprint, IssuerCertificate};
use crate::codec;
use crate::config::{LookupOptions, UrlRewriter};
use crate::error::{OcspError, Result};
use crate::transport::{self, Transport};
use base64::Engine;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, trace, warn};

/// The result of a cache lookup: the raw response bytes, and whether it
/// was served from the cache or freshly fetched.
#[derive(Clone)]
pub struct CacheLookup {
    pub response: Arc<Vec<u8>>,
    pub cached: bool,
}

/// A key-value store the cache can snapshot itself into and load itself
/// back from. Implementors own where the bytes actually live (disk, a
/// platform keychain, `UserDefaults`-equivalent, ...).
pub trait PersistentStore: Send + Sync {
    fn load(&self, key: &str) -> Option<HashMap<String, String>>;
    fn save(&self, key: &str, snapshot: HashMap<String, String>);
}

/// Broadcast payloads must be `Clone`; `OcspError` derives `Clone` for
/// exactly this reason.
type LookupBroadcast = std::result::Result<CacheLookup, OcspError>;

#[derive(Clone)]
struct Shared {
    responses: Arc<RwLock<HashMap<Fingerprint, Vec<u8>>>>,
    in_flight: Arc<Mutex<HashMap<Fingerprint, broadcast::Sender<LookupBroadcast>>>>,
    default_transport: Arc<dyn Transport>,
}

pub struct OcspCache {
    shared: Shared,
}

impl OcspCache {
    pub fn new(default_transport: Arc<dyn Transport>) -> Self {
        Self {
            shared: Shared {
                responses: Arc::new(RwLock::new(HashMap::new())),
                in_flight: Arc::new(Mutex::new(HashMap::new())),
                default_transport,
            },
        }
    }

    /// Look up `leaf`'s OCSP status, coalescing concurrent callers for the
    /// same fingerprint into a single remote fetch.
    pub async fn lookup(
        &self,
        leaf: &Certificate,
        issuer: &IssuerCertificate,
        options: &LookupOptions,
    ) -> Result<CacheLookup> {
        let fp = leaf.fingerprint();
        let now = Utc::now();

        if let Some(hit) = Self::try_cached(&self.shared, &fp, now).await? {
            return Ok(hit);
        }

        let receiver = {
            let mut in_flight = self.shared.in_flight.lock().await;
            if let Some(sender) = in_flight.get(&fp) {
                sender.subscribe()
            } else {
                let (sender, receiver) = broadcast::channel(1);
                in_flight.insert(fp.clone(), sender);
                drop(in_flight);

                let shared = self.shared.clone();
                let leaf = leaf.clone();
                let issuer = issuer.clone();
                let options = options.clone();
                let fp_for_task = fp.clone();
                tokio::spawn(async move {
                    Self::fetch_and_broadcast(shared, fp_for_task, leaf, issuer, options).await;
                });

                receiver
            }
        };

        Self::await_broadcast(receiver, options.timeout).await
    }

    async fn try_cached(
        shared: &Shared,
        fp: &Fingerprint,
        now: chrono::DateTime<Utc>,
    ) -> Result<Option<CacheLookup>> {
        let existing = {
            let responses = shared.responses.read().await;
            responses.get(fp).cloned()
        };

        let Some(bytes) = existing else {
            return Ok(None);
        };

        let parsed = codec::parse_response(&bytes)?;
        if parsed.is_valid(now) {
            trace!(fingerprint = %fp, "cache hit");
            return Ok(Some(CacheLookup {
                response: Arc::new(bytes),
                cached: true,
            }));
        }

        debug!(fingerprint = %fp, "evicting expired cache entry");
        shared.responses.write().await.remove(fp);
        Ok(None)
    }

    /// Runs the remote fetch for a single fingerprint and broadcasts the
    /// outcome to every subscriber, then clears the in-flight entry so a
    /// later lookup may retry. Spawned onto `tokio::spawn` so a caller
    /// racing a timeout doesn't cancel the fetch out from under the other
    /// subscribers, or from under the cache itself.
    async fn fetch_and_broadcast(
        shared: Shared,
        fp: Fingerprint,
        leaf: Certificate,
        issuer: IssuerCertificate,
        options: LookupOptions,
    ) {
        let result = Self::fetch(&shared, &leaf, &issuer, &options).await;

        match &result {
            Ok(lookup) => {
                shared
                    .responses
                    .write()
                    .await
                    .insert(fp.clone(), (*lookup.response).clone());
            }
            Err(e) => {
                if let Some(logger) = &options.logger {
                    logger(&format!("OCSP fetch for {fp} failed: {e}"));
                }
            }
        }

        let sender = shared.in_flight.lock().await.remove(&fp);
        if let Some(sender) = sender {
            let _ = sender.send(result);
        }
    }

    async fn fetch(
        shared: &Shared,
        leaf: &Certificate,
        issuer: &IssuerCertificate,
        options: &LookupOptions,
    ) -> Result<CacheLookup> {
        let body = codec::build_request(leaf, issuer)?;
        let urls = aia::ocsp_urls(leaf)?;
        let urls = rewrite_urls(urls, options.url_rewriter.as_ref());

        let transport = options
            .transport
            .clone()
            .unwrap_or_else(|| shared.default_transport.clone());

        let raw = transport::first_successful(&urls, body, transport).await?;

        Ok(CacheLookup {
            response: Arc::new(raw.bytes),
            cached: false,
        })
    }

    async fn await_broadcast(
        mut receiver: broadcast::Receiver<LookupBroadcast>,
        timeout: std::time::Duration,
    ) -> Result<CacheLookup> {
        let recv = receiver.recv();
        if timeout.is_zero() {
            recv.await.unwrap_or_else(|_| {
                Err(OcspError::Unknown {
                    detail: "in-flight OCSP fetch ended without a result".to_string(),
                })
            })
        } else {
            match tokio::time::timeout(timeout, recv).await {
                Ok(inner) => inner.unwrap_or_else(|_| {
                    Err(OcspError::Unknown {
                        detail: "in-flight OCSP fetch ended without a result".to_string(),
                    })
                }),
                Err(_) => Err(OcspError::LookupTimedOut),
            }
        }
    }

    /// Unconditionally insert `bytes` under `cert`'s fingerprint. Intended
    /// for tests and warm-starts; unlike a real lookup, this does **not**
    /// validate that `bytes` decodes to a successful response — callers
    /// of this method accept responsibility for what they store.
    pub async fn set(&self, cert: &Certificate, bytes: Vec<u8>) {
        self.shared
            .responses
            .write()
            .await
            .insert(cert.fingerprint(), bytes);
    }

    pub async fn remove(&self, cert: &Certificate) -> bool {
        self.shared
            .responses
            .write()
            .await
            .remove(&cert.fingerprint())
            .is_some()
    }

    pub async fn clear(&self) {
        self.shared.responses.write().await.clear();
        self.shared.in_flight.lock().await.clear();
    }

    /// Snapshot the cache into `store` under `key` as
    /// `{ fingerprint (hex) -> base64(DER) }`.
    pub async fn persist(&self, store: &dyn PersistentStore, key: &str) {
        let snapshot: HashMap<String, String> = {
            let responses = self.shared.responses.read().await;
            responses
                .iter()
                .map(|(fp, bytes)| {
                    (
                        fp.clone(),
                        base64::engine::general_purpose::STANDARD.encode(bytes),
                    )
                })
                .collect()
        };
        debug!(entries = snapshot.len(), %key, "persisting OCSP cache snapshot");
        store.save(key, snapshot);
    }

    /// Replace the in-memory cache with the snapshot stored under `key`.
    /// Entries that fail to decode as OCSP responses are dropped and
    /// logged; expired entries are admitted and evicted on first lookup.
    pub async fn load(&self, store: &dyn PersistentStore, key: &str) {
        let Some(snapshot) = store.load(key) else {
            return;
        };

        let mut loaded = HashMap::with_capacity(snapshot.len());
        for (fp, encoded) in snapshot {
            match base64::engine::general_purpose::STANDARD.decode(&encoded) {
                Ok(bytes) => match codec::parse_response(&bytes) {
                    Ok(_) => {
                        loaded.insert(fp, bytes);
                    }
                    Err(e) => {
                        warn!(fingerprint = %fp, error = %e, "dropping unparseable cache entry on load")
                    }
                },
                Err(e) => {
                    warn!(fingerprint = %fp, error = %e, "dropping non-base64 cache entry on load")
                }
            }
        }

        debug!(entries = loaded.len(), %key, "loaded OCSP cache snapshot");
        *self.shared.responses.write().await = loaded;
    }
}

fn rewrite_urls(urls: Vec<String>, rewriter: Option<&UrlRewriter>) -> Vec<String> {
    match rewriter {
        None => urls,
        Some(f) => urls
            .into_iter()
            .map(|u| f(&u).unwrap_or(u))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_remove() {
        let cache = OcspCache::new(Arc::new(crate::transport::ReqwestTransport::default()));
        let cert = Certificate::from_der(vec![9, 9, 9]);
        cache.set(&cert, vec![1, 2, 3]).await;
        assert!(cache.remove(&cert).await);
        assert!(!cache.remove(&cert).await);
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let cache = OcspCache::new(Arc::new(crate::transport::ReqwestTransport::default()));
        let cert = Certificate::from_der(vec![1]);
        cache.set(&cert, vec![1]).await;
        cache.clear().await;
        assert!(!cache.remove(&cert).await);
    }
}
