//! Coalescing and per-lookup timeout behavior against a real certificate
//! pair (see `fixtures/generate.sh`), through a transport that can be
//! told to take its time.

use async_trait::async_trait;
use der::Encode;
use ocsp_privacy_cache::cache::OcspCache;
use ocsp_privacy_cache::cert::Certificate;
use ocsp_privacy_cache::config::LookupOptions;
use ocsp_privacy_cache::error::OcspError;
use ocsp_privacy_cache::transport::Transport;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use x509_ocsp::{OcspResponse, OcspResponseStatus};

fn leaf() -> Certificate {
    Certificate::from_der(include_bytes!("fixtures/leaf.der").to_vec())
}

fn issuer() -> Certificate {
    Certificate::from_der(include_bytes!("fixtures/issuer.der").to_vec())
}

fn try_later_bytes() -> Vec<u8> {
    OcspResponse {
        response_status: OcspResponseStatus::TryLater,
        response_bytes: None,
    }
    .to_der()
    .unwrap()
}

/// A transport that counts every call it receives and sleeps `delay`
/// before returning its scripted response, so tests can observe whether
/// a fetch is still running after a caller has given up on it.
struct DelayedTransport {
    delay: Duration,
    response: Vec<u8>,
    calls: AtomicUsize,
}

impl DelayedTransport {
    fn new(delay: Duration, response: Vec<u8>) -> Self {
        Self {
            delay,
            response,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for DelayedTransport {
    async fn post(&self, _url: &str, _body: Vec<u8>) -> Result<Vec<u8>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.response.clone())
    }
}

#[tokio::test]
async fn concurrent_lookups_on_the_same_certificate_issue_one_fetch() {
    let transport = Arc::new(DelayedTransport::new(Duration::from_millis(40), try_later_bytes()));
    let cache = Arc::new(OcspCache::new(transport.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            cache.lookup(&leaf(), &issuer(), &LookupOptions::default()).await
        }));
    }

    for handle in handles {
        // every caller gets a result; none of them panic or hang
        let _ = handle.await.unwrap();
    }

    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn lookup_times_out_while_the_fetch_keeps_running() {
    let transport = Arc::new(DelayedTransport::new(Duration::from_millis(80), try_later_bytes()));
    let cache = OcspCache::new(transport.clone());

    let options = LookupOptions::builder()
        .timeout(Duration::from_millis(10))
        .build();

    let result = cache.lookup(&leaf(), &issuer(), &options).await;
    assert!(matches!(result, Err(OcspError::LookupTimedOut)));
    assert_eq!(transport.call_count(), 1);

    // long enough for the 80ms fetch to finish; a cancelled fetch would
    // never bump the counter again, a retried one would bump it to 2
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(transport.call_count(), 1);
}
