//! An in-memory [`Transport`] that scripts per-URL responses and records
//! every attempted `(url, body)` pair, mirroring the role a wiremock
//! server plays for the real `reqwest`-backed transport.

use crate::transport::Transport;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct Attempt {
    pub url: String,
    pub body: Vec<u8>,
}

struct State {
    scripted: Vec<(String, Result<Vec<u8>, String>)>,
    attempts: Vec<Attempt>,
}

/// Drives a scripted sequence of responses keyed by URL and records every
/// call it receives, so tests can assert on attempt order without
/// standing up an HTTP server.
pub struct RecordingTransport {
    state: Mutex<State>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                scripted: Vec::new(),
                attempts: Vec::new(),
            }),
        }
    }

    /// Queue a response for the given URL. Multiple calls for the same
    /// URL queue multiple responses, consumed in order.
    pub fn script(&self, url: impl Into<String>, response: Result<Vec<u8>, String>) {
        self.state.lock().unwrap().scripted.push((url.into(), response));
    }

    pub fn attempted_urls(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .attempts
            .iter()
            .map(|a| a.url.clone())
            .collect()
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.state.lock().unwrap().attempts.clone()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, String> {
        let mut state = self.state.lock().unwrap();
        state.attempts.push(Attempt {
            url: url.to_string(),
            body,
        });

        let pos = state.scripted.iter().position(|(u, _)| u == url);
        match pos {
            Some(idx) => state.scripted.remove(idx).1,
            None => Err(format!("RecordingTransport: no response scripted for {url}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_scripted_response_and_records_attempt() {
        let transport = RecordingTransport::new();
        transport.script("http://a", Ok(vec![1, 2, 3]));

        let result = transport.post("http://a", vec![9]).await;
        assert_eq!(result, Ok(vec![1, 2, 3]));
        assert_eq!(transport.attempted_urls(), vec!["http://a".to_string()]);
    }

    #[tokio::test]
    async fn unscripted_url_fails() {
        let transport = RecordingTransport::new();
        let result = transport.post("http://unknown", vec![]).await;
        assert!(result.is_err());
    }
}
