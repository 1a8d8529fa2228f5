//! Testing utilities for consumers of this crate.
//!
//! This module provides an in-memory [`Transport`](crate::transport::Transport)
//! test double and an in-memory [`PersistentStore`](crate::cache::PersistentStore),
//! so callers can exercise the cache and orchestrator without any network
//! access. It is only available behind the `test-support` feature.
//!
//! ```ignore
//! use ocsp_privacy_cache::testing::RecordingTransport;
//!
//! #[tokio::test]
//! async fn test_my_app() {
//!     let transport = RecordingTransport::new();
//!     transport.script("http://ocsp.example.com", Ok(successful_response_der()));
//!     // ... wire `transport` into an OcspCache and drive a lookup ...
//!     assert_eq!(transport.attempted_urls(), vec!["http://ocsp.example.com"]);
//! }
//! ```

pub mod store;
pub mod transport;

pub use store::InMemoryStore;
pub use transport::RecordingTransport;
