//! Wire-format tests for the `reqwest`-backed OCSP transport.

use ocsp_privacy_cache::transport::{self, ReqwestTransport};
use std::time::Duration;
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn posts_der_body_with_ocsp_content_type() {
    let server = MockServer::start().await;
    let body = vec![0x30, 0x03, 0x02, 0x01, 0x00];

    Mock::given(method("POST"))
        .and(path("/ocsp"))
        .and(header("Content-Type", "application/ocsp-request"))
        .and(body_bytes(body.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xAA, 0xBB]))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let url = format!("{}/ocsp", server.uri());
    let result = ocsp_privacy_cache::transport::Transport::post(&transport, &url, body).await;

    assert_eq!(result, Ok(vec![0xAA, 0xBB]));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ocsp"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let url = format!("{}/ocsp", server.uri());
    let result = ocsp_privacy_cache::transport::Transport::post(&transport, &url, vec![1]).await;

    assert!(result.is_err());
}

#[test]
fn get_form_url_appends_base64url_body() {
    let url = transport::get_request_url("http://ocsp.example.com/", &[0, 1, 2, 3]);
    assert_eq!(url, "http://ocsp.example.com/AAECAw");
}
