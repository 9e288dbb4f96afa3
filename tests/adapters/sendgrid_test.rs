//! SendGrid adapter tests.

use herald::providers::SendGridProvider;
use herald::{EmailParams, EmailProvider};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn valid_params() -> EmailParams {
    EmailParams::builder()
        .from(("T Stark", "tony.stark@example.com"))
        .to("steve.rogers@example.com")
        .subject("Hello, Avengers!")
        .html("<h1>Hello</h1>")
        .build()
        .unwrap()
}

#[tokio::test]
async fn successful_delivery_uses_message_id_header() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .and(header("Authorization", "Bearer SG.123456789"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "personalizations": [{"to": [{"email": "steve.rogers@example.com"}]}],
            "from": {"email": "tony.stark@example.com", "name": "T Stark"},
            "subject": "Hello, Avengers!",
            "content": [{"type": "text/html", "value": "<h1>Hello</h1>"}]
        })))
        .respond_with(ResponseTemplate::new(202).insert_header("X-Message-Id", "sg-abc123"))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(result.success);
    assert_eq!(result.provider, "sendgrid");
    assert_eq!(result.message_id.as_deref(), Some("sg-abc123"));
}

#[tokio::test]
async fn missing_message_id_header_generates_one() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(result.success);
    assert!(!result.message_id.unwrap().is_empty());
}

#[tokio::test]
async fn compressed_request_sets_content_encoding() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789")
        .base_url(server.uri())
        .compress(true);

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .and(header("Content-Encoding", "gzip"))
        .respond_with(ResponseTemplate::new(202).insert_header("X-Message-Id", "gz-1"))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;
    assert_eq!(result.message_id.as_deref(), Some("gz-1"));
}

#[tokio::test]
async fn error_messages_are_joined() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [
                {"field": "from", "message": "from address not verified"},
                {"field": null, "message": "too many requests"}
            ]
        })))
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert_eq!(result.provider, "sendgrid");
    assert_eq!(
        result.error.as_deref(),
        Some("from address not verified; too many requests (status 400)")
    );
}

#[tokio::test]
async fn empty_error_body_uses_status_reason() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(500).set_body_string(""))
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Internal Server Error (status 500)")
    );
}

#[tokio::test]
async fn timeout_applies_to_injected_client() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::with_client("SG.123456789", reqwest::Client::new())
        .base_url(server.uri())
        .timeout(Duration::from_millis(200));

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert_eq!(result.provider, "sendgrid");
}

#[tokio::test]
async fn unreachable_host_becomes_failed_result() {
    let provider = SendGridProvider::new("SG.123456789").base_url("http://127.0.0.1:1");

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert_eq!(result.provider, "sendgrid");
    assert!(result.message_id.is_none());
}
