//! Resend adapter tests.

use herald::providers::ResendProvider;
use herald::{EmailParams, EmailProvider};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn valid_params() -> EmailParams {
    EmailParams::builder()
        .from("tony.stark@example.com")
        .to("steve.rogers@example.com")
        .subject("Hello, Avengers!")
        .html("<h1>Hello</h1>")
        .build()
        .unwrap()
}

fn success_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "049b9217-30b5-4f61-a8e3-4d2d12f9f5a7"
    }))
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn successful_delivery_returns_message_id() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("Authorization", "Bearer re_123456789"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "from": "tony.stark@example.com",
            "to": ["steve.rogers@example.com"],
            "subject": "Hello, Avengers!",
            "html": "<h1>Hello</h1>"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(result.success);
    assert_eq!(result.provider, "resend");
    assert_eq!(
        result.message_id.as_deref(),
        Some("049b9217-30b5-4f61-a8e3-4d2d12f9f5a7")
    );
    assert!(result.error.is_none());
}

#[tokio::test]
async fn all_fields_are_sent() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    let params = EmailParams::builder()
        .from(("T Stark", "tony.stark@example.com"))
        .to(("Steve Rogers", "steve.rogers@example.com"))
        .to("wasp@example.com")
        .reply_to("office.avengers@example.com")
        .subject("Hello, Avengers!")
        .html("<h1>Hello</h1>")
        .header("X-Entity-Ref-ID", "campaign-42")
        .build()
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(body_json(json!({
            "from": "T Stark <tony.stark@example.com>",
            "to": ["Steve Rogers <steve.rogers@example.com>", "wasp@example.com"],
            "subject": "Hello, Avengers!",
            "html": "<h1>Hello</h1>",
            "reply_to": "office.avengers@example.com",
            "headers": {"X-Entity-Ref-ID": "campaign-42"}
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    assert!(provider.send_email(&params).await.success);
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn error_response_becomes_failed_result() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "statusCode": 422,
            "name": "validation_error",
            "message": "The `from` domain is not verified"
        })))
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert_eq!(result.provider, "resend");
    assert!(result.message_id.is_none());
    assert_eq!(
        result.error.as_deref(),
        Some("The `from` domain is not verified (status 422)")
    );
}

#[tokio::test]
async fn unparseable_error_body_uses_status_reason() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Too Many Requests (status 429)"));
}

#[tokio::test]
async fn malformed_success_body_becomes_failed_result() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn timeout_becomes_failed_result() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789")
        .base_url(server.uri())
        .timeout(Duration::from_millis(200));

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(success_response().set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert_eq!(result.provider, "resend");
}

#[tokio::test]
async fn timeout_keeps_injected_client() {
    let server = MockServer::start().await;
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert("X-Client-Tag", "billing".parse().unwrap());
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap();
    let provider = ResendProvider::with_client("re_123456789", client)
        .base_url(server.uri())
        .timeout(Duration::from_secs(5));

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("X-Client-Tag", "billing"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let result = provider.send_email(&valid_params()).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
}

#[tokio::test]
async fn unreachable_host_becomes_failed_result() {
    let provider = ResendProvider::new("re_123456789").base_url("http://127.0.0.1:1");

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert_eq!(result.provider, "resend");
    assert!(result.error.is_some());
}

#[tokio::test]
async fn renamed_provider_reports_its_name() {
    let provider = ResendProvider::new("re_123456789")
        .base_url("http://127.0.0.1:1")
        .with_name("resend-eu");

    assert_eq!(provider.name(), "resend-eu");
    assert_eq!(provider.send_email(&valid_params()).await.provider, "resend-eu");
}
