//! Memory and logger adapter tests.

use herald::providers::{LoggerProvider, MemoryProvider};
use herald::testing::*;
use herald::{EmailParams, EmailProvider};
use std::sync::Arc;

fn params(to: &str) -> EmailParams {
    EmailParams::builder()
        .from("noreply@acme.io")
        .to(to)
        .subject("Weekly digest")
        .html("<p>News</p>")
        .build()
        .unwrap()
}

#[tokio::test]
async fn memory_provider_captures_in_order() {
    let provider = MemoryProvider::new();

    provider.send_email(&params("a@example.com")).await;
    provider.send_email(&params("b@example.com")).await;

    assert_email_count(&provider, 2);
    let emails = provider.emails();
    assert_eq!(emails[0].params.to()[0].email, "a@example.com");
    assert_eq!(emails[1].params.to()[0].email, "b@example.com");
    assert_eq!(get_last_email(&provider).params.to()[0].email, "b@example.com");
}

#[tokio::test]
async fn memory_provider_is_shareable_across_tasks() {
    let provider = Arc::new(MemoryProvider::new());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let provider = provider.clone();
            tokio::spawn(async move {
                provider
                    .send_email(&params(&format!("user{}@example.com", i)))
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().success);
    }

    assert_email_count(&provider, 10);
    assert_attempt_count(&provider, 10);
    assert_email_to(&provider, "user7@example.com");
}

#[tokio::test]
async fn logger_provider_always_succeeds() {
    let result = LoggerProvider::full().send_email(&params("a@example.com")).await;

    assert!(result.success);
    assert_eq!(result.provider, "logger");
    assert!(result.message_id.is_some());
}
