//! Resend API provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald::providers::ResendProvider;
//!
//! let provider = ResendProvider::new("re_xxxxx")
//!     .timeout(std::time::Duration::from_secs(10));
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::MailError;
use crate::params::EmailParams;
use crate::provider::{log_outcome, EmailProvider};
use crate::result::EmailResult;

const RESEND_API_URL: &str = "https://api.resend.com";

/// Resend API email provider.
pub struct ResendProvider {
    name: String,
    api_key: String,
    client: Client,
    timeout: Option<Duration>,
    base_url: String,
}

impl ResendProvider {
    /// Create a new Resend provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(api_key, super::http_client())
    }

    /// Create with a custom reqwest client.
    pub fn with_client(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            name: "resend".to_string(),
            api_key: api_key.into(),
            client,
            timeout: None,
            base_url: RESEND_API_URL.to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Bound every request by `timeout`.
    ///
    /// Applied per request, so a client passed to `with_client` is kept.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register under a different name (e.g. a second Resend account).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn build_request<'a>(&self, params: &'a EmailParams) -> ResendRequest<'a> {
        ResendRequest {
            from: params.from().formatted(),
            to: params.to().iter().map(|a| a.formatted()).collect(),
            subject: params.subject(),
            html: params.html(),
            reply_to: params.reply_to().map(|a| a.formatted()),
            headers: if params.headers().is_empty() {
                None
            } else {
                Some(params.headers())
            },
        }
    }

    async fn deliver(&self, params: &EmailParams) -> Result<String, MailError> {
        let request = self.build_request(params);

        let url = format!("{}/emails", self.base_url);
        let mut req = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;

        let status = response.status();

        if status.is_success() {
            let result: ResendResponse = response.json().await?;
            Ok(result.id)
        } else {
            let message = response
                .json::<ResendError>()
                .await
                .map(|e| e.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            Err(MailError::provider_with_status(
                &self.name,
                message,
                status.as_u16(),
            ))
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_email(&self, params: &EmailParams) -> EmailResult {
        let result = EmailResult::from_outcome(&self.name, self.deliver(params).await);
        log_outcome(&result);
        result
    }
}

// ============================================================================
// Resend API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: String,
    to: Vec<String>,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<&'a BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: String,
}
