//! SendGrid API provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald::providers::SendGridProvider;
//!
//! let provider = SendGridProvider::new("SG.xxxxx").compress(true);
//! ```
//!
//! SendGrid answers `202 Accepted` with an empty body. The message ID comes
//! from the `X-Message-Id` response header.

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use crate::address::Address;
use crate::error::MailError;
use crate::params::EmailParams;
use crate::provider::{log_outcome, EmailProvider};
use crate::result::EmailResult;

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3";

/// SendGrid API email provider.
pub struct SendGridProvider {
    name: String,
    api_key: String,
    client: Client,
    timeout: Option<Duration>,
    base_url: String,
    compress: bool,
}

impl SendGridProvider {
    /// Create a new SendGrid provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(api_key, super::http_client())
    }

    /// Create with a custom reqwest client.
    pub fn with_client(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            name: "sendgrid".to_string(),
            api_key: api_key.into(),
            client,
            timeout: None,
            base_url: SENDGRID_API_URL.to_string(),
            compress: false,
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

    /// Enable gzip compression for requests.
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Register under a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn build_request<'a>(&self, params: &'a EmailParams) -> SendGridRequest<'a> {
        SendGridRequest {
            personalizations: vec![SendGridPersonalization {
                to: params.to().iter().map(SendGridAddress::from).collect(),
            }],
            from: params.from().into(),
            reply_to: params.reply_to().map(SendGridAddress::from),
            subject: params.subject(),
            content: vec![SendGridContent {
                content_type: "text/html",
                value: params.html(),
            }],
            headers: if params.headers().is_empty() {
                None
            } else {
                Some(params.headers())
            },
        }
    }

    fn compress_body(&self, body: &[u8]) -> Result<Vec<u8>, MailError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body).map_err(|e| {
            MailError::provider(&self.name, format!("Failed to compress body: {}", e))
        })?;
        encoder.finish().map_err(|e| {
            MailError::provider(&self.name, format!("Failed to finish compression: {}", e))
        })
    }

    async fn deliver(&self, params: &EmailParams) -> Result<String, MailError> {
        let request = self.build_request(params);

        let url = format!("{}/mail/send", self.base_url);
        let json_body = serde_json::to_vec(&request)?;

        let mut req = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let body = if self.compress {
            req = req.header("Content-Encoding", "gzip");
            self.compress_body(&json_body)?
        } else {
            json_body
        };

        let response = req.body(body).send().await?;

        let status = response.status();

        if status.is_success() {
            let message_id = response
                .headers()
                .get("X-Message-Id")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

            Ok(message_id)
        } else {
            let message = match response.json::<SendGridError>().await {
                Ok(error) if !error.errors.is_empty() => error
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
                _ => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            };

            Err(MailError::provider_with_status(
                &self.name,
                message,
                status.as_u16(),
            ))
        }
    }
}

#[async_trait]
impl EmailProvider for SendGridProvider {
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
// SendGrid API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct SendGridRequest<'a> {
    personalizations: Vec<SendGridPersonalization<'a>>,
    from: SendGridAddress<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<SendGridAddress<'a>>,
    subject: &'a str,
    content: Vec<SendGridContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<&'a BTreeMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct SendGridPersonalization<'a> {
    to: Vec<SendGridAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> From<&'a Address> for SendGridAddress<'a> {
    fn from(addr: &'a Address) -> Self {
        Self {
            email: &addr.email,
            name: addr.name.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendGridError {
    #[serde(default)]
    errors: Vec<SendGridErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorDetail {
    message: String,
}
