//! SMTP provider using lettre.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald::providers::SmtpProvider;
//! use herald::SmtpConfig;
//!
//! let config = SmtpConfig::new("smtp.gmail.com")
//!     .port(587)
//!     .credentials("user@gmail.com", "app-password");
//! let provider = SmtpProvider::from_config(&config)?;
//! ```
//!
//! [`self_test`] runs a single send through a throwaway provider built from
//! user-supplied settings, for "test my SMTP connection" screens.

use async_trait::async_trait;
use lettre::{
    message::{
        header::{ContentType, HeaderName, HeaderValue},
        Mailbox,
    },
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

use crate::address::Address;
use crate::config::{SmtpConfig, TlsMode};
use crate::error::MailError;
use crate::params::EmailParams;
use crate::provider::{log_outcome, EmailProvider};
use crate::result::EmailResult;

/// SMTP email provider.
pub struct SmtpProvider {
    name: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpProvider {
    /// Build a provider from connection settings.
    ///
    /// Fails if the TLS parameters for `host` can't be set up.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailError> {
        let mut builder = match config.tls {
            TlsMode::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?,
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
        }
        .port(config.port);

        if let Some(username) = config.username.as_deref().filter(|u| !u.is_empty()) {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                config.password.clone().unwrap_or_default(),
            ));
        }
        if let Some(secs) = config.timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.timeout(Some(Duration::from_secs(secs)));
        }

        Ok(Self {
            name: "smtp".to_string(),
            transport: builder.build(),
        })
    }

    /// Create a provider for a local relay (no TLS, no auth, port 25).
    pub fn localhost() -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost")
            .port(25)
            .build();

        Self {
            name: "smtp".to_string(),
            transport,
        }
    }

    /// Register under a different name (e.g. `"gmail"`).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Open a connection and authenticate without sending anything.
    pub async fn verify(&self) -> Result<bool, MailError> {
        Ok(self.transport.test_connection().await?)
    }

    /// Build a lettre Message from the params.
    fn build_message(&self, params: &EmailParams) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(address_to_mailbox(params.from())?)
            .subject(params.subject());

        for to in params.to() {
            builder = builder.to(address_to_mailbox(to)?);
        }

        if let Some(reply_to) = params.reply_to() {
            builder = builder.reply_to(address_to_mailbox(reply_to)?);
        }

        for (name, value) in params.headers() {
            let header_name = HeaderName::new_from_ascii(name.clone())
                .map_err(|_| MailError::BuildError(format!("Invalid header name '{}'", name)))?;
            builder = builder.raw_header(HeaderValue::new(header_name, value.clone()));
        }

        Ok(builder
            .header(ContentType::TEXT_HTML)
            .body(params.html().to_string())?)
    }

    async fn deliver(&self, params: &EmailParams) -> Result<String, MailError> {
        let message = self.build_message(params)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::SendError(e.to_string()))?;

        // Use the server's reply line as the message ID, or generate one
        let message_id = response
            .message()
            .next()
            .and_then(|m| m.lines().next())
            .map(|s| s.to_string())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(message_id)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_email(&self, params: &EmailParams) -> EmailResult {
        let result = EmailResult::from_outcome(&self.name, self.deliver(params).await);
        log_outcome(&result);
        result
    }
}

/// Send one email through a throwaway SMTP provider built from `config`.
///
/// No registry and no fallback: the raw outcome is returned so a settings
/// screen can show whether the server accepted the message.
pub async fn self_test(config: &SmtpConfig, params: &EmailParams) -> EmailResult {
    tracing::info!(host = %config.host, port = config.port, tls = ?config.tls, "Running SMTP self-test");

    match SmtpProvider::from_config(config) {
        Ok(provider) => provider.send_email(params).await,
        Err(e) => {
            tracing::warn!(host = %config.host, error = %e, "SMTP self-test could not build transport");
            EmailResult::failed("smtp", e.reason())
        }
    }
}

/// Convert an Address to lettre's Mailbox, punycoding IDN domains.
fn address_to_mailbox(addr: &Address) -> Result<Mailbox, MailError> {
    let email = addr.to_ascii()?.parse::<lettre::Address>()?;
    Ok(Mailbox::new(addr.name.clone(), email))
}
