//! Logger provider that only logs emails.
//!
//! Useful for staging environments or when you want to see what would be sent
//! without actually sending anything.

use async_trait::async_trait;

use crate::params::EmailParams;
use crate::provider::EmailProvider;
use crate::result::EmailResult;

/// Provider that emits tracing events instead of sending.
#[derive(Debug, Clone)]
pub struct LoggerProvider {
    /// If true, log full email details. If false, just log recipient summary.
    log_full: bool,
}

impl LoggerProvider {
    /// Create a logger provider with brief output (just recipients).
    pub fn new() -> Self {
        Self { log_full: false }
    }

    /// Create a logger provider with full email details.
    pub fn full() -> Self {
        Self { log_full: true }
    }

    /// Set whether to log full email details.
    pub fn log_full(mut self, full: bool) -> Self {
        self.log_full = full;
        self
    }
}

impl Default for LoggerProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for LoggerProvider {
    fn name(&self) -> &str {
        "logger"
    }

    async fn send_email(&self, params: &EmailParams) -> EmailResult {
        let message_id = uuid::Uuid::new_v4().to_string();

        if self.log_full {
            tracing::info!(
                message_id = %message_id,
                from = %params.from(),
                to = ?params.to().iter().map(|a| a.formatted()).collect::<Vec<_>>(),
                reply_to = ?params.reply_to().map(|a| a.formatted()),
                subject = %params.subject(),
                headers = ?params.headers(),
                "Email logged (full)"
            );

            tracing::debug!(body = %params.html(), "HTML body");
        } else {
            tracing::info!(
                message_id = %message_id,
                to = ?params.recipient_emails(),
                subject = %params.subject(),
                "Email logged"
            );
        }

        EmailResult::sent(self.name(), message_id)
    }
}
