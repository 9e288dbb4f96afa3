//! Normalized dispatch result.

use serde::{Deserialize, Serialize};

use crate::error::MailError;

/// Provider name reported when no provider delivered the email.
pub const NO_PROVIDER: &str = "none";

/// Error reported when every provider in the fallback order failed.
pub const ALL_PROVIDERS_FAILED: &str = "All email providers failed";

/// Message shown to end users on failure. Provider detail stays in server logs.
const USER_FAILURE_MESSAGE: &str = "Email could not be sent";

/// Outcome of sending one email, in the same shape for every provider.
///
/// `message_id` is only set on success, `error` only on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub provider: String,
}

impl EmailResult {
    /// A successful delivery.
    pub fn sent(provider: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
            provider: provider.into(),
        }
    }

    /// A failed delivery.
    pub fn failed(provider: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
            provider: provider.into(),
        }
    }

    /// The aggregate failure returned when the fallback order is exhausted.
    pub fn all_failed() -> Self {
        Self::failed(NO_PROVIDER, ALL_PROVIDERS_FAILED)
    }

    /// Normalize an adapter's internal outcome.
    ///
    /// This is how every provider turns `Result<message_id, MailError>` into a
    /// result value, so no error ever crosses the adapter boundary.
    pub fn from_outcome(provider: impl Into<String>, outcome: Result<String, MailError>) -> Self {
        match outcome {
            Ok(message_id) => Self::sent(provider, message_id),
            Err(err) => Self::failed(provider, err.reason()),
        }
    }

    /// Whether the email was accepted by a provider.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Message shown to end users.
    ///
    /// Never names the provider or the provider's error.
    pub fn user_message(&self) -> &'static str {
        if self.success {
            "Email sent"
        } else {
            USER_FAILURE_MESSAGE
        }
    }

    /// Convert into a `Result` carrying the message ID.
    pub fn into_result(self) -> Result<String, MailError> {
        if self.success {
            Ok(self.message_id.unwrap_or_default())
        } else {
            Err(MailError::provider(
                self.provider,
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}
