//! Error types for herald.
//!
//! Only request construction and configuration surface these to callers.
//! Provider failures during dispatch are reported as [`EmailResult`](crate::EmailResult)
//! values instead.

use thiserror::Error;

/// Errors that can occur when building or dispatching emails.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// No email provider is configured.
    #[error("Email provider not configured")]
    NotConfigured,

    /// Configuration error (missing env var, invalid value, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing required field (e.g., from address).
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Required field present but blank after trimming.
    #[error("Field must not be empty: {0}")]
    EmptyField(&'static str),

    /// Invalid email address format.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Error building the email message.
    #[error("Build error: {0}")]
    BuildError(String),

    /// Error sending the email.
    #[error("Send error: {0}")]
    SendError(String),

    /// Provider-specific error with details.
    #[error("Provider error ({provider}): {message}")]
    ProviderError {
        provider: String,
        message: String,
        /// Optional HTTP status code
        status: Option<u16>,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl MailError {
    /// Create a provider-specific error.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a provider error with HTTP status.
    pub fn provider_with_status(
        provider: impl Into<String>,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            message: message.into(),
            status: Some(status),
        }
    }

    /// True for errors raised by request validation, before any provider is contacted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::EmptyField(_) | Self::InvalidAddress(_)
        )
    }

    /// Human-readable reason stored in a failed [`EmailResult`](crate::EmailResult).
    ///
    /// Provider errors drop the `Provider error (name):` prefix since the result
    /// already carries the provider name.
    pub fn reason(&self) -> String {
        match self {
            Self::ProviderError {
                message,
                status: Some(status),
                ..
            } => format!("{} (status {})", message, status),
            Self::ProviderError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(feature = "_http")]
impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        Self::BuildError(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::SendError(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::address::AddressError> for MailError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}
