//! Email provider implementations.
//!
//! Each provider implements the [`EmailProvider`](crate::EmailProvider) trait.
//!
//! ## Available Providers
//!
//! | Provider | Feature Flag | Description |
//! |----------|-------------|-------------|
//! | [`SmtpProvider`] | `smtp` | Authenticated SMTP via lettre |
//! | [`ResendProvider`] | `resend` | Resend API |
//! | [`SendGridProvider`] | `sendgrid` | SendGrid API |
//! | [`MemoryProvider`] | (none) | In-memory capture for dev/testing |
//! | [`LoggerProvider`] | (none) | Logs emails without sending |

#[cfg(feature = "smtp")]
pub mod smtp;
#[cfg(feature = "smtp")]
pub use smtp::{self_test, SmtpProvider};
pub use crate::config::{SmtpConfig, TlsMode};

#[cfg(feature = "resend")]
mod resend;
#[cfg(feature = "resend")]
pub use resend::ResendProvider;

#[cfg(feature = "sendgrid")]
mod sendgrid;
#[cfg(feature = "sendgrid")]
pub use sendgrid::SendGridProvider;

mod memory;
pub use memory::{MemoryProvider, SentEmail};

mod logger;
pub use logger::LoggerProvider;

/// Build the default reqwest client, falling back to `Client::new()`.
#[cfg(feature = "_http")]
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(format!("herald/{}", crate::VERSION))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}
