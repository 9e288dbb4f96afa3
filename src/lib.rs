//! # Herald
//!
//! Transactional email dispatch across several providers, with fallback.
//!
//! A [`SmartSender`] walks an ordered list of provider names, looks each one
//! up in a [`ProviderRegistry`], and returns the first successful
//! [`EmailResult`]. Providers never return errors: every outcome, including
//! network failures, comes back as a result value.
//!
//! ## Quick Start
//!
//! Set environment variables:
//! ```bash
//! RESEND_API_KEY=re_xxxxx
//! SENDGRID_API_KEY=SG.xxxxx
//! EMAIL_FALLBACK_ORDER=resend,sendgrid
//! ```
//!
//! Build a sender once at startup and share it:
//! ```rust,ignore
//! use herald::{DispatchConfig, EmailParams};
//!
//! let sender = DispatchConfig::from_env()?.build_sender()?;
//!
//! let params = EmailParams::builder()
//!     .from(("Acme", "noreply@acme.io"))
//!     .to("user@example.com")
//!     .subject("Welcome!")
//!     .html("<h1>Hello</h1>")
//!     .build()?;
//!
//! let result = sender.send_email(&params).await;
//! if !result.success {
//!     eprintln!("{}", result.user_message());
//! }
//! ```
//!
//! ## Explicit Wiring
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald::{ProviderRegistry, SmartSender};
//! use herald::providers::{ResendProvider, SendGridProvider};
//!
//! let sender = SmartSender::new(
//!     ProviderRegistry::shared(),
//!     [
//!         Arc::new(ResendProvider::new("re_xxx")) as Arc<dyn herald::EmailProvider>,
//!         Arc::new(SendGridProvider::new("SG.xxx")),
//!     ],
//! );
//! ```
//!
//! ## Environment Variables
//!
//! See [`DispatchConfig`] for the full list. Credentials are read once and
//! injected into providers; nothing reads the environment at send time.
//!
//! ## Feature Flags
//!
//! - `resend` - Resend API provider
//! - `sendgrid` - SendGrid API provider (with optional gzip bodies)
//! - `smtp` - SMTP provider via lettre, plus [`providers::self_test`]
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//!
//! ## Metrics
//!
//! Enable `features = ["metrics"]` to emit Prometheus-style metrics:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `herald_attempts_total` | Counter | provider, status | Provider send attempts |
//! | `herald_attempt_duration_seconds` | Histogram | provider | Attempt duration |
//! | `herald_dispatch_total` | Counter | status | Dispatches, after fallback |
//!
//! Install a recorder (e.g., `metrics-exporter-prometheus`) in your app to collect them.

/// The version of the herald crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod address;
mod config;
mod error;
mod params;
mod provider;
mod registry;
mod result;
mod sender;
mod verification;

pub mod providers;
pub mod testing;

// Re-exports
pub use address::Address;
pub use config::{ApiKeyConfig, DispatchConfig, SmtpConfig, TlsMode};
pub use error::MailError;
pub use params::{EmailParams, EmailParamsBuilder, EmailRequest, Recipients};
pub use provider::EmailProvider;
pub use registry::ProviderRegistry;
pub use result::{EmailResult, ALL_PROVIDERS_FAILED, NO_PROVIDER};
pub use sender::{Attempt, Dispatch, SmartSender, DEFAULT_FALLBACK_ORDER};
pub use verification::{generate_code, send_verification_code, VerificationEmail};

/// Prelude for convenient imports.
///
/// ```rust
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Address;
    pub use crate::DispatchConfig;
    pub use crate::EmailParams;
    pub use crate::EmailProvider;
    pub use crate::EmailResult;
    pub use crate::MailError;
    pub use crate::ProviderRegistry;
    pub use crate::SmartSender;
}
