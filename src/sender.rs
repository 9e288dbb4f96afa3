//! Ordered-fallback dispatch across registered providers.
//!
//! [`SmartSender`] walks its fallback order one provider at a time. The first
//! provider to accept the email wins; failures move on to the next name. It
//! never sends through two providers concurrently, so a recipient can't get
//! duplicates and only one provider bills for the message.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald::{EmailParams, ProviderRegistry, SmartSender};
//! use herald::providers::{ResendProvider, SendGridProvider};
//!
//! let registry = ProviderRegistry::shared();
//! let sender = SmartSender::new(
//!     registry,
//!     [
//!         Arc::new(ResendProvider::new("re_xxx")) as Arc<dyn herald::EmailProvider>,
//!         Arc::new(SendGridProvider::new("SG.xxx")),
//!     ],
//! );
//!
//! let result = sender.send_email(&params).await;
//! if result.success {
//!     store_message_id(result.message_id);
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Instrument;

use crate::error::MailError;
use crate::params::{EmailParams, EmailRequest};
use crate::provider::EmailProvider;
use crate::registry::ProviderRegistry;
use crate::result::EmailResult;

/// Fallback order used when none is configured.
pub const DEFAULT_FALLBACK_ORDER: &[&str] = &["resend", "sendgrid"];

/// One provider attempt within a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Provider that was tried.
    pub provider: String,
    /// Whether it accepted the email.
    pub success: bool,
    /// Failure reason reported by the provider.
    pub error: Option<String>,
    /// Wall time spent in the provider call.
    pub elapsed: Duration,
}

/// Result of a dispatch plus per-attempt diagnostics.
///
/// `result` is exactly what [`SmartSender::send_email`] returns.
#[derive(Debug, Clone)]
pub struct Dispatch {
    /// Final outcome of the dispatch.
    pub result: EmailResult,
    /// Attempts in the order they were made.
    pub attempts: Vec<Attempt>,
    /// Names in the fallback order that were not registered.
    pub skipped: Vec<String>,
}

impl Dispatch {
    /// Providers that were tried and failed.
    pub fn failed_providers(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter(|a| !a.success)
            .map(|a| a.provider.as_str())
            .collect()
    }
}

/// Sends email through the first provider in the fallback order that succeeds.
///
/// Stateless between calls: every dispatch reads the registry afresh and keeps
/// no memory of earlier attempts. Clone it freely; clones share the registry.
#[derive(Debug, Clone)]
pub struct SmartSender {
    registry: Arc<ProviderRegistry>,
    fallback_order: Vec<String>,
}

impl SmartSender {
    /// Create a sender and register `providers` into `registry` under their names.
    ///
    /// Uses [`DEFAULT_FALLBACK_ORDER`].
    pub fn new<I>(registry: Arc<ProviderRegistry>, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn EmailProvider>>,
    {
        for provider in providers {
            registry.register(provider);
        }

        Self {
            registry,
            fallback_order: DEFAULT_FALLBACK_ORDER
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Create a sender over an already populated registry.
    pub fn from_registry(registry: Arc<ProviderRegistry>) -> Self {
        Self::new(registry, std::iter::empty())
    }

    /// Replace the fallback order.
    pub fn with_fallback_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// The configured fallback order.
    pub fn fallback_order(&self) -> &[String] {
        &self.fallback_order
    }

    /// The registry this sender resolves names against.
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Send an email through the fallback chain.
    ///
    /// Returns the first successful provider's result unchanged, or
    /// [`EmailResult::all_failed`] when the order is exhausted.
    pub async fn send_email(&self, params: &EmailParams) -> EmailResult {
        self.dispatch(params).await.result
    }

    /// Validate a raw request, then send it.
    ///
    /// Validation errors are returned before any provider is contacted.
    pub async fn send_request(&self, request: EmailRequest) -> Result<EmailResult, MailError> {
        let params = request.validate().inspect_err(|e| {
            tracing::debug!(error = %e, "Rejected email request before dispatch");
        })?;
        Ok(self.send_email(&params).await)
    }

    /// Send an email and return the per-attempt diagnostics alongside the result.
    pub async fn dispatch(&self, params: &EmailParams) -> Dispatch {
        let span = tracing::info_span!(
            "herald.dispatch",
            to = ?params.recipient_emails(),
            subject = %params.subject(),
            order = ?self.fallback_order,
        );

        self.dispatch_inner(params).instrument(span).await
    }

    async fn dispatch_inner(&self, params: &EmailParams) -> Dispatch {
        let mut attempts = Vec::new();
        let mut skipped = Vec::new();

        for name in &self.fallback_order {
            let Some(provider) = self.registry.get_provider(name) else {
                tracing::warn!(
                    provider = %name,
                    available = ?self.registry.available_providers(),
                    "Fallback order names an unregistered email provider, skipping"
                );
                skipped.push(name.clone());
                continue;
            };

            tracing::debug!(provider = %name, "Attempting delivery");
            let start = Instant::now();
            let result = provider.send_email(params).await;
            let elapsed = start.elapsed();

            record_attempt(name, result.success, elapsed);

            attempts.push(Attempt {
                provider: name.clone(),
                success: result.success,
                error: result.error.clone(),
                elapsed,
            });

            if result.success {
                tracing::info!(
                    provider = %result.provider,
                    message_id = ?result.message_id,
                    attempts = attempts.len(),
                    "Email delivered"
                );
                record_dispatch("success");
                return Dispatch {
                    result,
                    attempts,
                    skipped,
                };
            }

            tracing::warn!(
                provider = %name,
                error = ?result.error,
                "Email provider failed, trying next"
            );
        }

        tracing::error!(
            attempts = attempts.len(),
            skipped = skipped.len(),
            "All email providers failed"
        );
        record_dispatch("error");

        Dispatch {
            result: EmailResult::all_failed(),
            attempts,
            skipped,
        }
    }
}

#[cfg(feature = "metrics")]
fn record_attempt(provider: &str, success: bool, elapsed: Duration) {
    let status = if success { "success" } else { "error" };
    metrics::counter!("herald_attempts_total", "provider" => provider.to_string(), "status" => status)
        .increment(1);
    metrics::histogram!("herald_attempt_duration_seconds", "provider" => provider.to_string())
        .record(elapsed.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
fn record_attempt(_provider: &str, _success: bool, _elapsed: Duration) {}

#[cfg(feature = "metrics")]
fn record_dispatch(status: &'static str) {
    metrics::counter!("herald_dispatch_total", "status" => status).increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_dispatch(_status: &'static str) {}
