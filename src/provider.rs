//! The provider adapter contract.
//!
//! # Why `async_trait`?
//!
//! The registry stores adapters as `Arc<dyn EmailProvider>` so the fallback
//! order can be chosen at runtime from configuration. Native async trait
//! methods are not object-safe, so `#[async_trait]` boxes the future. Sending
//! email is network-bound and the extra allocation per call is not measurable
//! next to a provider round-trip.

use async_trait::async_trait;
use std::sync::Arc;

use crate::params::EmailParams;
use crate::result::EmailResult;

/// A single email delivery backend.
///
/// Implementations translate [`EmailParams`] into the backend's wire format,
/// perform exactly one network call, and translate the response back into an
/// [`EmailResult`]. They must not retry, and must never panic or propagate
/// errors: transport failures and rejected requests are reported as
/// `EmailResult { success: false, .. }` tagged with [`name`](Self::name).
///
/// Adapters hold no per-request mutable state and are shared across
/// concurrent dispatches.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use herald::{EmailParams, EmailProvider, EmailResult};
///
/// struct Blackhole;
///
/// #[async_trait]
/// impl EmailProvider for Blackhole {
///     fn name(&self) -> &str {
///         "blackhole"
///     }
///
///     async fn send_email(&self, _params: &EmailParams) -> EmailResult {
///         EmailResult::sent(self.name(), "discarded")
///     }
/// }
/// ```
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Unique registry name (e.g. `"resend"`, `"sendgrid"`, `"smtp"`).
    fn name(&self) -> &str;

    /// Attempt delivery once.
    async fn send_email(&self, params: &EmailParams) -> EmailResult;
}

#[async_trait]
impl<P: EmailProvider + ?Sized> EmailProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn send_email(&self, params: &EmailParams) -> EmailResult {
        (**self).send_email(params).await
    }
}

/// Log an adapter outcome in a uniform format.
pub(crate) fn log_outcome(result: &EmailResult) {
    match (&result.message_id, &result.error) {
        (Some(id), _) if result.success => {
            tracing::debug!(provider = %result.provider, message_id = %id, "Provider accepted email")
        }
        (_, Some(error)) => {
            tracing::warn!(provider = %result.provider, error = %error, "Provider rejected email")
        }
        _ => tracing::debug!(provider = %result.provider, success = result.success, "Provider returned"),
    }
}
