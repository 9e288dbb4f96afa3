//! In-memory provider for development and testing.
//!
//! Captures every accepted email instead of sending it, and counts every
//! attempt (including simulated failures) so fallback behaviour can be
//! asserted on.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald::providers::MemoryProvider;
//! use herald::testing::*;
//!
//! #[tokio::test]
//! async fn falls_back_when_primary_is_down() {
//!     let primary = Arc::new(MemoryProvider::named("resend"));
//!     primary.set_failure("rate limited");
//!     let backup = Arc::new(MemoryProvider::named("sendgrid"));
//!
//!     // ... dispatch through a SmartSender ...
//!
//!     assert_attempt_count(&primary, 1);
//!     assert_no_emails_sent(&primary);
//!     assert_email_to(&backup, "user@example.com");
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::params::EmailParams;
use crate::provider::{log_outcome, EmailProvider};
use crate::result::EmailResult;

/// An email captured by [`MemoryProvider`].
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Message ID handed back in the result.
    pub id: String,
    /// The email as dispatched.
    pub params: EmailParams,
    /// When it was captured.
    pub sent_at: DateTime<Utc>,
}

/// Provider that stores emails in memory.
#[derive(Debug)]
pub struct MemoryProvider {
    name: String,
    sent: RwLock<Vec<SentEmail>>,
    attempts: AtomicUsize,
    /// If set, send_email() fails with this message.
    fail_with: RwLock<Option<String>>,
}

impl MemoryProvider {
    /// Create a provider registered as `"memory"`.
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Create a provider with a specific registry name.
    ///
    /// Useful for standing in for a real provider (`"resend"`, `"sendgrid"`).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sent: RwLock::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail_with: RwLock::new(None),
        }
    }

    // =========================================================================
    // Failure Simulation
    // =========================================================================

    /// Make every subsequent send fail with `message`.
    pub fn set_failure(&self, message: impl Into<String>) {
        *self.fail_with.write() = Some(message.into());
    }

    /// Clear the failure state.
    pub fn clear_failure(&self) {
        *self.fail_with.write() = None;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// All captured emails, oldest first.
    pub fn emails(&self) -> Vec<SentEmail> {
        self.sent.read().clone()
    }

    /// The most recently captured email.
    pub fn last_email(&self) -> Option<SentEmail> {
        self.sent.read().last().cloned()
    }

    /// Number of captured emails.
    pub fn email_count(&self) -> usize {
        self.sent.read().len()
    }

    /// Number of times `send_email` was called, successful or not.
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Check if any email was captured.
    pub fn has_emails(&self) -> bool {
        !self.sent.read().is_empty()
    }

    /// Check if an email was sent to a specific address.
    pub fn sent_to(&self, email: &str) -> bool {
        self.sent.read().iter().any(|stored| {
            stored
                .params
                .to()
                .iter()
                .any(|addr| addr.email.eq_ignore_ascii_case(email))
        })
    }

    /// Check if an email with exactly this subject was sent.
    pub fn sent_with_subject(&self, subject: &str) -> bool {
        self.sent
            .read()
            .iter()
            .any(|stored| stored.params.subject() == subject)
    }

    /// Find captured emails matching a predicate.
    pub fn find_emails<F>(&self, predicate: F) -> Vec<SentEmail>
    where
        F: Fn(&EmailParams) -> bool,
    {
        self.sent
            .read()
            .iter()
            .filter(|stored| predicate(&stored.params))
            .cloned()
            .collect()
    }

    /// Remove and return all captured emails. Resets the attempt counter.
    pub fn flush(&self) -> Vec<SentEmail> {
        self.attempts.store(0, Ordering::SeqCst);
        std::mem::take(&mut *self.sent.write())
    }

    /// Clear all captured emails and the attempt counter.
    pub fn clear(&self) {
        self.flush();
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_email(&self, params: &EmailParams) -> EmailResult {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failure = self.fail_with.read().clone();
        let result = match failure {
            Some(message) => EmailResult::failed(&self.name, message),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                self.sent.write().push(SentEmail {
                    id: id.clone(),
                    params: params.clone(),
                    sent_at: Utc::now(),
                });
                EmailResult::sent(&self.name, id)
            }
        };

        log_outcome(&result);
        result
    }
}
