//! Assertion helpers over [`MemoryProvider`].
//!
//! Failure messages list every captured email so a broken assertion shows
//! what was actually dispatched.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald::providers::MemoryProvider;
//! use herald::testing::*;
//!
//! #[tokio::test]
//! async fn test_signup_flow() {
//!     let inbox = Arc::new(MemoryProvider::named("resend"));
//!
//!     // ... trigger email sending ...
//!
//!     assert_email_sent(&inbox);
//!     assert_email_to(&inbox, "user@example.com");
//!     assert_email_subject_matches(&inbox, r"Your code is \d{6}");
//! }
//! ```

use regex::Regex;

use crate::params::EmailParams;
use crate::provider::EmailProvider;
use crate::providers::{MemoryProvider, SentEmail};

fn format_email_summary(emails: &[SentEmail]) -> String {
    if emails.is_empty() {
        return "  (no emails sent)".to_string();
    }

    emails
        .iter()
        .enumerate()
        .map(|(i, stored)| {
            let p = &stored.params;
            format!(
                "  {}. To: [{}], From: {}, Subject: \"{}\"",
                i + 1,
                p.recipient_emails().join(", "),
                p.from().email,
                p.subject()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("Invalid regex pattern '{}': {}", pattern, e))
}

// ============================================================================
// Basic Assertions
// ============================================================================

/// Assert that at least one email was sent.
///
/// # Panics
///
/// Panics if no emails were sent.
pub fn assert_email_sent(provider: &MemoryProvider) {
    assert!(
        provider.has_emails(),
        "Expected at least one email to be sent via '{}', but none were sent",
        provider.name()
    );
}

/// Assert that no emails were sent.
///
/// # Panics
///
/// Panics if any email was sent.
pub fn assert_no_emails_sent(provider: &MemoryProvider) {
    let emails = provider.emails();
    assert!(
        emails.is_empty(),
        "Expected no emails to be sent via '{}', but {} were sent.\n\nEmails sent:\n{}",
        provider.name(),
        emails.len(),
        format_email_summary(&emails)
    );
}

/// Assert that exactly N emails were sent.
///
/// # Panics
///
/// Panics if the count doesn't match.
pub fn assert_email_count(provider: &MemoryProvider, expected: usize) {
    let actual = provider.email_count();
    assert!(
        actual == expected,
        "Expected {} email(s) to be sent, but {} were sent.\n\nEmails sent:\n{}",
        expected,
        actual,
        format_email_summary(&provider.emails())
    );
}

/// Assert how many times the provider was asked to send, counting failures.
///
/// # Panics
///
/// Panics if the count doesn't match.
pub fn assert_attempt_count(provider: &MemoryProvider, expected: usize) {
    let actual = provider.attempt_count();
    assert!(
        actual == expected,
        "Expected '{}' to be attempted {} time(s), but it was attempted {} time(s)",
        provider.name(),
        expected,
        actual
    );
}

/// Assert that an email was sent to a specific address.
///
/// # Panics
///
/// Panics if no email was sent to the address.
pub fn assert_email_to(provider: &MemoryProvider, email: &str) {
    assert!(
        provider.sent_to(email),
        "Expected an email to be sent to '{}'.\n\nEmails sent:\n{}",
        email,
        format_email_summary(&provider.emails())
    );
}

/// Assert that no email was sent to a specific address.
///
/// # Panics
///
/// Panics if an email was sent to the address.
pub fn refute_email_to(provider: &MemoryProvider, email: &str) {
    let found = provider.find_emails(|p| {
        p.to()
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(email))
    });

    if let Some(first) = found.first() {
        panic!(
            "Expected no email to be sent to '{}', but found one.\n\nMatching email:\n  Subject: \"{}\"\n  From: {}\n\nAll emails:\n{}",
            email,
            first.params.subject(),
            first.params.from().email,
            format_email_summary(&provider.emails())
        );
    }
}

/// Assert that an email with the exact subject was sent.
///
/// # Panics
///
/// Panics if no email with the subject was found.
pub fn assert_email_subject(provider: &MemoryProvider, subject: &str) {
    assert!(
        provider.sent_with_subject(subject),
        "Expected an email with subject '{}'.\n\nEmails sent:\n{}",
        subject,
        format_email_summary(&provider.emails())
    );
}

/// Assert that an email with subject containing text was sent.
///
/// # Panics
///
/// Panics if no matching email was found.
pub fn assert_email_subject_contains(provider: &MemoryProvider, text: &str) {
    let found = provider.find_emails(|p| p.subject().contains(text));
    assert!(
        !found.is_empty(),
        "Expected an email with subject containing '{}'.\n\nEmails sent:\n{}",
        text,
        format_email_summary(&provider.emails())
    );
}

/// Assert that the most recent email came from a specific address.
///
/// # Panics
///
/// Panics if no email was sent or the from address doesn't match.
pub fn assert_email_from(provider: &MemoryProvider, from_email: &str) {
    let last = get_last_email(provider);
    let actual = &last.params.from().email;
    assert!(
        actual.eq_ignore_ascii_case(from_email),
        "Expected last email to be from '{}', but it was from '{}'",
        from_email,
        actual
    );
}

/// Assert that an email whose HTML body contains text was sent.
///
/// # Panics
///
/// Panics if no matching email was found.
pub fn assert_email_html_contains(provider: &MemoryProvider, text: &str) {
    let found = provider.find_emails(|p| p.html().contains(text));
    assert!(
        !found.is_empty(),
        "Expected an email with HTML body containing '{}'.\n\nEmails sent:\n{}",
        text,
        format_email_summary(&provider.emails())
    );
}

/// Assert that an email matching a predicate was sent.
///
/// # Panics
///
/// Panics if no matching email was found.
pub fn assert_email_matches<F>(provider: &MemoryProvider, predicate: F)
where
    F: Fn(&EmailParams) -> bool,
{
    let matches = provider.find_emails(predicate);
    assert!(
        !matches.is_empty(),
        "Expected an email matching the predicate, but none was found.\n\nEmails sent:\n{}",
        format_email_summary(&provider.emails())
    );
}

// ============================================================================
// Regex Assertions
// ============================================================================

/// Assert that an email with subject matching a regex was sent.
///
/// # Panics
///
/// Panics if the pattern is invalid or no matching email was found.
pub fn assert_email_subject_matches(provider: &MemoryProvider, pattern: &str) {
    let re = compile(pattern);
    let found = provider.find_emails(|p| re.is_match(p.subject()));
    assert!(
        !found.is_empty(),
        "Expected an email with subject matching /{}/.\n\nEmails sent:\n{}",
        pattern,
        format_email_summary(&provider.emails())
    );
}

/// Assert that an email with HTML body matching a regex was sent.
///
/// # Panics
///
/// Panics if the pattern is invalid or no matching email was found.
pub fn assert_email_html_matches(provider: &MemoryProvider, pattern: &str) {
    let re = compile(pattern);
    let found = provider.find_emails(|p| re.is_match(p.html()));
    assert!(
        !found.is_empty(),
        "Expected an email with HTML body matching /{}/.\n\nEmails sent:\n{}",
        pattern,
        format_email_summary(&provider.emails())
    );
}

// ============================================================================
// Accessors
// ============================================================================

/// Get the last email sent, or panic if none.
///
/// # Panics
///
/// Panics if no emails were sent.
pub fn get_last_email(provider: &MemoryProvider) -> SentEmail {
    provider
        .last_email()
        .expect("Expected at least one email to be sent, but none were sent")
}

/// Get all emails sent to a specific address.
pub fn get_emails_to(provider: &MemoryProvider, email: &str) -> Vec<SentEmail> {
    provider.find_emails(|p| {
        p.to()
            .iter()
            .any(|addr| addr.email.eq_ignore_ascii_case(email))
    })
}

/// Flush and return all emails from the provider.
pub fn flush_emails(provider: &MemoryProvider) -> Vec<SentEmail> {
    provider.flush()
}
