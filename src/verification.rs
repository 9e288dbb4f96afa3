//! Sign-up verification codes.
//!
//! Delivery is best-effort: a failed send is logged and reported in the
//! returned [`EmailResult`], and account creation is expected to proceed.

use crate::address::Address;
use crate::error::MailError;
use crate::params::EmailParams;
use crate::result::{EmailResult, NO_PROVIDER};
use crate::sender::SmartSender;

const CODE_DIGITS: u32 = 6;

/// Sender identity and wording for verification emails.
#[derive(Debug, Clone)]
pub struct VerificationEmail {
    pub from: Address,
    /// Product name shown in the subject and body.
    pub app_name: String,
    /// Subject override. Defaults to `"Your {app_name} verification code"`.
    pub subject: Option<String>,
}

impl VerificationEmail {
    pub fn new(from: impl Into<Address>, app_name: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            app_name: app_name.into(),
            subject: None,
        }
    }

    /// Override the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Build the email carrying `code` to `to`.
    pub fn params(&self, to: impl Into<Address>, code: &str) -> Result<EmailParams, MailError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(MailError::EmptyField("code"));
        }

        let subject = self
            .subject
            .clone()
            .unwrap_or_else(|| format!("Your {} verification code", self.app_name));

        EmailParams::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .html(self.render(code))
            .build()
    }

    fn render(&self, code: &str) -> String {
        let app = html_escape(&self.app_name);
        format!(
            "<div style=\"font-family:sans-serif;max-width:480px;margin:0 auto\">\
            <h2>Verify your email</h2>\
            <p>Use this code to finish signing up for {app}:</p>\
            <p style=\"font-size:32px;font-weight:bold;letter-spacing:6px\">{code}</p>\
            <p style=\"color:#666\">If you didn't request this, you can ignore this email.</p>\
            </div>",
            app = app,
            code = html_escape(code),
        )
    }
}

/// Generate a random six-digit code.
///
/// `rand::rng()` is a CSPRNG reseeded from the OS.
pub fn generate_code() -> String {
    use rand::Rng;

    let n = rand::rng().random_range(0..10u32.pow(CODE_DIGITS));
    format!("{:0width$}", n, width = CODE_DIGITS as usize)
}

/// Send a verification code through `sender`.
///
/// Never fails: invalid input and dispatch failures both come back as a
/// failed result after a warning is logged.
pub async fn send_verification_code(
    sender: &SmartSender,
    template: &VerificationEmail,
    to: &str,
    code: &str,
) -> EmailResult {
    let params = match Address::parse(to).and_then(|addr| template.params(addr, code)) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!(to = %to, error = %e, "Verification email not sent");
            return EmailResult::failed(NO_PROVIDER, e.to_string());
        }
    };

    let result = sender.send_email(&params).await;
    if result.success {
        tracing::info!(to = %to, provider = %result.provider, "Verification email sent");
    } else {
        tracing::warn!(
            to = %to,
            error = result.error.as_deref().unwrap_or("unknown"),
            "Verification email failed, continuing without it"
        );
    }
    result
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
