//! Outbound email request types.
//!
//! [`EmailParams`] is the validated, immutable value handed to providers.
//! [`EmailRequest`] is the loose shape a caller-facing boundary (an HTTP
//! handler, a job payload) deserializes before validating it into params.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::address::Address;
use crate::error::MailError;

/// A validated outbound email.
///
/// Only obtainable through [`EmailParams::builder`] or
/// [`EmailRequest::validate`], both of which run the pre-dispatch checks.
/// Fields are read-only once built.
///
/// ```
/// use herald::EmailParams;
///
/// let params = EmailParams::builder()
///     .from("noreply@example.com")
///     .to("user@example.com")
///     .subject("Welcome!")
///     .html("<p>Thanks for signing up.</p>")
///     .build()
///     .unwrap();
///
/// assert_eq!(params.to().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailParams {
    from: Address,
    to: Vec<Address>,
    subject: String,
    html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<Address>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
}

impl EmailParams {
    /// Start building a new email.
    pub fn builder() -> EmailParamsBuilder {
        EmailParamsBuilder::default()
    }

    /// Sender mailbox.
    pub fn from(&self) -> &Address {
        &self.from
    }

    /// Recipients, in the order they were added.
    pub fn to(&self) -> &[Address] {
        &self.to
    }

    /// Subject line.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// HTML body.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Reply-to mailbox, if any.
    pub fn reply_to(&self) -> Option<&Address> {
        self.reply_to.as_ref()
    }

    /// Custom headers, passed through verbatim where the provider supports them.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Bare recipient addresses (no display names).
    pub fn recipient_emails(&self) -> Vec<&str> {
        self.to.iter().map(|a| a.email.as_str()).collect()
    }
}

/// Builder for [`EmailParams`].
#[derive(Debug, Clone, Default)]
pub struct EmailParamsBuilder {
    from: Option<Address>,
    to: Vec<Address>,
    subject: String,
    html: String,
    reply_to: Option<Address>,
    headers: BTreeMap<String, String>,
}

impl EmailParamsBuilder {
    /// Set the sender.
    pub fn from(mut self, addr: impl Into<Address>) -> Self {
        self.from = Some(addr.into());
        self
    }

    /// Add a recipient. Can be called multiple times.
    pub fn to(mut self, addr: impl Into<Address>) -> Self {
        self.to.push(addr.into());
        self
    }

    /// Replace all recipients.
    pub fn put_to(mut self, addrs: Vec<Address>) -> Self {
        self.to = addrs;
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the HTML body.
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = body.into();
        self
    }

    /// Set the reply-to mailbox.
    pub fn reply_to(mut self, addr: impl Into<Address>) -> Self {
        self.reply_to = Some(addr.into());
        self
    }

    /// Add a custom header. A repeated name replaces the earlier value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Validate and freeze the email.
    ///
    /// A single malformed recipient rejects the whole request.
    pub fn build(self) -> Result<EmailParams, MailError> {
        let from = self
            .from
            .ok_or(MailError::MissingField("from"))?
            .validated()?;

        if self.to.is_empty() {
            return Err(MailError::MissingField("to"));
        }
        let to = self
            .to
            .into_iter()
            .map(Address::validated)
            .collect::<Result<Vec<_>, _>>()?;

        let reply_to = self.reply_to.map(Address::validated).transpose()?;

        if self.subject.trim().is_empty() {
            return Err(MailError::EmptyField("subject"));
        }
        if self.html.trim().is_empty() {
            return Err(MailError::EmptyField("html"));
        }

        Ok(EmailParams {
            from,
            to,
            subject: self.subject,
            html: self.html,
            reply_to,
            headers: self.headers,
        })
    }
}

/// Unvalidated email request as received from a caller.
///
/// Keys are camelCase (`replyTo`); `to` may be a single string or a list.
///
/// ```
/// use herald::EmailRequest;
///
/// let request: EmailRequest = serde_json::from_str(r#"{
///     "from": "Acme <noreply@acme.io>",
///     "to": "user@example.com",
///     "subject": "Hi",
///     "html": "<p>hi</p>"
/// }"#).unwrap();
///
/// let params = request.validate().unwrap();
/// assert_eq!(params.from().name.as_deref(), Some("Acme"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Recipients,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// One recipient or many.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Default for Recipients {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl Recipients {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(addr) => vec![addr],
            Self::Many(addrs) => addrs,
        }
    }
}

impl EmailRequest {
    /// Run the pre-dispatch checks and produce immutable [`EmailParams`].
    pub fn validate(self) -> Result<EmailParams, MailError> {
        let from = match self.from {
            Some(from) if !from.trim().is_empty() => Address::parse(&from)?,
            _ => return Err(MailError::MissingField("from")),
        };

        let to = self
            .to
            .into_vec()
            .iter()
            .map(|addr| Address::parse(addr))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = EmailParams::builder()
            .from(from)
            .put_to(to)
            .subject(self.subject)
            .html(self.html);

        if let Some(reply_to) = self.reply_to.filter(|r| !r.trim().is_empty()) {
            builder = builder.reply_to(Address::parse(&reply_to)?);
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        builder.build()
    }
}
