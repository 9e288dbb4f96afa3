//! Email address type with optional display name.

use crate::error::MailError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// `local-part@domain`, no whitespace, at least one dot in the domain.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// An email address with an optional display name.
///
/// # Examples
///
/// ```
/// use herald::Address;
///
/// // From email string
/// let addr: Address = "user@example.com".into();
/// assert_eq!(addr.email, "user@example.com");
/// assert_eq!(addr.name, None);
///
/// // From tuple (name, email)
/// let addr: Address = ("Alice", "alice@example.com").into();
/// assert_eq!(addr.email, "alice@example.com");
/// assert_eq!(addr.name, Some("Alice".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Optional display name (e.g., "Alice Smith")
    pub name: Option<String>,
    /// Email address (e.g., "alice@example.com")
    pub email: String,
}

impl Address {
    /// Create a new address with just an email.
    ///
    /// No validation happens here; [`EmailParams`](crate::EmailParams) validates
    /// every address when it is built.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Create a new address with a name and email.
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() { None } else { Some(name) },
            email: email.into(),
        }
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check a bare address against the basic syntax rule.
    ///
    /// ```
    /// use herald::Address;
    ///
    /// assert!(Address::is_valid_email("user@example.com"));
    /// assert!(!Address::is_valid_email("user@localhost"));
    /// assert!(!Address::is_valid_email("user @example.com"));
    /// ```
    pub fn is_valid_email(email: &str) -> bool {
        email_regex().is_match(email)
    }

    /// Whether this address passes the basic syntax rule.
    pub fn is_valid(&self) -> bool {
        Self::is_valid_email(&self.email)
    }

    /// Return `self` if the address is valid, otherwise an `InvalidAddress` error.
    pub fn validated(self) -> Result<Self, MailError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(MailError::InvalidAddress(format!(
                "'{}' is not a valid email address",
                self.email
            )))
        }
    }

    /// Parse and validate a mailbox.
    ///
    /// Accepts `user@example.com` or `Display Name <user@example.com>`.
    ///
    /// ```
    /// use herald::Address;
    ///
    /// let addr = Address::parse("Alice <alice@example.com>").unwrap();
    /// assert_eq!(addr.name.as_deref(), Some("Alice"));
    /// assert_eq!(addr.email, "alice@example.com");
    ///
    /// assert!(Address::parse("not-an-email").is_err());
    /// assert!(Address::parse("").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, MailError> {
        let input = input.trim();

        let addr = match (input.rfind('<'), input.ends_with('>')) {
            (Some(open), true) => {
                let email = input[open + 1..input.len() - 1].trim();
                let name = input[..open].trim().trim_matches('"').trim();
                Self::with_name(name, email)
            }
            _ => Self::new(input),
        };

        addr.validated()
    }

    /// Convert the domain part of the email address to ASCII (Punycode).
    ///
    /// The local part (before @) is preserved as-is.
    ///
    /// ```
    /// use herald::Address;
    ///
    /// let addr = Address::new("user@例え.jp");
    /// assert_eq!(addr.to_ascii().unwrap(), "user@xn--r8jz45g.jp");
    /// ```
    pub fn to_ascii(&self) -> Result<String, MailError> {
        let (local_part, domain) = self.email.split_once('@').ok_or_else(|| {
            MailError::InvalidAddress(format!("'{}' is missing @ symbol", self.email))
        })?;

        let ascii_domain = idna::domain_to_ascii(domain).map_err(|e| {
            MailError::InvalidAddress(format!(
                "Failed to convert domain '{}' to ASCII: {:?}",
                domain, e
            ))
        })?;

        Ok(format!("{}@{}", local_part, ascii_domain))
    }

    /// Format as "Name <email>" or just "email" if no name.
    pub fn formatted(&self) -> String {
        match &self.name {
            Some(name) if name.is_empty() => self.email.clone(),
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }

    /// Format according to RFC 5322, quoting and escaping the display name.
    pub fn formatted_rfc5322(&self) -> String {
        match &self.name {
            Some(name) if name.is_empty() => self.email.clone(),
            Some(name) => {
                // Escape backslashes first, then quotes
                let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\" <{}>", escaped, self.email)
            }
            None => self.email.clone(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl FromStr for Address {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

impl From<String> for Address {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

impl From<&String> for Address {
    fn from(email: &String) -> Self {
        Self::new(email.as_str())
    }
}

// (name, email)
impl From<(&str, &str)> for Address {
    fn from((name, email): (&str, &str)) -> Self {
        Self::with_name(name, email)
    }
}

impl From<(String, String)> for Address {
    fn from((name, email): (String, String)) -> Self {
        Self::with_name(name, email)
    }
}
