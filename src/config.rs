//! Startup configuration.
//!
//! Credentials are read once, from the environment or any key lookup, and
//! injected into providers as they are built. The registry and sender never
//! read configuration themselves.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `RESEND_API_KEY` | Enables the Resend provider |
//! | `RESEND_BASE_URL` | Resend API base URL override |
//! | `SENDGRID_API_KEY` | Enables the SendGrid provider |
//! | `SENDGRID_BASE_URL` | SendGrid API base URL override |
//! | `SMTP_HOST` | Enables the SMTP provider |
//! | `SMTP_PORT` | SMTP port (default: 587) |
//! | `SMTP_USERNAME` | SMTP username |
//! | `SMTP_PASSWORD` | SMTP password |
//! | `SMTP_TLS` | `starttls` (default), `tls` or `none` |
//! | `EMAIL_FALLBACK_ORDER` | Comma-separated provider names, e.g. `resend,sendgrid` |
//! | `EMAIL_TIMEOUT_SECS` | Per-provider network timeout (default: 30) |

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::MailError;
use crate::registry::ProviderRegistry;
use crate::sender::SmartSender;

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// TLS mode for SMTP connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// No TLS (dangerous, only for localhost)
    None,
    /// STARTTLS - upgrade to TLS after connecting (port 587)
    #[default]
    StartTls,
    /// Implicit TLS - connect with TLS from start (port 465)
    Tls,
}

impl std::str::FromStr for TlsMode {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" | "false" => Ok(Self::None),
            "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            other => Err(MailError::Configuration(format!(
                "Unknown SMTP TLS mode: {}. Valid modes are: none, starttls, tls",
                other
            ))),
        }
    }
}

/// SMTP connection settings.
///
/// Deserializable so a settings form can post it directly to
/// [`self_test`](crate::providers::self_test).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port (default: 587)
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Username for authentication
    #[serde(default)]
    pub username: Option<String>,
    /// Password for authentication
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub tls: TlsMode,
    /// Connection/command timeout in seconds; the transport default applies when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl SmtpConfig {
    /// Create a configuration for `host` with STARTTLS on port 587.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            tls: TlsMode::StartTls,
            timeout_secs: None,
        }
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set authentication credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set TLS mode.
    pub fn tls(mut self, mode: TlsMode) -> Self {
        self.tls = mode;
        self
    }

    /// Set the connection timeout, rounded up to whole seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self.timeout_secs = Some(secs.max(1));
        self
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("tls", &self.tls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Credentials for an HTTP API provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyConfig {
    pub api_key: String,
    /// Base URL override (staging endpoints, mock servers).
    pub base_url: Option<String>,
}

impl fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Provider credentials and dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub resend: Option<ApiKeyConfig>,
    pub sendgrid: Option<ApiKeyConfig>,
    pub smtp: Option<SmtpConfig>,
    /// Explicit fallback order. When unset, configured providers are tried
    /// as resend, sendgrid, smtp.
    pub fallback_order: Option<Vec<String>>,
    /// Network timeout applied to each provider call.
    pub timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            resend: None,
            sendgrid: None,
            smtp: None,
            fallback_order: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl DispatchConfig {
    /// Read configuration from environment variables.
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let resend = get("RESEND_API_KEY").map(|api_key| ApiKeyConfig {
            api_key,
            base_url: get("RESEND_BASE_URL"),
        });

        let sendgrid = get("SENDGRID_API_KEY").map(|api_key| ApiKeyConfig {
            api_key,
            base_url: get("SENDGRID_BASE_URL"),
        });

        let timeout = match get("EMAIL_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(MailError::Configuration(
                        "EMAIL_TIMEOUT_SECS must be at least 1".into(),
                    ))
                }
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    return Err(MailError::Configuration(format!(
                        "EMAIL_TIMEOUT_SECS is not a number: {}",
                        raw
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let smtp = match get("SMTP_HOST") {
            Some(host) => {
                let port = match get("SMTP_PORT") {
                    Some(raw) => raw.trim().parse().map_err(|_| {
                        MailError::Configuration(format!("SMTP_PORT is not a valid port: {}", raw))
                    })?,
                    None => DEFAULT_SMTP_PORT,
                };
                let tls = match get("SMTP_TLS") {
                    Some(raw) => raw.parse()?,
                    None => TlsMode::StartTls,
                };
                Some(SmtpConfig {
                    host,
                    port,
                    username: get("SMTP_USERNAME"),
                    password: get("SMTP_PASSWORD"),
                    tls,
                    timeout_secs: Some(timeout.as_secs()),
                })
            }
            None => None,
        };

        let fallback_order = get("EMAIL_FALLBACK_ORDER").map(|raw| {
            raw.split(',')
                .map(|name| name.trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect()
        });

        Ok(Self {
            resend,
            sendgrid,
            smtp,
            fallback_order,
            timeout,
        })
    }

    /// Whether any provider has credentials.
    pub fn is_configured(&self) -> bool {
        self.resend.is_some() || self.sendgrid.is_some() || self.smtp.is_some()
    }

    /// The order providers will be tried in.
    pub fn fallback_order(&self) -> Vec<String> {
        if let Some(order) = &self.fallback_order {
            return order.clone();
        }

        let mut order = Vec::new();
        if self.resend.is_some() {
            order.push("resend".to_string());
        }
        if self.sendgrid.is_some() {
            order.push("sendgrid".to_string());
        }
        if self.smtp.is_some() {
            order.push("smtp".to_string());
        }
        order
    }

    /// Build every configured provider and register it.
    pub fn build_registry(&self) -> Result<Arc<ProviderRegistry>, MailError> {
        if !self.is_configured() {
            return Err(MailError::NotConfigured);
        }

        let registry = ProviderRegistry::shared();

        if let Some(resend) = &self.resend {
            self.register_resend(&registry, resend)?;
        }
        if let Some(sendgrid) = &self.sendgrid {
            self.register_sendgrid(&registry, sendgrid)?;
        }
        if let Some(smtp) = &self.smtp {
            self.register_smtp(&registry, smtp)?;
        }

        tracing::info!(
            providers = ?registry.available_providers(),
            order = ?self.fallback_order(),
            "Email providers configured"
        );

        Ok(registry)
    }

    /// Build the registry and a sender using the configured fallback order.
    pub fn build_sender(&self) -> Result<SmartSender, MailError> {
        let registry = self.build_registry()?;

        for name in self.fallback_order() {
            if !registry.contains(&name) {
                tracing::warn!(provider = %name, "EMAIL_FALLBACK_ORDER names a provider that is not configured");
            }
        }

        Ok(SmartSender::from_registry(registry).with_fallback_order(self.fallback_order()))
    }

    #[cfg(feature = "resend")]
    fn register_resend(
        &self,
        registry: &ProviderRegistry,
        config: &ApiKeyConfig,
    ) -> Result<(), MailError> {
        let mut provider =
            crate::providers::ResendProvider::new(&config.api_key).timeout(self.timeout);
        if let Some(url) = &config.base_url {
            provider = provider.base_url(url);
        }
        registry.register(Arc::new(provider));
        Ok(())
    }

    #[cfg(not(feature = "resend"))]
    fn register_resend(
        &self,
        _registry: &ProviderRegistry,
        _config: &ApiKeyConfig,
    ) -> Result<(), MailError> {
        Err(MailError::Configuration(
            "RESEND_API_KEY is set but 'resend' feature is not enabled. \
            Add `features = [\"resend\"]` to Cargo.toml"
                .into(),
        ))
    }

    #[cfg(feature = "sendgrid")]
    fn register_sendgrid(
        &self,
        registry: &ProviderRegistry,
        config: &ApiKeyConfig,
    ) -> Result<(), MailError> {
        let mut provider =
            crate::providers::SendGridProvider::new(&config.api_key).timeout(self.timeout);
        if let Some(url) = &config.base_url {
            provider = provider.base_url(url);
        }
        registry.register(Arc::new(provider));
        Ok(())
    }

    #[cfg(not(feature = "sendgrid"))]
    fn register_sendgrid(
        &self,
        _registry: &ProviderRegistry,
        _config: &ApiKeyConfig,
    ) -> Result<(), MailError> {
        Err(MailError::Configuration(
            "SENDGRID_API_KEY is set but 'sendgrid' feature is not enabled. \
            Add `features = [\"sendgrid\"]` to Cargo.toml"
                .into(),
        ))
    }

    #[cfg(feature = "smtp")]
    fn register_smtp(&self, registry: &ProviderRegistry, config: &SmtpConfig) -> Result<(), MailError> {
        let provider = crate::providers::SmtpProvider::from_config(config)?;
        registry.register(Arc::new(provider));
        Ok(())
    }

    #[cfg(not(feature = "smtp"))]
    fn register_smtp(&self, _registry: &ProviderRegistry, _config: &SmtpConfig) -> Result<(), MailError> {
        Err(MailError::Configuration(
            "SMTP_HOST is set but 'smtp' feature is not enabled. \
            Add `features = [\"smtp\"]` to Cargo.toml"
                .into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment() {
        let config = DispatchConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.is_configured());
        assert!(config.fallback_order().is_empty());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(matches!(
            config.build_registry().unwrap_err(),
            MailError::NotConfigured
        ));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config =
            DispatchConfig::from_lookup(lookup(&[("RESEND_API_KEY", "  "), ("SMTP_HOST", "")]))
                .unwrap();
        assert!(!config.is_configured());
    }

    #[test]
    fn test_derived_fallback_order() {
        let config = DispatchConfig::from_lookup(lookup(&[
            ("SMTP_HOST", "smtp.gmail.com"),
            ("SENDGRID_API_KEY", "SG.xxx"),
            ("RESEND_API_KEY", "re_xxx"),
        ]))
        .unwrap();

        assert_eq!(config.fallback_order(), vec!["resend", "sendgrid", "smtp"]);
    }

    #[test]
    fn test_explicit_fallback_order() {
        let config = DispatchConfig::from_lookup(lookup(&[
            ("RESEND_API_KEY", "re_xxx"),
            ("EMAIL_FALLBACK_ORDER", " SendGrid , resend,, "),
        ]))
        .unwrap();

        assert_eq!(config.fallback_order(), vec!["sendgrid", "resend"]);
    }

    #[test]
    fn test_smtp_settings() {
        let config = DispatchConfig::from_lookup(lookup(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_USERNAME", "me"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_TLS", "tls"),
            ("EMAIL_TIMEOUT_SECS", "10"),
        ]))
        .unwrap();

        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.username.as_deref(), Some("me"));
        assert_eq!(smtp.password.as_deref(), Some("secret"));
        assert_eq!(smtp.tls, TlsMode::Tls);
        assert_eq!(smtp.timeout_secs, Some(10));
    }

    #[test]
    fn test_invalid_numbers() {
        let err = DispatchConfig::from_lookup(lookup(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "seventy"),
        ]))
        .unwrap_err();
        assert!(matches!(err, MailError::Configuration(msg) if msg.contains("SMTP_PORT")));

        let err = DispatchConfig::from_lookup(lookup(&[("EMAIL_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, MailError::Configuration(msg) if msg.contains("EMAIL_TIMEOUT_SECS")));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = DispatchConfig::from_lookup(lookup(&[("EMAIL_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, MailError::Configuration(msg) if msg.contains("at least 1")));
    }

    #[test]
    fn test_smtp_timeout_rounds_up() {
        let config = SmtpConfig::new("smtp.example.com").timeout(Duration::from_millis(500));
        assert_eq!(config.timeout_secs, Some(1));

        let config = SmtpConfig::new("smtp.example.com").timeout(Duration::from_millis(2500));
        assert_eq!(config.timeout_secs, Some(3));

        let config = SmtpConfig::new("smtp.example.com").timeout(Duration::from_secs(10));
        assert_eq!(config.timeout_secs, Some(10));

        let config = SmtpConfig::new("smtp.example.com").timeout(Duration::ZERO);
        assert_eq!(config.timeout_secs, Some(1));
    }

    #[test]
    fn test_tls_mode_parse() {
        assert_eq!("starttls".parse::<TlsMode>().unwrap(), TlsMode::StartTls);
        assert_eq!("TLS".parse::<TlsMode>().unwrap(), TlsMode::Tls);
        assert_eq!("none".parse::<TlsMode>().unwrap(), TlsMode::None);
        assert!("sometimes".parse::<TlsMode>().is_err());
    }

    #[test]
    fn test_smtp_config_deserialize_defaults() {
        let config: SmtpConfig = serde_json::from_value(serde_json::json!({
            "host": "smtp.gmail.com",
            "username": "me@gmail.com",
            "password": "app-password"
        }))
        .unwrap();

        assert_eq!(config.port, 587);
        assert_eq!(config.tls, TlsMode::StartTls);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = DispatchConfig::from_lookup(lookup(&[
            ("RESEND_API_KEY", "re_supersecret"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PASSWORD", "hunter2"),
        ]))
        .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("re_supersecret"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[cfg(all(feature = "resend", feature = "sendgrid"))]
    #[test]
    fn test_build_sender() {
        let config = DispatchConfig::from_lookup(lookup(&[
            ("RESEND_API_KEY", "re_xxx"),
            ("SENDGRID_API_KEY", "SG.xxx"),
        ]))
        .unwrap();

        let sender = config.build_sender().unwrap();
        assert_eq!(sender.fallback_order(), &["resend", "sendgrid"]);
        assert_eq!(
            sender.registry().available_providers(),
            vec!["resend", "sendgrid"]
        );
    }
}
