//! Server configuration
//!
//! All settings are read once at startup (after `.env` is loaded) and passed
//! into `AppState` explicitly. Nothing downstream reads the environment.

use std::time::Duration;

use thiserror::Error;

/// Google's server-side verification endpoint
pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Upper bound on a single verification call
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 5;

/// Largest timeout accepted from configuration
pub const MAX_VERIFY_TIMEOUT: Duration = Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS);

const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange { name: &'static str, value: u64, min: u64, max: u64 },
}

/// reCAPTCHA credentials and endpoint
#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    /// Site key rendered into the client-side widget
    pub public_key: String,
    /// Secret sent to the verification endpoint; never rendered or logged
    pub private_key: String,
    pub verify_url: String,
    pub timeout: Duration,
}

impl CaptchaConfig {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS),
        }
    }

    pub fn with_verify_url(mut self, url: impl Into<String>) -> Self {
        self.verify_url = url.into();
        self
    }

    /// Capped at `MAX_VERIFY_TIMEOUT`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(MAX_VERIFY_TIMEOUT);
        self
    }
}

/// Addresses used for contact-form notification emails
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub to_address: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub captcha: CaptchaConfig,
    pub notification: NotificationConfig,
}

impl ServerConfig {
    /// Build configuration from environment variables
    ///
    /// Missing reCAPTCHA keys are allowed: verification then fails closed and
    /// every async submission is rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, with an injectable lookup for tests
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let public_key = lookup("RECAPTCHA_PUBLIC_KEY").unwrap_or_default();
        let private_key = lookup("RECAPTCHA_PRIVATE_KEY").unwrap_or_default();
        if public_key.is_empty() || private_key.is_empty() {
            tracing::warn!("reCAPTCHA keys not configured; async submissions will be rejected");
        }

        let verify_url = lookup("RECAPTCHA_VERIFY_URL")
            .unwrap_or_else(|| DEFAULT_VERIFY_URL.to_string());

        let timeout_secs = match lookup("RECAPTCHA_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                name: "RECAPTCHA_TIMEOUT_SECS",
                value,
            })?,
            None => DEFAULT_VERIFY_TIMEOUT_SECS,
        };
        if !(1..=DEFAULT_VERIFY_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(ConfigError::OutOfRange {
                name: "RECAPTCHA_TIMEOUT_SECS",
                value: timeout_secs,
                min: 1,
                max: DEFAULT_VERIFY_TIMEOUT_SECS,
            });
        }

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let from_address = lookup("CONTACT_FROM_ADDRESS")
            .unwrap_or_else(|| "noreply@localhost".to_string());
        let to_address = lookup("CONTACT_TO_ADDRESS").unwrap_or_else(|| from_address.clone());

        Ok(Self {
            port,
            captcha: CaptchaConfig::new(public_key, private_key)
                .with_verify_url(verify_url)
                .with_timeout(Duration::from_secs(timeout_secs)),
            notification: NotificationConfig {
                to_address,
                from_address,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.captcha.verify_url, DEFAULT_VERIFY_URL);
        assert_eq!(config.captcha.timeout, Duration::from_secs(5));
        assert!(config.captcha.public_key.is_empty());
        assert_eq!(config.notification.to_address, "noreply@localhost");
    }

    #[test]
    fn test_reads_keys_and_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("RECAPTCHA_PUBLIC_KEY", "site-key"),
            ("RECAPTCHA_PRIVATE_KEY", "secret-key"),
            ("RECAPTCHA_TIMEOUT_SECS", "2"),
            ("PORT", "8080"),
            ("CONTACT_TO_ADDRESS", "office@example.org"),
        ]))
        .unwrap();

        assert_eq!(config.captcha.public_key, "site-key");
        assert_eq!(config.captcha.private_key, "secret-key");
        assert_eq!(config.captcha.timeout, Duration::from_secs(2));
        assert_eq!(config.port, 8080);
        assert_eq!(config.notification.to_address, "office@example.org");
    }

    #[test]
    fn test_rejects_bad_port() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = ServerConfig::from_lookup(lookup_from(&[("RECAPTCHA_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { value: 0, .. }));
    }

    #[test]
    fn test_rejects_timeout_above_five_seconds() {
        let err = ServerConfig::from_lookup(lookup_from(&[("RECAPTCHA_TIMEOUT_SECS", "60")])).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { value: 60, .. }));
        assert!(err.to_string().contains("RECAPTCHA_TIMEOUT_SECS"));
    }

    #[test]
    fn test_builder_timeout_is_capped() {
        let config = CaptchaConfig::new("site", "secret").with_timeout(Duration::from_secs(60));
        assert_eq!(config.timeout, MAX_VERIFY_TIMEOUT);

        let config = CaptchaConfig::new("site", "secret").with_timeout(Duration::from_millis(200));
        assert_eq!(config.timeout, Duration::from_millis(200));
    }
}
