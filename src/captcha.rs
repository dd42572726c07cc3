//! reCAPTCHA verification client
//!
//! One form-encoded POST per submission attempt (`secret`, `response`,
//! `remoteip`), bounded by the configured timeout. No retries: any transport
//! error, timeout or unparseable body is reported as `VerifyError` and the
//! caller treats it exactly like `success: false`.

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CaptchaConfig;

/// Body returned by the siteverify endpoint
///
/// A body without `success` deserializes as a failed verification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "error-codes", default, skip_serializing_if = "Vec::is_empty")]
    pub error_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl VerificationOutcome {
    pub fn passed() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn rejected(code: impl Into<String>) -> Self {
        Self {
            success: false,
            error_codes: vec![code.into()],
            ..Default::default()
        }
    }
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Verification request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Verification service returned status {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for VerifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VerifyError::Timeout
        } else if err.is_decode() {
            VerifyError::InvalidResponse(err.to_string())
        } else {
            VerifyError::Network(err.to_string())
        }
    }
}

/// Anything that can check a CAPTCHA token
///
/// Object-safe so `AppState` can hold it behind an `Arc<dyn _>`.
pub trait CaptchaVerifier: Send + Sync {
    fn verify<'a>(
        &'a self,
        token: &'a str,
        remote_ip: Option<&'a str>,
    ) -> BoxFuture<'a, Result<VerificationOutcome, VerifyError>>;
}

/// Client for Google's siteverify endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RecaptchaVerifier {
    client: Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    pub fn new(config: &CaptchaConfig) -> Result<Self, VerifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VerifyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            secret: config.private_key.clone(),
            verify_url: config.verify_url.clone(),
        })
    }

    pub async fn verify_token(
        &self,
        token: &str,
        remote_ip: Option<&str>,
    ) -> Result<VerificationOutcome, VerifyError> {
        let mut form = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = self.client.post(&self.verify_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Status(status.as_u16()));
        }

        let outcome: VerificationOutcome = response.json().await?;
        tracing::debug!(
            success = outcome.success,
            error_codes = ?outcome.error_codes,
            "reCAPTCHA verification response"
        );
        Ok(outcome)
    }
}

impl CaptchaVerifier for RecaptchaVerifier {
    fn verify<'a>(
        &'a self,
        token: &'a str,
        remote_ip: Option<&'a str>,
    ) -> BoxFuture<'a, Result<VerificationOutcome, VerifyError>> {
        Box::pin(self.verify_token(token, remote_ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_body() {
        let body = r#"{"success": true, "challenge_ts": "2024-01-01T00:00:00Z", "hostname": "example.org"}"#;
        let outcome: VerificationOutcome = serde_json::from_str(body).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.hostname.as_deref(), Some("example.org"));
        assert!(outcome.error_codes.is_empty());
    }

    #[test]
    fn test_parse_failure_with_error_codes() {
        let body = r#"{"success": false, "error-codes": ["invalid-input-response"]}"#;
        let outcome: VerificationOutcome = serde_json::from_str(body).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error_codes, vec!["invalid-input-response"]);
    }

    #[test]
    fn test_missing_success_field_is_failure() {
        let outcome: VerificationOutcome = serde_json::from_str("{}").unwrap();
        assert!(!outcome.success);
    }

    #[test]
    fn test_non_boolean_success_is_rejected() {
        let parsed = serde_json::from_str::<VerificationOutcome>(r#"{"success": "yes"}"#);
        assert!(parsed.is_err());
    }
}
