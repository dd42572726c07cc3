//! Form submission handler
//!
//! Async (script-initiated) POSTs must pass reCAPTCHA before the wrapped page
//! sees them and get a JSON answer. Everything else goes straight to the
//! wrapped page, with the public site key added to its render context.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use futures::future::BoxFuture;
use serde_json::json;

use crate::captcha::CaptchaVerifier;
use crate::config::CaptchaConfig;
use crate::web::serve::{PageRequest, PageResponse, ServePage, ServeResult};

/// Error message returned to script callers on failed verification
pub const INVALID_CAPTCHA: &str = "Invalid reCAPTCHA";

pub struct CaptchaGate<P> {
    inner: P,
    verifier: Arc<dyn CaptchaVerifier>,
    site_key: String,
    timeout: Duration,
}

impl<P: ServePage> CaptchaGate<P> {
    pub fn new(inner: P, verifier: Arc<dyn CaptchaVerifier>, config: &CaptchaConfig) -> Self {
        Self {
            inner,
            verifier,
            site_key: config.public_key.clone(),
            timeout: config.timeout,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Any verifier error or a timeout counts as a failed verification
    async fn verify(&self, request: &PageRequest) -> bool {
        let remote_ip = request.remote_addr.map(|ip| ip.to_string());
        let call = self.verifier.verify(request.captcha_token(), remote_ip.as_deref());

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(outcome)) if outcome.success => true,
            Ok(Ok(outcome)) => {
                tracing::warn!(error_codes = ?outcome.error_codes, "reCAPTCHA rejected submission");
                false
            }
            Ok(Err(e)) => {
                tracing::warn!("reCAPTCHA verification failed: {}", e);
                false
            }
            Err(_) => {
                tracing::warn!("reCAPTCHA verification timed out after {:?}", self.timeout);
                false
            }
        }
    }

    pub async fn handle(&self, mut request: PageRequest) -> ServeResult {
        if !request.is_async_submission() {
            request.context.captcha_site_key = Some(self.site_key.clone());
            return self.inner.serve(request).await;
        }

        if !self.verify(&request).await {
            return Ok(PageResponse::json(
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": INVALID_CAPTCHA }),
            ));
        }

        // The page's own answer (landing page or re-rendered form) is not
        // forwarded to script callers.
        let response = self.inner.serve(request).await?;
        tracing::debug!("Verified submission handled with status {}", response.status());

        Ok(PageResponse::json(StatusCode::OK, json!({ "success": true })))
    }
}

impl<P: ServePage> ServePage for CaptchaGate<P> {
    fn serve(&self, request: PageRequest) -> BoxFuture<'_, ServeResult> {
        Box::pin(self.handle(request))
    }
}
