//! Page-serving capability
//!
//! A content type that answers requests implements `ServePage`. Wrappers such
//! as `CaptchaGate` implement it too and decide when to call the inner page.

use std::collections::HashMap;
use std::net::IpAddr;

use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use futures::future::BoxFuture;
use thiserror::Error;

use crate::forms::{FormError, CAPTCHA_FIELD};

/// Header set by XHR/fetch callers to mark a script-initiated request
pub const REQUESTED_WITH: &str = "x-requested-with";

// ============================================================================
// Request
// ============================================================================

/// Extra values made available to page templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Public reCAPTCHA key for the client-side widget
    pub captcha_site_key: Option<String>,
}

/// One inbound request to a page, already decoded
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub method: Method,
    /// Issued by in-page script rather than a browser navigation
    pub is_script_request: bool,
    pub remote_addr: Option<IpAddr>,
    pub form: HashMap<String, String>,
    pub context: RenderContext,
}

impl PageRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            is_script_request: false,
            remote_addr: None,
            form: HashMap::new(),
            context: RenderContext::default(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post<K, V>(form: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = Self::new(Method::POST);
        request.form = form.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        request
    }

    pub fn from_script(mut self) -> Self {
        self.is_script_request = true;
        self
    }

    pub fn with_remote_addr(mut self, addr: IpAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// True for `X-Requested-With: XMLHttpRequest`
    pub fn has_script_marker(headers: &HeaderMap) -> bool {
        headers
            .get(REQUESTED_WITH)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false)
    }

    /// Write request issued by in-page script
    pub fn is_async_submission(&self) -> bool {
        self.method == Method::POST && self.is_script_request
    }

    /// reCAPTCHA response token; empty when the widget did not post one
    pub fn captcha_token(&self) -> &str {
        self.form.get(CAPTCHA_FIELD).map(String::as_str).unwrap_or("")
    }
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PageResponse {
    Html { status: StatusCode, body: String },
    Json { status: StatusCode, body: serde_json::Value },
}

impl PageResponse {
    pub fn html(body: String) -> Self {
        PageResponse::Html { status: StatusCode::OK, body }
    }

    pub fn json(status: StatusCode, body: serde_json::Value) -> Self {
        PageResponse::Json { status, body }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PageResponse::Html { status, .. } | PageResponse::Json { status, .. } => *status,
        }
    }
}

impl IntoResponse for PageResponse {
    fn into_response(self) -> Response {
        match self {
            PageResponse::Html { status, body } => (status, Html(body)).into_response(),
            PageResponse::Json { status, body } => (status, Json(body)).into_response(),
        }
    }
}

// ============================================================================
// Serving
// ============================================================================

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error(transparent)]
    Form(#[from] FormError),
}

pub type ServeResult = Result<PageResponse, ServeError>;

/// "Serve a request": the one capability the submission handler depends on
pub trait ServePage: Send + Sync {
    fn serve(&self, request: PageRequest) -> BoxFuture<'_, ServeResult>;
}
