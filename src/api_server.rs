// Axum API Server Module
//
// Purpose: serve the contact form (HTML + reCAPTCHA-gated async submissions)
// and the content-type catalog for the admin UI.

use axum::{
    extract::{rejection::FormRejection, ConnectInfo, Form, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use axum_htmx::HxRequest;

use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::captcha::{CaptchaVerifier, RecaptchaVerifier};
use crate::config::{CaptchaConfig, NotificationConfig, ServerConfig};
use crate::content::{schema_catalog, ContactPage, Page, PageMeta, RichText};
use crate::forms::{FieldKind, FormField, LogNotifier, MemorySubmissionStore, Notifier, SubmissionStore};
use crate::web::{CaptchaGate, ContactFormPage, PageRequest, PageResponse, ServeError, ServePage};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    /// Contact page wrapped in the reCAPTCHA submission handler
    pub contact: Arc<dyn ServePage>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        tracing::info!("Initializing reCAPTCHA client ({:?} timeout)...", config.captcha.timeout);
        let verifier = Arc::new(RecaptchaVerifier::new(&config.captcha)?);

        Ok(Self::with_services(
            default_contact_page(&config.notification),
            &config.captcha,
            verifier,
            Arc::new(MemorySubmissionStore::new()),
            Arc::new(LogNotifier),
        ))
    }

    /// Assemble state from explicit collaborators (used by tests and embedders)
    pub fn with_services(
        page: ContactPage,
        captcha: &CaptchaConfig,
        verifier: Arc<dyn CaptchaVerifier>,
        store: Arc<dyn SubmissionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        if let Err(errors) = page.validate() {
            for error in &errors {
                tracing::warn!("Contact page field {}: {}", error.field, error.message);
            }
        }

        let contact = ContactFormPage::new(page, store, notifier);
        Self {
            contact: Arc::new(CaptchaGate::new(contact, verifier, captcha)),
        }
    }
}

/// Contact page used when no page definition is supplied
pub fn default_contact_page(notification: &NotificationConfig) -> ContactPage {
    ContactPage {
        meta: PageMeta::new("Contact us", "contact"),
        intro: RichText::new("<p>Send us a message and we will get back to you.</p>"),
        thank_you_text: RichText::new("<p>Thank you, your message has been sent.</p>"),
        form_fields: vec![
            FormField::new("Name", FieldKind::SingleLine, true),
            FormField::new("Email", FieldKind::Email, true),
            FormField::new("Subject", FieldKind::SingleLine, false),
            FormField::new("Message", FieldKind::MultiLine, true),
        ],
        to_address: notification.to_address.clone(),
        from_address: notification.from_address.clone(),
        subject: "New contact form submission".to_string(),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Content-type catalog (JSON)
        .route("/api/content-types", get(content_types))

        // Contact form: GET renders, POST submits
        .route("/contact", get(contact).post(contact))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn content_types() -> impl IntoResponse {
    Json(schema_catalog())
}

/// Decode the request and hand it to the gated contact page
///
/// `X-Requested-With: XMLHttpRequest` and `HX-Request: true` both mark a
/// script-initiated request. A script submission whose body cannot be decoded
/// is served with an empty form, so it fails verification with the usual JSON
/// answer instead of a plain-text rejection.
async fn contact(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    HxRequest(is_htmx): HxRequest,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<PageResponse, AppError> {
    let mut request = PageRequest::new(method);
    request.is_script_request = is_htmx || PageRequest::has_script_marker(&headers);
    request.remote_addr = connect_info.map(|ConnectInfo(addr)| addr.ip());
    request.form = match form {
        Ok(Form(form)) => form,
        Err(rejection) if request.is_async_submission() => {
            tracing::debug!("Undecodable async submission body: {}", rejection.body_text());
            HashMap::new()
        }
        Err(rejection) => return Err(AppError::Rejected(rejection)),
    };

    let response = state.contact.serve(request).await?;
    Ok(response)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Internal(String),
    Rejected(FormRejection),
}

impl From<ServeError> for AppError {
    fn from(err: ServeError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::Rejected(rejection) => return rejection.into_response(),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
