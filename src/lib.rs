//! Site Content
//!
//! Content-type schemas for the site's page tree plus the contact form
//! endpoint, whose script-initiated submissions are gated behind reCAPTCHA.
//!
//! - `content/`: page and block schemas, placement rules, admin panels
//! - `forms/`: form fields, validation, submission store, notification email
//! - `captcha`: siteverify client with a bounded timeout
//! - `web/`: serving capability, contact page, submission handler, templates
//! - `api_server`: Axum router and shared state

pub mod api_server;
pub mod captcha;
pub mod config;
pub mod content;
pub mod forms;
pub mod web;

// Re-export commonly used types
pub use api_server::{create_router, AppState};
pub use captcha::{CaptchaVerifier, RecaptchaVerifier, VerificationOutcome, VerifyError};
pub use config::{CaptchaConfig, NotificationConfig, ServerConfig};
pub use web::{CaptchaGate, ContactFormPage, PageRequest, PageResponse, ServePage};
