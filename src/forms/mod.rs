//! Contact form pipeline pieces
//!
//! Field definitions and validation, submission persistence and notification
//! email. `web::contact` wires them into the standard page-serving path.

pub mod notify;
pub mod store;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::content::FieldError;

pub use notify::{LogNotifier, MemoryNotifier, NotificationEmail, Notifier};
pub use store::{MemorySubmissionStore, SubmissionStore};

/// Form key carrying the reCAPTCHA widget response; never stored
pub const CAPTCHA_FIELD: &str = "g-recaptcha-response";

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Failed to store submission: {0}")]
    Store(String),

    #[error("Failed to send notification: {0}")]
    Notify(String),
}

// ============================================================================
// Field definitions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    SingleLine,
    MultiLine,
    Email,
    Url,
    Number,
}

/// One editor-defined form field; the input name is derived from the label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub label: String,
    #[serde(rename = "field_type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub help_text: String,
}

impl FormField {
    pub fn new(label: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        Self {
            label: label.into(),
            kind,
            required,
            help_text: String::new(),
        }
    }

    /// Input name: lowercase label, runs of other characters collapsed to `_`
    pub fn clean_name(&self) -> String {
        let mut name = String::with_capacity(self.label.len());
        for c in self.label.trim().chars() {
            if c.is_alphanumeric() {
                name.extend(c.to_lowercase());
            } else if !name.ends_with('_') {
                name.push('_');
            }
        }
        name.trim_matches('_').to_string()
    }

    pub fn is_multiline(&self) -> bool {
        self.kind == FieldKind::MultiLine
    }

    pub fn input_type(&self) -> &'static str {
        match self.kind {
            FieldKind::SingleLine | FieldKind::MultiLine => "text",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Number => "number",
        }
    }

    fn check(&self, value: &str) -> Option<&'static str> {
        let value = value.trim();
        if value.is_empty() {
            return self.required.then_some("This field is required.");
        }
        match self.kind {
            FieldKind::Email if !email_address::EmailAddress::is_valid(value) => {
                Some("Enter a valid email address.")
            }
            FieldKind::Url if Url::parse(value).is_err() => Some("Enter a valid URL."),
            FieldKind::Number if value.parse::<f64>().is_err() => Some("Enter a number."),
            _ => None,
        }
    }
}

// ============================================================================
// Submissions
// ============================================================================

/// A cleaned field value, kept in form order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedValue {
    pub name: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: Uuid,
    pub page_slug: String,
    pub data: Vec<SubmittedValue>,
    pub submitted_at: DateTime<Utc>,
}

impl FormSubmission {
    pub fn new(page_slug: impl Into<String>, data: Vec<SubmittedValue>) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_slug: page_slug.into(),
            data,
            submitted_at: Utc::now(),
        }
    }
}

/// Validate raw input against the form definition
///
/// Unknown keys (including the CAPTCHA token) are ignored. Returns every
/// field error at once so the form can be re-rendered in one pass.
pub fn validate(
    fields: &[FormField],
    input: &HashMap<String, String>,
) -> Result<Vec<SubmittedValue>, Vec<FieldError>> {
    let mut cleaned = Vec::with_capacity(fields.len());
    let mut errors = Vec::new();

    for field in fields {
        let name = field.clean_name();
        let value = input.get(&name).map(String::as_str).unwrap_or("");
        match field.check(value) {
            Some(message) => errors.push(FieldError::new(name, message)),
            None => cleaned.push(SubmittedValue {
                name,
                label: field.label.clone(),
                value: value.trim().to_string(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact_fields() -> Vec<FormField> {
        vec![
            FormField::new("Your name", FieldKind::SingleLine, true),
            FormField::new("Email", FieldKind::Email, true),
            FormField::new("Website", FieldKind::Url, false),
            FormField::new("Message", FieldKind::MultiLine, true),
        ]
    }

    fn input(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(FormField::new("Your name", FieldKind::SingleLine, true).clean_name(), "your_name");
        assert_eq!(FormField::new(" E-mail address? ", FieldKind::Email, true).clean_name(), "e_mail_address");
    }

    #[test]
    fn test_valid_input_keeps_form_order() {
        let cleaned = validate(
            &contact_fields(),
            &input(&[
                ("message", " Hello there "),
                ("email", "ada@example.org"),
                ("your_name", "Ada"),
                (CAPTCHA_FIELD, "token"),
            ]),
        )
        .unwrap();

        let names: Vec<_> = cleaned.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["your_name", "email", "website", "message"]);
        assert_eq!(cleaned[3].value, "Hello there");
        assert!(!cleaned.iter().any(|v| v.name == CAPTCHA_FIELD));
    }

    #[test]
    fn test_collects_every_error() {
        let errors = validate(
            &contact_fields(),
            &input(&[("email", "not-an-email"), ("website", "nope")]),
        )
        .unwrap_err();

        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["your_name", "email", "website", "message"]);
        assert_eq!(errors[1].message, "Enter a valid email address.");
    }

    #[test]
    fn test_number_field() {
        let fields = vec![FormField::new("Age", FieldKind::Number, false)];
        assert!(validate(&fields, &input(&[("age", "42")])).is_ok());
        assert!(validate(&fields, &input(&[("age", "")])).is_ok());
        assert!(validate(&fields, &input(&[("age", "forty")])).is_err());
    }
}
