// Page handlers for HTML rendering with Askama

use askama::Template;

use crate::content::{ContactPage, FieldError};
use crate::forms::FormField;
use crate::web::serve::RenderContext;

// ============================================================================
// Contact Form
// ============================================================================

/// One input as the template sees it
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub input_type: &'static str,
    pub multiline: bool,
    pub required: bool,
    pub help_text: String,
    pub value: String,
    pub error: Option<String>,
}

impl FieldView {
    pub fn build(
        fields: &[FormField],
        values: &std::collections::HashMap<String, String>,
        errors: &[FieldError],
    ) -> Vec<FieldView> {
        fields
            .iter()
            .map(|field| {
                let name = field.clean_name();
                let error = errors
                    .iter()
                    .find(|e| e.field == name)
                    .map(|e| e.message.clone());
                FieldView {
                    value: values.get(&name).cloned().unwrap_or_default(),
                    name,
                    label: field.label.clone(),
                    input_type: field.input_type(),
                    multiline: field.is_multiline(),
                    required: field.required,
                    help_text: field.help_text.clone(),
                    error,
                }
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate<'a> {
    pub page: &'a ContactPage,
    pub fields: Vec<FieldView>,
    pub captcha_site_key: Option<&'a str>,
}

impl<'a> ContactTemplate<'a> {
    pub fn new(page: &'a ContactPage, fields: Vec<FieldView>, context: &'a RenderContext) -> Self {
        Self {
            page,
            fields,
            captcha_site_key: context.captcha_site_key.as_deref().filter(|k| !k.is_empty()),
        }
    }
}

// ============================================================================
// Landing Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/contact_landing.html")]
pub struct ContactLandingTemplate<'a> {
    pub page: &'a ContactPage,
}
