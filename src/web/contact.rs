//! Standard contact-form serving
//!
//! GET renders the form. A valid POST stores the submission, sends the
//! notification email (when the page has recipients) and renders the landing
//! page. An invalid POST re-renders the form with field errors and stores
//! nothing.

use std::collections::HashMap;
use std::sync::Arc;

use askama::Template;
use axum::http::{Method, StatusCode};
use futures::future::BoxFuture;

use crate::content::{ContactPage, FieldError};
use crate::forms::{self, FormSubmission, NotificationEmail, Notifier, SubmissionStore};
use crate::web::handlers::pages::{ContactLandingTemplate, ContactTemplate, FieldView};
use crate::web::serve::{PageRequest, PageResponse, RenderContext, ServePage, ServeResult};

pub struct ContactFormPage {
    page: ContactPage,
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
}

impl ContactFormPage {
    pub fn new(page: ContactPage, store: Arc<dyn SubmissionStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { page, store, notifier }
    }

    pub fn page(&self) -> &ContactPage {
        &self.page
    }

    fn render_form(
        &self,
        values: &HashMap<String, String>,
        errors: &[FieldError],
        context: &RenderContext,
    ) -> ServeResult {
        let fields = FieldView::build(&self.page.form_fields, values, errors);
        let body = ContactTemplate::new(&self.page, fields, context).render()?;
        Ok(PageResponse::html(body))
    }

    async fn process(&self, request: PageRequest) -> ServeResult {
        let data = match forms::validate(&self.page.form_fields, &request.form) {
            Ok(data) => data,
            Err(errors) => {
                tracing::debug!("Contact form rejected with {} field errors", errors.len());
                return self.render_form(&request.form, &errors, &request.context);
            }
        };

        let submission = FormSubmission::new(self.page.meta.slug.clone(), data);
        let email = NotificationEmail::for_submission(&self.page, &submission);

        self.store.save(submission).await?;
        if !email.to.is_empty() {
            self.notifier.send(&email).await?;
        }

        let body = ContactLandingTemplate { page: &self.page }.render()?;
        Ok(PageResponse::html(body))
    }

    pub async fn serve_request(&self, request: PageRequest) -> ServeResult {
        match request.method {
            Method::GET | Method::HEAD => self.render_form(&HashMap::new(), &[], &request.context),
            Method::POST => self.process(request).await,
            _ => Ok(PageResponse::Html {
                status: StatusCode::METHOD_NOT_ALLOWED,
                body: "Method Not Allowed".to_string(),
            }),
        }
    }
}

impl ServePage for ContactFormPage {
    fn serve(&self, request: PageRequest) -> BoxFuture<'_, ServeResult> {
        Box::pin(self.serve_request(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PageMeta, RichText};
    use crate::forms::{FieldKind, FormField, MemoryNotifier, MemorySubmissionStore};

    fn contact_page(to_address: &str) -> ContactPage {
        ContactPage {
            meta: PageMeta::new("Contact us", "contact"),
            intro: RichText::new("<p>Write to us</p>"),
            thank_you_text: RichText::new("<p>Thanks for getting in touch</p>"),
            form_fields: vec![
                FormField::new("Name", FieldKind::SingleLine, true),
                FormField::new("Email", FieldKind::Email, true),
                FormField::new("Message", FieldKind::MultiLine, true),
            ],
            to_address: to_address.into(),
            from_address: "noreply@example.org".into(),
            subject: "Website enquiry".into(),
        }
    }

    fn setup(to_address: &str) -> (ContactFormPage, Arc<MemorySubmissionStore>, Arc<MemoryNotifier>) {
        let store = Arc::new(MemorySubmissionStore::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let page = ContactFormPage::new(contact_page(to_address), store.clone(), notifier.clone());
        (page, store, notifier)
    }

    fn body(response: &PageResponse) -> &str {
        match response {
            PageResponse::Html { body, .. } => body,
            other => panic!("expected HTML, got {:?}", other),
        }
    }

    fn valid_post() -> PageRequest {
        PageRequest::post([
            ("name", "Ada"),
            ("email", "ada@example.org"),
            ("message", "Hello"),
        ])
    }

    #[tokio::test]
    async fn test_get_renders_form_with_site_key() {
        let (page, store, _) = setup("office@example.org");
        let mut request = PageRequest::get();
        request.context.captcha_site_key = Some("public-site-key".into());

        let response = page.serve(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(&response);
        assert!(html.contains("Write to us"));
        assert!(html.contains(r#"data-sitekey="public-site-key""#));
        assert!(html.contains(r#"name="email""#));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_without_key_omits_widget() {
        let (page, _, _) = setup("office@example.org");
        let response = page.serve(PageRequest::get()).await.unwrap();
        assert!(!body(&response).contains("g-recaptcha"));
    }

    #[tokio::test]
    async fn test_valid_post_stores_and_notifies() {
        let (page, store, notifier) = setup("office@example.org");
        let response = page.serve(valid_post()).await.unwrap();

        assert!(body(&response).contains("Thanks for getting in touch"));
        assert_eq!(store.len().await, 1);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Website enquiry");
        assert!(sent[0].body.contains("Email: ada@example.org"));
    }

    #[tokio::test]
    async fn test_invalid_post_rerenders_with_errors() {
        let (page, store, notifier) = setup("office@example.org");
        let response = page
            .serve(PageRequest::post([("name", "Ada"), ("email", "nope")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body(&response);
        assert!(html.contains("Enter a valid email address."));
        assert!(html.contains(r#"value="Ada""#));
        assert!(store.is_empty().await);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_blank_recipients_skip_email() {
        let (page, store, notifier) = setup("");
        page.serve(valid_post()).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_other_methods_not_allowed() {
        let (page, _, _) = setup("office@example.org");
        let response = page.serve(PageRequest::new(Method::DELETE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
