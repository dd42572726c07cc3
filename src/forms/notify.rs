//! Notification email for new submissions
//!
//! Mail transport belongs to the host. `LogNotifier` writes the message to the
//! log; `MemoryNotifier` keeps an outbox that can be inspected.

use std::sync::Mutex;

use futures::future::BoxFuture;
use serde::Serialize;

use super::{FormError, FormSubmission};
use crate::content::ContactPage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEmail {
    pub to: Vec<String>,
    pub from: String,
    pub subject: String,
    pub body: String,
}

impl NotificationEmail {
    /// One `label: value` line per submitted field, in form order
    pub fn for_submission(page: &ContactPage, submission: &FormSubmission) -> Self {
        let body = submission
            .data
            .iter()
            .map(|v| format!("{}: {}", v.label, v.value))
            .collect::<Vec<_>>()
            .join("\n");

        let subject = if page.subject.trim().is_empty() {
            page.meta.title.clone()
        } else {
            page.subject.clone()
        };

        Self {
            to: page.recipients().into_iter().map(str::to_string).collect(),
            from: page.from_address.clone(),
            subject,
            body,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn send<'a>(&'a self, email: &'a NotificationEmail) -> BoxFuture<'a, Result<(), FormError>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send<'a>(&'a self, email: &'a NotificationEmail) -> BoxFuture<'a, Result<(), FormError>> {
        Box::pin(async move {
            tracing::info!(
                to = ?email.to,
                from = %email.from,
                subject = %email.subject,
                "Notification email\n{}",
                email.body
            );
            Ok(())
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryNotifier {
    outbox: Mutex<Vec<NotificationEmail>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<NotificationEmail> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn send<'a>(&'a self, email: &'a NotificationEmail) -> BoxFuture<'a, Result<(), FormError>> {
        Box::pin(async move {
            self.outbox
                .lock()
                .map_err(|e| FormError::Notify(e.to_string()))?
                .push(email.clone());
            Ok(())
        })
    }
}
