//! Submission persistence
//!
//! The host owns the real database; `MemorySubmissionStore` backs the
//! standalone server and the tests.

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use super::{FormError, FormSubmission};

pub trait SubmissionStore: Send + Sync {
    fn save<'a>(&'a self, submission: FormSubmission) -> BoxFuture<'a, Result<(), FormError>>;

    /// Submissions for one form page, oldest first
    fn list<'a>(&'a self, page_slug: &'a str) -> BoxFuture<'a, Result<Vec<FormSubmission>, FormError>>;
}

#[derive(Default)]
pub struct MemorySubmissionStore {
    submissions: RwLock<Vec<FormSubmission>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.submissions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.submissions.read().await.is_empty()
    }
}

impl SubmissionStore for MemorySubmissionStore {
    fn save<'a>(&'a self, submission: FormSubmission) -> BoxFuture<'a, Result<(), FormError>> {
        Box::pin(async move {
            tracing::info!(id = %submission.id, page = %submission.page_slug, "Stored form submission");
            self.submissions.write().await.push(submission);
            Ok(())
        })
    }

    fn list<'a>(&'a self, page_slug: &'a str) -> BoxFuture<'a, Result<Vec<FormSubmission>, FormError>> {
        Box::pin(async move {
            Ok(self
                .submissions
                .read()
                .await
                .iter()
                .filter(|s| s.page_slug == page_slug)
                .cloned()
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::SubmittedValue;

    fn submission(slug: &str, name: &str) -> FormSubmission {
        FormSubmission::new(
            slug,
            vec![SubmittedValue {
                name: "your_name".into(),
                label: "Your name".into(),
                value: name.into(),
            }],
        )
    }

    #[tokio::test]
    async fn test_save_and_list_by_page() {
        let store = MemorySubmissionStore::new();
        store.save(submission("contact", "Ada")).await.unwrap();
        store.save(submission("volunteer", "Grace")).await.unwrap();
        store.save(submission("contact", "Alan")).await.unwrap();

        assert_eq!(store.len().await, 3);
        let contact = store.list("contact").await.unwrap();
        let names: Vec<_> = contact.iter().map(|s| s.data[0].value.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Alan"]);
    }

    #[tokio::test]
    async fn test_identical_submissions_are_not_deduplicated() {
        let store = MemorySubmissionStore::new();
        store.save(submission("contact", "Ada")).await.unwrap();
        store.save(submission("contact", "Ada")).await.unwrap();
        assert_eq!(store.list("contact").await.unwrap().len(), 2);
    }
}
