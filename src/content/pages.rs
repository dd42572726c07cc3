//! Page content types
//!
//! Every type shares `PageMeta` (title + slug) and adds its own fields.
//! Placement rules (allowed parents / subpages) and admin panels live on
//! `PageType` so they can be checked without loading a page.

use serde::{Deserialize, Serialize};

use super::blocks::{
    AchievementBlock, DocumentBlock, GalleryImageBlock, MediaUpdateBlock, ObjectiveBlock,
    RichText, StreamField,
};
use super::FieldError;
use crate::forms::FormField;

// ============================================================================
// Page types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageType {
    /// Tree root provided by the host
    #[serde(rename = "core.Page")]
    Root,
    #[serde(rename = "content.HomePage")]
    Home,
    #[serde(rename = "content.SimplePage")]
    Simple,
    #[serde(rename = "content.AchievementPage")]
    Achievement,
    #[serde(rename = "content.MediaUpdatesPage")]
    MediaUpdates,
    #[serde(rename = "content.DocumentRepositoryPage")]
    DocumentRepository,
    #[serde(rename = "content.PhotoGalleryPage")]
    PhotoGallery,
    #[serde(rename = "content.ObjectivesPage")]
    Objectives,
    #[serde(rename = "content.ContactPage")]
    Contact,
}

/// Which page types a placement rule admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRule {
    Any,
    Only(&'static [PageType]),
}

impl TypeRule {
    pub fn allows(&self, page_type: PageType) -> bool {
        match self {
            TypeRule::Any => true,
            TypeRule::Only(types) => types.contains(&page_type),
        }
    }
}

impl Serialize for TypeRule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypeRule::Any => serializer.serialize_str("*"),
            TypeRule::Only(types) => types.serialize(serializer),
        }
    }
}

/// One admin edit panel, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum Panel {
    Field { field: &'static str },
    FormFields,
    Heading { heading: &'static str },
}

const fn field(name: &'static str) -> Panel {
    Panel::Field { field: name }
}

impl PageType {
    pub const ALL: [PageType; 8] = [
        PageType::Home,
        PageType::Simple,
        PageType::Achievement,
        PageType::MediaUpdates,
        PageType::DocumentRepository,
        PageType::PhotoGallery,
        PageType::Objectives,
        PageType::Contact,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PageType::Root => "Root",
            PageType::Home => "Home page",
            PageType::Simple => "Simple page",
            PageType::Achievement => "Achievements page",
            PageType::MediaUpdates => "Media updates page",
            PageType::DocumentRepository => "Document repository",
            PageType::PhotoGallery => "Photo gallery",
            PageType::Objectives => "Objectives page",
            PageType::Contact => "Contact page",
        }
    }

    pub fn parent_page_types(&self) -> TypeRule {
        match self {
            PageType::Root => TypeRule::Only(&[]),
            PageType::Simple => TypeRule::Any,
            PageType::Achievement => TypeRule::Only(&[PageType::Root, PageType::Home]),
            _ => TypeRule::Only(&[PageType::Root]),
        }
    }

    pub fn subpage_types(&self) -> TypeRule {
        match self {
            PageType::Root | PageType::Simple => TypeRule::Any,
            PageType::Home => TypeRule::Only(&[PageType::Achievement]),
            _ => TypeRule::Only(&[]),
        }
    }

    /// Both sides of the placement must agree
    pub fn can_create_under(&self, parent: PageType) -> bool {
        self.parent_page_types().allows(parent) && parent.subpage_types().allows(*self)
    }

    /// Edit panels, starting with the title panel every page has
    pub fn content_panels(&self) -> Vec<Panel> {
        let mut panels = vec![field("title")];
        let extra: &[Panel] = match self {
            PageType::Root | PageType::Home => &[],
            PageType::Simple => &[field("body")],
            PageType::Achievement => &[field("intro"), field("achievements")],
            PageType::MediaUpdates => &[field("intro"), field("media_updates")],
            PageType::DocumentRepository => &[field("intro"), field("documents")],
            PageType::PhotoGallery => &[field("intro"), field("images")],
            PageType::Objectives => &[field("intro"), field("objectives")],
            PageType::Contact => &[
                field("intro"),
                Panel::FormFields,
                field("thank_you_text"),
                Panel::Heading { heading: "Email" },
                field("to_address"),
                field("from_address"),
                field("subject"),
            ],
        };
        panels.extend_from_slice(extra);
        panels
    }
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: String,
    pub slug: String,
}

impl PageMeta {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self { title: title.into(), slug: slug.into() }
    }

    fn validate(&self, errors: &mut Vec<FieldError>) {
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "This field is required."));
        }
        let slug_ok = !self.slug.is_empty()
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !slug_ok {
            errors.push(FieldError::new(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            ));
        }
    }
}

/// Capability shared by every content type
pub trait Page {
    fn page_type(&self) -> PageType;

    fn meta(&self) -> &PageMeta;

    /// Type-specific field checks (title and slug are checked by `validate`)
    fn validate_fields(&self, _errors: &mut Vec<FieldError>) {}

    /// Collect every field error; empty means the page can be saved
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        self.meta().validate(&mut errors);
        self.validate_fields(&mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// CMS container home page; not a rendering target itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomePage {
    #[serde(flatten)]
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplePage {
    #[serde(flatten)]
    pub meta: PageMeta,
    pub body: RichText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementPage {
    #[serde(flatten)]
    pub meta: PageMeta,
    #[serde(default)]
    pub intro: RichText,
    #[serde(default)]
    pub achievements: StreamField<AchievementBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaUpdatesPage {
    #[serde(flatten)]
    pub meta: PageMeta,
    #[serde(default)]
    pub intro: RichText,
    #[serde(default)]
    pub media_updates: StreamField<MediaUpdateBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRepositoryPage {
    #[serde(flatten)]
    pub meta: PageMeta,
    #[serde(default)]
    pub intro: RichText,
    #[serde(default)]
    pub documents: StreamField<DocumentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoGalleryPage {
    #[serde(flatten)]
    pub meta: PageMeta,
    #[serde(default)]
    pub intro: RichText,
    #[serde(default)]
    pub images: StreamField<GalleryImageBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectivesPage {
    #[serde(flatten)]
    pub meta: PageMeta,
    #[serde(default)]
    pub intro: RichText,
    #[serde(default)]
    pub objectives: StreamField<ObjectiveBlock>,
}

/// Contact form page: form definition plus notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPage {
    #[serde(flatten)]
    pub meta: PageMeta,
    #[serde(default)]
    pub intro: RichText,
    #[serde(default)]
    pub thank_you_text: RichText,
    pub form_fields: Vec<FormField>,
    /// Comma-separated recipients; blank disables notification emails
    #[serde(default)]
    pub to_address: String,
    #[serde(default)]
    pub from_address: String,
    #[serde(default)]
    pub subject: String,
}

impl ContactPage {
    pub fn recipients(&self) -> Vec<&str> {
        self.to_address
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect()
    }
}

impl Page for HomePage {
    fn page_type(&self) -> PageType {
        PageType::Home
    }
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
}

impl Page for SimplePage {
    fn page_type(&self) -> PageType {
        PageType::Simple
    }
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
    fn validate_fields(&self, errors: &mut Vec<FieldError>) {
        if self.body.is_blank() {
            errors.push(FieldError::new("body", "This field is required."));
        }
    }
}

impl Page for AchievementPage {
    fn page_type(&self) -> PageType {
        PageType::Achievement
    }
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
    fn validate_fields(&self, errors: &mut Vec<FieldError>) {
        self.achievements.validate("achievements", errors);
    }
}

impl Page for MediaUpdatesPage {
    fn page_type(&self) -> PageType {
        PageType::MediaUpdates
    }
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
    fn validate_fields(&self, errors: &mut Vec<FieldError>) {
        self.media_updates.validate("media_updates", errors);
    }
}

impl Page for DocumentRepositoryPage {
    fn page_type(&self) -> PageType {
        PageType::DocumentRepository
    }
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
    fn validate_fields(&self, errors: &mut Vec<FieldError>) {
        self.documents.validate("documents", errors);
    }
}

impl Page for PhotoGalleryPage {
    fn page_type(&self) -> PageType {
        PageType::PhotoGallery
    }
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
    fn validate_fields(&self, errors: &mut Vec<FieldError>) {
        self.images.validate("images", errors);
    }
}

impl Page for ObjectivesPage {
    fn page_type(&self) -> PageType {
        PageType::Objectives
    }
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
    fn validate_fields(&self, errors: &mut Vec<FieldError>) {
        self.objectives.validate("objectives", errors);
    }
}

impl Page for ContactPage {
    fn page_type(&self) -> PageType {
        PageType::Contact
    }
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
    fn validate_fields(&self, errors: &mut Vec<FieldError>) {
        let mut seen = std::collections::HashSet::new();
        for (idx, form_field) in self.form_fields.iter().enumerate() {
            let path = format!("form_fields[{}]", idx);
            if form_field.label.trim().is_empty() {
                errors.push(FieldError::new(format!("{}.label", path), "This field is required."));
            }
            if !seen.insert(form_field.clean_name()) {
                errors.push(FieldError::new(
                    format!("{}.label", path),
                    "There is another field with the same label.",
                ));
            }
        }
        for address in self.recipients() {
            if !email_address::EmailAddress::is_valid(address) {
                errors.push(FieldError::new("to_address", format!("Invalid email address: {}", address)));
            }
        }
        if !self.from_address.trim().is_empty()
            && !email_address::EmailAddress::is_valid(self.from_address.trim())
        {
            errors.push(FieldError::new("from_address", "Enter a valid email address."));
        }
    }
}

/// Any stored page, tagged by its type name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "page_type")]
pub enum AnyPage {
    #[serde(rename = "content.HomePage")]
    Home(HomePage),
    #[serde(rename = "content.SimplePage")]
    Simple(SimplePage),
    #[serde(rename = "content.AchievementPage")]
    Achievement(AchievementPage),
    #[serde(rename = "content.MediaUpdatesPage")]
    MediaUpdates(MediaUpdatesPage),
    #[serde(rename = "content.DocumentRepositoryPage")]
    DocumentRepository(DocumentRepositoryPage),
    #[serde(rename = "content.PhotoGalleryPage")]
    PhotoGallery(PhotoGalleryPage),
    #[serde(rename = "content.ObjectivesPage")]
    Objectives(ObjectivesPage),
    #[serde(rename = "content.ContactPage")]
    Contact(ContactPage),
}

impl AnyPage {
    fn as_page(&self) -> &dyn Page {
        match self {
            AnyPage::Home(p) => p,
            AnyPage::Simple(p) => p,
            AnyPage::Achievement(p) => p,
            AnyPage::MediaUpdates(p) => p,
            AnyPage::DocumentRepository(p) => p,
            AnyPage::PhotoGallery(p) => p,
            AnyPage::Objectives(p) => p,
            AnyPage::Contact(p) => p,
        }
    }
}

impl Page for AnyPage {
    fn page_type(&self) -> PageType {
        self.as_page().page_type()
    }
    fn meta(&self) -> &PageMeta {
        self.as_page().meta()
    }
    fn validate_fields(&self, errors: &mut Vec<FieldError>) {
        self.as_page().validate_fields(errors)
    }
}
