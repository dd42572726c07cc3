//! Content-type schemas
//!
//! Page and block definitions for the site's page tree. Storage, versioning,
//! rich-text rendering and the chooser UIs belong to the host; this module
//! only describes shapes, placement rules and admin panels, and validates
//! values against them.

pub mod blocks;
pub mod pages;

use serde::Serialize;

pub use blocks::{
    AchievementBlock, BlockMeta, DocumentBlock, DocumentId, GalleryImageBlock, ImageId,
    MediaUpdateBlock, ObjectiveBlock, RichText, StreamField, StructBlock,
};
pub use pages::{
    AchievementPage, AnyPage, ContactPage, DocumentRepositoryPage, HomePage, MediaUpdatesPage,
    ObjectivesPage, Page, PageMeta, PageType, Panel, PhotoGalleryPage, SimplePage, TypeRule,
};

use blocks::{BlockField, RichTextFeatures, INTRO_FEATURES};

/// A single validation failure, addressed by field path (`achievements[0].title`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Schema catalog (served to the admin UI)
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BlockSchema {
    pub name: &'static str,
    #[serde(flatten)]
    pub meta: BlockMeta,
    pub fields: &'static [BlockField],
}

impl BlockSchema {
    fn of<T: StructBlock>() -> Self {
        Self {
            name: T::NAME,
            meta: T::meta(),
            fields: T::fields(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageSchema {
    pub page_type: PageType,
    pub label: &'static str,
    pub parent_page_types: TypeRule,
    pub subpage_types: TypeRule,
    pub content_panels: Vec<Panel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro_features: Option<RichTextFeatures>,
    /// Stream fields and the block each accepts
    pub stream_fields: Vec<(&'static str, BlockSchema)>,
}

fn page_schema(page_type: PageType) -> PageSchema {
    let stream_fields = match page_type {
        PageType::Achievement => vec![("achievements", BlockSchema::of::<AchievementBlock>())],
        PageType::MediaUpdates => vec![("media_updates", BlockSchema::of::<MediaUpdateBlock>())],
        PageType::DocumentRepository => vec![("documents", BlockSchema::of::<DocumentBlock>())],
        PageType::PhotoGallery => vec![("images", BlockSchema::of::<GalleryImageBlock>())],
        PageType::Objectives => vec![("objectives", BlockSchema::of::<ObjectiveBlock>())],
        _ => Vec::new(),
    };
    let has_intro = !matches!(page_type, PageType::Root | PageType::Home | PageType::Simple);

    PageSchema {
        page_type,
        label: page_type.label(),
        parent_page_types: page_type.parent_page_types(),
        subpage_types: page_type.subpage_types(),
        content_panels: page_type.content_panels(),
        intro_features: has_intro.then_some(INTRO_FEATURES),
        stream_fields,
    }
}

/// Every creatable content type with its panels, placement rules and blocks
pub fn schema_catalog() -> Vec<PageSchema> {
    PageType::ALL.iter().copied().map(page_schema).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_type() {
        let catalog = schema_catalog();
        assert_eq!(catalog.len(), PageType::ALL.len());
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = serde_json::to_value(schema_catalog()).unwrap();
        let achievement = json
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["page_type"] == "content.AchievementPage")
            .unwrap();

        assert_eq!(achievement["parent_page_types"], serde_json::json!(["core.Page", "content.HomePage"]));
        assert_eq!(achievement["subpage_types"], serde_json::json!([]));
        assert_eq!(achievement["intro_features"], serde_json::json!(["bold", "italic", "link"]));

        let (field_name, block) = (&achievement["stream_fields"][0][0], &achievement["stream_fields"][0][1]);
        assert_eq!(field_name, "achievements");
        assert_eq!(block["icon"], "award");
        assert_eq!(block["template"], "blocks/achievement_block.html");
        assert_eq!(block["fields"][1]["features"][0], "h3");

        let simple = json.as_array().unwrap().iter().find(|p| p["page_type"] == "content.SimplePage").unwrap();
        assert_eq!(simple["parent_page_types"], "*");
    }
}
