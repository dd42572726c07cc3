//! Stream-field blocks
//!
//! Each block is a plain struct with its admin metadata attached through the
//! `StructBlock` trait. Stream fields are stored as JSON arrays of
//! `{"type": ..., "value": ..., "id": ...}` children.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::FieldError;

// ============================================================================
// Field values
// ============================================================================

/// Rich-text HTML as stored by the editor (rendering/sanitizing happens elsewhere)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub String);

impl RichText {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_html(&self) -> &str {
        &self.0
    }

    /// True when the HTML carries no visible text (e.g. `<p></p>` or `<p> </p>`)
    pub fn is_blank(&self) -> bool {
        let mut in_tag = false;
        for c in self.0.chars() {
            match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                c if !in_tag && !c.is_whitespace() => return false,
                _ => {}
            }
        }
        // Embeds are tag-only content
        !self.0.contains("<embed")
    }
}

/// Reference to an image in the host's image library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub u64);

/// Reference to a document in the host's document library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

// ============================================================================
// Block metadata
// ============================================================================

/// Admin-facing block metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockMeta {
    pub icon: &'static str,
    pub label: &'static str,
    pub template: Option<&'static str>,
}

/// Rich-text toolbar features allowed for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RichTextFeatures(pub &'static [&'static str]);

pub const INTRO_FEATURES: RichTextFeatures = RichTextFeatures(&["bold", "italic", "link"]);
pub const ACHIEVEMENT_FEATURES: RichTextFeatures =
    RichTextFeatures(&["h3", "bold", "italic", "ul", "ol", "link"]);
pub const EMBED_FEATURES: RichTextFeatures = RichTextFeatures(&["embed"]);

/// Description of one block field, for the schema catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockField {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
    pub help_text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<RichTextFeatures>,
}

impl BlockField {
    const fn new(name: &'static str, kind: &'static str, required: bool, help_text: &'static str) -> Self {
        Self { name, kind, required, help_text, features: None }
    }

    const fn rich_text(name: &'static str, required: bool, help_text: &'static str, features: RichTextFeatures) -> Self {
        Self { name, kind: "rich_text", required, help_text, features: Some(features) }
    }
}

/// A struct block that can live in a stream field
pub trait StructBlock {
    /// Stream child type name (`"type"` in the stored JSON)
    const NAME: &'static str;

    fn meta() -> BlockMeta;

    fn fields() -> &'static [BlockField];

    /// Push an error for every invalid field; `path` prefixes field names
    fn validate(&self, path: &str, errors: &mut Vec<FieldError>);
}

fn require_text(value: &str, path: &str, field: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(format!("{}.{}", path, field), "This field is required."));
    }
}

// ============================================================================
// Blocks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementBlock {
    pub title: String,
    #[serde(default)]
    pub description: RichText,
    #[serde(default)]
    pub image: Option<ImageId>,
}

impl StructBlock for AchievementBlock {
    const NAME: &'static str = "achievement";

    fn meta() -> BlockMeta {
        BlockMeta {
            icon: "award",
            label: "Achievement",
            template: Some("blocks/achievement_block.html"),
        }
    }

    fn fields() -> &'static [BlockField] {
        const FIELDS: &[BlockField] = &[
            BlockField::new("title", "char", true, "Achievement heading (plain text)"),
            BlockField::rich_text("description", true, "Use toolbar for headings and lists", ACHIEVEMENT_FEATURES),
            BlockField::new("image", "image", false, "Optional supporting image"),
        ];
        FIELDS
    }

    fn validate(&self, path: &str, errors: &mut Vec<FieldError>) {
        require_text(&self.title, path, "title", errors);
        if self.description.is_blank() {
            errors.push(FieldError::new(format!("{}.description", path), "This field is required."));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaUpdateBlock {
    pub title: String,
    #[serde(default)]
    pub media_link: Option<String>,
    #[serde(default)]
    pub video_embed: Option<RichText>,
    #[serde(default)]
    pub thumbnail: Option<ImageId>,
}

impl StructBlock for MediaUpdateBlock {
    const NAME: &'static str = "media";

    fn meta() -> BlockMeta {
        BlockMeta { icon: "media", label: "Media Update", template: None }
    }

    fn fields() -> &'static [BlockField] {
        const FIELDS: &[BlockField] = &[
            BlockField::new("title", "char", true, "Media headline / title"),
            BlockField::new("media_link", "url", false, "Link to news article (optional)"),
            BlockField::rich_text("video_embed", false, "Paste YouTube / video embed", EMBED_FEATURES),
            BlockField::new("thumbnail", "image", false, "Optional thumbnail image"),
        ];
        FIELDS
    }

    fn validate(&self, path: &str, errors: &mut Vec<FieldError>) {
        require_text(&self.title, path, "title", errors);
        if let Some(link) = self.media_link.as_deref().filter(|l| !l.trim().is_empty()) {
            if Url::parse(link.trim()).is_err() {
                errors.push(FieldError::new(format!("{}.media_link", path), "Enter a valid URL."));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentBlock {
    pub title: String,
    pub document: Option<DocumentId>,
    #[serde(default)]
    pub description: Option<RichText>,
}

impl StructBlock for DocumentBlock {
    const NAME: &'static str = "document";

    fn meta() -> BlockMeta {
        BlockMeta { icon: "doc-full", label: "Document", template: None }
    }

    fn fields() -> &'static [BlockField] {
        const FIELDS: &[BlockField] = &[
            BlockField::new("title", "char", true, "Document title shown in the list"),
            BlockField::new("document", "document", true, "File from the document library"),
            BlockField::rich_text("description", false, "Short summary (optional)", INTRO_FEATURES),
        ];
        FIELDS
    }

    fn validate(&self, path: &str, errors: &mut Vec<FieldError>) {
        require_text(&self.title, path, "title", errors);
        if self.document.is_none() {
            errors.push(FieldError::new(format!("{}.document", path), "This field is required."));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImageBlock {
    pub image: Option<ImageId>,
    #[serde(default)]
    pub caption: String,
}

impl StructBlock for GalleryImageBlock {
    const NAME: &'static str = "image";

    fn meta() -> BlockMeta {
        BlockMeta { icon: "image", label: "Photo", template: None }
    }

    fn fields() -> &'static [BlockField] {
        const FIELDS: &[BlockField] = &[
            BlockField::new("image", "image", true, "Gallery photo"),
            BlockField::new("caption", "char", false, "Optional caption"),
        ];
        FIELDS
    }

    fn validate(&self, path: &str, errors: &mut Vec<FieldError>) {
        if self.image.is_none() {
            errors.push(FieldError::new(format!("{}.image", path), "This field is required."));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveBlock {
    pub title: String,
    #[serde(default)]
    pub description: RichText,
}

impl StructBlock for ObjectiveBlock {
    const NAME: &'static str = "objective";

    fn meta() -> BlockMeta {
        BlockMeta { icon: "list-ul", label: "Objective", template: None }
    }

    fn fields() -> &'static [BlockField] {
        const FIELDS: &[BlockField] = &[
            BlockField::new("title", "char", true, "Objective heading"),
            BlockField::rich_text("description", false, "Details", ACHIEVEMENT_FEATURES),
        ];
        FIELDS
    }

    fn validate(&self, path: &str, errors: &mut Vec<FieldError>) {
        require_text(&self.title, path, "title", errors);
    }
}

// ============================================================================
// Stream field
// ============================================================================

/// One stored stream child
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChild<T> {
    #[serde(rename = "type")]
    pub block_type: String,
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A stream field accepting a single block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamField<T>(pub Vec<StreamChild<T>>);

impl<T> Default for StreamField<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: StructBlock> StreamField<T> {
    pub fn from_blocks(blocks: impl IntoIterator<Item = T>) -> Self {
        Self(
            blocks
                .into_iter()
                .map(|value| StreamChild {
                    block_type: T::NAME.to_string(),
                    value,
                    id: Some(uuid::Uuid::new_v4().to_string()),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &T> {
        self.0.iter().map(|child| &child.value)
    }

    pub fn validate(&self, field: &str, errors: &mut Vec<FieldError>) {
        for (idx, child) in self.0.iter().enumerate() {
            let path = format!("{}[{}]", field, idx);
            if child.block_type != T::NAME {
                errors.push(FieldError::new(
                    path,
                    format!("Unknown block type '{}' (expected '{}')", child.block_type, T::NAME),
                ));
                continue;
            }
            child.value.validate(&path, errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_text_blank_detection() {
        assert!(RichText::new("").is_blank());
        assert!(RichText::new("<p> </p>").is_blank());
        assert!(!RichText::new("<p>Won <b>gold</b></p>").is_blank());
        assert!(!RichText::new(r#"<embed embedtype="media" url="https://youtu.be/x"/>"#).is_blank());
    }

    #[test]
    fn test_stream_field_json_shape() {
        let json = r#"[{"type": "achievement", "value": {"title": "Award", "description": "<p>Done</p>"}, "id": "abc"}]"#;
        let field: StreamField<AchievementBlock> = serde_json::from_str(json).unwrap();
        assert_eq!(field.len(), 1);
        assert_eq!(field.0[0].id.as_deref(), Some("abc"));
        assert_eq!(field.blocks().next().unwrap().image, None);
    }

    #[test]
    fn test_stream_field_rejects_wrong_block_type() {
        let json = r#"[{"type": "media", "value": {"title": "Award", "description": "<p>x</p>"}}]"#;
        let field: StreamField<AchievementBlock> = serde_json::from_str(json).unwrap();
        let mut errors = Vec::new();
        field.validate("achievements", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "achievements[0]");
    }

    #[test]
    fn test_achievement_requires_title_and_description() {
        let block = AchievementBlock {
            title: "  ".into(),
            description: RichText::new("<p></p>"),
            image: None,
        };
        let mut errors = Vec::new();
        block.validate("achievements[0]", &mut errors);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["achievements[0].title", "achievements[0].description"]);
    }

    #[test]
    fn test_media_link_must_be_url() {
        let mut block = MediaUpdateBlock {
            title: "Interview".into(),
            media_link: Some("not a url".into()),
            video_embed: None,
            thumbnail: None,
        };
        let mut errors = Vec::new();
        block.validate("media_updates[0]", &mut errors);
        assert_eq!(errors.len(), 1);

        block.media_link = Some("https://news.example.org/story".into());
        errors.clear();
        block.validate("media_updates[0]", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_document_and_gallery_require_library_items() {
        let mut errors = Vec::new();
        DocumentBlock { title: "Report".into(), document: None, description: None }
            .validate("documents[0]", &mut errors);
        GalleryImageBlock { image: None, caption: String::new() }.validate("images[0]", &mut errors);
        assert_eq!(errors.len(), 2);
    }
}
