//! Section-content tree
//!
//! A second, content-oriented store: sections holding ordered paragraphs,
//! images and tables. Items record only their local position; global
//! "Figura N" / "Cuadro N" numbers are computed from the canonical section
//! order and never stored.

use crate::keys::CompositeKey;
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

/// Kind of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Paragraph,
    Image,
    Table,
}

impl ContentKind {
    /// Caption prefix for numbered kinds
    #[must_use]
    pub fn label_prefix(self) -> Option<&'static str> {
        match self {
            Self::Paragraph => None,
            Self::Image => Some("Figura"),
            Self::Table => Some("Cuadro"),
        }
    }
}

/// Narrative text block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphContent {
    pub id: String,
    pub text: String,
}

/// Figure placed in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub id: String,
    /// Photograph in the image slice this figure shows, if any
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "fuente", default)]
    pub source: String,
}

/// Table placed in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContent {
    pub id: String,
    /// Table in the table slice this item renders, if any
    #[serde(default)]
    pub table_key: Option<CompositeKey>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "fuente", default)]
    pub source: String,
}

/// Content item; adding a kind forces every selector match to be revisited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Paragraph(ParagraphContent),
    Image(ImageContent),
    Table(TableContent),
}

impl ContentItem {
    /// Item id, unique across the tree
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Paragraph(p) => &p.id,
            Self::Image(i) => &i.id,
            Self::Table(t) => &t.id,
        }
    }

    /// Item kind
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Paragraph(_) => ContentKind::Paragraph,
            Self::Image(_) => ContentKind::Image,
            Self::Table(_) => ContentKind::Table,
        }
    }

    /// Caption title for numbered kinds
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Paragraph(_) => None,
            Self::Image(i) => Some(&i.title),
            Self::Table(t) => Some(&t.title),
        }
    }
}

/// Section classification in the content tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    #[default]
    General,
    Aisd,
    Aisi,
}

/// A section of the content tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub section_type: SectionType,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub contents: Vector<ContentItem>,
    #[serde(rename = "orden", default)]
    pub order: usize,
}

impl ContentSection {
    /// Empty section
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            section_type: SectionType::General,
            group_id: None,
            parent_id: None,
            contents: Vector::new(),
            order: 0,
        }
    }

    /// Position of an item inside this section
    #[must_use]
    pub fn item_position(&self, item_id: &str) -> Option<usize> {
        self.contents.iter().position(|item| item.id() == item_id)
    }

    /// Number of items of a kind
    #[must_use]
    pub fn count_of(&self, kind: ContentKind) -> usize {
        self.contents.iter().filter(|item| item.kind() == kind).count()
    }
}

/// Content tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTree {
    pub sections: OrdMap<String, ContentSection>,
}

impl ContentTree {
    /// Section by id
    #[inline]
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&ContentSection> {
        self.sections.get(id)
    }

    /// Section holding an item
    #[must_use]
    pub fn owner_of(&self, item_id: &str) -> Option<&ContentSection> {
        self.sections
            .values()
            .find(|section| section.item_position(item_id).is_some())
    }

    /// Item by id
    #[must_use]
    pub fn item(&self, item_id: &str) -> Option<&ContentItem> {
        self.sections
            .values()
            .flat_map(|section| section.contents.iter())
            .find(|item| item.id() == item_id)
    }
}
