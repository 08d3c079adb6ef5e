//! Photograph slice
//!
//! `numero` is a document-wide, gap-free sequence starting at 1. It is
//! rewritten after every add, remove or reorder and never edited directly.

use crate::order::{natural_cmp, SectionOrder};
use crate::Timestamp;
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Upload state of an image file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Pending,
    Uploaded,
    Error,
}

/// One photograph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub id: String,
    pub section_id: String,
    pub group_id: Option<String>,
    pub numero: u32,
    pub titulo: String,
    pub fuente: String,
    pub preview: Option<String>,
    pub upload_status: UploadStatus,
    pub backend_id: Option<String>,
    pub local_path: Option<String>,
    #[serde(rename = "orden")]
    pub order: usize,
    pub last_modified: Option<Timestamp>,
}

impl ImageEntry {
    /// Document ordering: section (canonical order), then group, then
    /// position inside the gallery
    #[must_use]
    pub fn document_cmp(&self, other: &Self, sections: &SectionOrder) -> Ordering {
        sections
            .compare(&self.section_id, &other.section_id)
            .then_with(|| match (&self.group_id, &other.group_id) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => natural_cmp(a, b),
            })
            .then_with(|| self.order.cmp(&other.order))
            .then_with(|| self.id.cmp(&other.id))
    }

    /// True when the image belongs to the given gallery
    #[must_use]
    pub fn in_gallery(&self, section_id: &str, group_id: Option<&str>) -> bool {
        self.section_id == section_id && self.group_id.as_deref() == group_id
    }
}

/// Image slice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesState {
    pub by_id: OrdMap<String, ImageEntry>,
    pub all_ids: Vector<String>,
}

impl ImagesState {
    /// Image by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ImageEntry> {
        self.by_id.get(id)
    }

    /// Images of one gallery, sorted by `orden`
    #[must_use]
    pub fn gallery(&self, section_id: &str, group_id: Option<&str>) -> Vec<&ImageEntry> {
        let mut images: Vec<_> = self
            .by_id
            .values()
            .filter(|img| img.in_gallery(section_id, group_id))
            .collect();
        images.sort_by_key(|img| img.order);
        images
    }

    /// All images by `numero`
    #[must_use]
    pub fn in_document_order(&self) -> Vec<&ImageEntry> {
        let mut images: Vec<_> = self.by_id.values().collect();
        images.sort_by(|a, b| a.numero.cmp(&b.numero).then_with(|| a.id.cmp(&b.id)));
        images
    }
}
