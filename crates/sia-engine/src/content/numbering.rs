//! Global figure and table numbering
//!
//! Numbers are never stored. The number of an item is one plus the count of
//! same-kind items that precede it when the content tree is read in
//! canonical section order:
//!
//! - every item of that kind in a section listed before the owning section
//! - items of that kind earlier in the owning section's content list
//!
//! Sections absent from the canonical order are not part of the numbered
//! document; items they hold have no number and do not shift others.

use serde::Serialize;
use sia_model::{ContentItem, ContentKind, ContentTree, SectionOrder};

/// One numbered item produced by [`enumerate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberedItem {
    pub item_id: String,
    pub section_id: String,
    pub kind: ContentKind,
    pub number: usize,
    pub label: String,
    pub title: String,
}

/// Global 1-based index of an item among items of `kind`
///
/// `None` when the item does not exist, is of another kind, or lives in a
/// section outside the canonical order.
#[must_use]
pub fn global_index(
    tree: &ContentTree,
    order: &SectionOrder,
    item_id: &str,
    kind: ContentKind,
) -> Option<usize> {
    let owner = tree.owner_of(item_id)?;
    let owner_position = order.position(&owner.id)?;
    let item_position = owner.item_position(item_id)?;
    if owner.contents[item_position].kind() != kind {
        return None;
    }

    let before: usize = order
        .iter()
        .take(owner_position)
        .filter_map(|id| tree.section(id))
        .map(|section| section.count_of(kind))
        .sum();
    let within = owner
        .contents
        .iter()
        .take(item_position)
        .filter(|item| item.kind() == kind)
        .count();
    Some(before + within + 1)
}

/// Global number of an image item
#[inline]
#[must_use]
pub fn figure_number(tree: &ContentTree, order: &SectionOrder, item_id: &str) -> Option<usize> {
    global_index(tree, order, item_id, ContentKind::Image)
}

/// Global number of a table item
#[inline]
#[must_use]
pub fn table_number(tree: &ContentTree, order: &SectionOrder, item_id: &str) -> Option<usize> {
    global_index(tree, order, item_id, ContentKind::Table)
}

/// Caption label such as `Figura 3` or `Cuadro 12`
#[must_use]
pub fn label(tree: &ContentTree, order: &SectionOrder, item_id: &str) -> Option<String> {
    let kind = tree.item(item_id)?.kind();
    let prefix = kind.label_prefix()?;
    let number = global_index(tree, order, item_id, kind)?;
    Some(format!("{prefix} {number}"))
}

/// Every numbered item in document order, computed in one walk
#[must_use]
pub fn enumerate(tree: &ContentTree, order: &SectionOrder) -> Vec<NumberedItem> {
    let mut figures = 0;
    let mut tables = 0;
    let mut numbered = Vec::new();

    for section in order.iter().filter_map(|id| tree.section(id)) {
        for item in &section.contents {
            let counter = match item {
                ContentItem::Paragraph(_) => continue,
                ContentItem::Image(_) => &mut figures,
                ContentItem::Table(_) => &mut tables,
            };
            *counter += 1;
            let kind = item.kind();
            numbered.push(NumberedItem {
                item_id: item.id().to_string(),
                section_id: section.id.clone(),
                kind,
                number: *counter,
                label: format!("{} {}", kind.label_prefix().unwrap_or_default(), *counter),
                title: item.title().unwrap_or_default().to_string(),
            });
        }
    }
    numbered
}
