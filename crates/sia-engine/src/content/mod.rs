//! Section-content tree commands and numbering
//!
//! # Core Concepts
//!
//! - [`ContentCommand`]: edits to sections and their ordered items
//! - [`ContentReducer`]: pure reducer over [`ContentTree`]
//! - [`numbering`]: global "Figura N" / "Cuadro N" derived on demand
//!
//! Item ids are unique across the whole tree; an insert reusing an id that
//! already exists anywhere is a no-op.

pub mod numbering;

use crate::context::ReduceContext;
use crate::reducer::{commit, SliceReducer};
use serde::{Deserialize, Serialize};
use sia_model::{ContentItem, ContentSection, ContentTree};
use std::sync::Arc;

/// Commands in the `content/*` namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum ContentCommand {
    #[serde(rename = "content/addSection")]
    AddSection { section: ContentSection },

    /// Drops the section and every item it holds
    #[serde(rename = "content/removeSection")]
    RemoveSection { section_id: String },

    #[serde(rename = "content/renameSection")]
    RenameSection { section_id: String, title: String },

    /// Insert at `position` (appended when absent or out of range)
    #[serde(rename = "content/insertItem")]
    InsertItem {
        section_id: String,
        item: ContentItem,
        #[serde(default)]
        position: Option<usize>,
    },

    #[serde(rename = "content/removeItem")]
    RemoveItem { item_id: String },

    /// Move an item within its section or into another one
    #[serde(rename = "content/moveItem")]
    MoveItem {
        item_id: String,
        to_section_id: String,
        #[serde(default)]
        position: Option<usize>,
    },

    /// Replace the item carrying the same id, in place
    #[serde(rename = "content/replaceItem")]
    ReplaceItem { item: ContentItem },
}

impl ContentCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddSection { .. } => "content/addSection",
            Self::RemoveSection { .. } => "content/removeSection",
            Self::RenameSection { .. } => "content/renameSection",
            Self::InsertItem { .. } => "content/insertItem",
            Self::RemoveItem { .. } => "content/removeItem",
            Self::MoveItem { .. } => "content/moveItem",
            Self::ReplaceItem { .. } => "content/replaceItem",
        }
    }
}

/// Reducer for [`ContentTree`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentReducer;

impl SliceReducer for ContentReducer {
    type Slice = ContentTree;
    type Command = ContentCommand;

    fn reduce(
        slice: &Arc<ContentTree>,
        command: &ContentCommand,
        _ctx: &ReduceContext,
    ) -> Arc<ContentTree> {
        let next = match command {
            ContentCommand::AddSection { section } => {
                if section.id.is_empty()
                    || slice.sections.contains_key(&section.id)
                    || section.contents.iter().any(|item| slice.item(item.id()).is_some())
                {
                    None
                } else {
                    Some(with_section(slice, section.clone()))
                }
            }
            ContentCommand::RemoveSection { section_id } => {
                slice.sections.contains_key(section_id).then(|| ContentTree {
                    sections: slice.sections.without(section_id),
                })
            }
            ContentCommand::RenameSection { section_id, title } => slice
                .section(section_id)
                .filter(|section| section.title != *title)
                .map(|section| {
                    with_section(
                        slice,
                        ContentSection {
                            title: title.clone(),
                            ..section.clone()
                        },
                    )
                }),
            ContentCommand::InsertItem {
                section_id,
                item,
                position,
            } => {
                if item.id().is_empty() || slice.item(item.id()).is_some() {
                    None
                } else {
                    slice.section(section_id).map(|section| {
                        let mut section = section.clone();
                        let at = clamp(*position, section.contents.len());
                        section.contents.insert(at, item.clone());
                        with_section(slice, section)
                    })
                }
            }
            ContentCommand::RemoveItem { item_id } => slice.owner_of(item_id).and_then(|owner| {
                let mut section = owner.clone();
                let at = section.item_position(item_id)?;
                section.contents.remove(at);
                Some(with_section(slice, section))
            }),
            ContentCommand::MoveItem {
                item_id,
                to_section_id,
                position,
            } => move_item(slice, item_id, to_section_id, *position),
            ContentCommand::ReplaceItem { item } => slice.owner_of(item.id()).and_then(|owner| {
                let at = owner.item_position(item.id())?;
                if owner.contents[at] == *item {
                    return None;
                }
                let mut section = owner.clone();
                section.contents.set(at, item.clone());
                Some(with_section(slice, section))
            }),
        };
        commit(slice, next)
    }
}

fn move_item(
    tree: &ContentTree,
    item_id: &str,
    to_section_id: &str,
    position: Option<usize>,
) -> Option<ContentTree> {
    let owner = tree.owner_of(item_id)?;
    let from = owner.item_position(item_id)?;
    tree.section(to_section_id)?;

    let mut source = owner.clone();
    let item = source.contents.remove(from);

    if owner.id == to_section_id {
        let at = clamp(position, source.contents.len());
        if at == from {
            return None;
        }
        source.contents.insert(at, item);
        return Some(with_section(tree, source));
    }

    let tree = with_section(tree, source);
    let mut target = tree.section(to_section_id)?.clone();
    let at = clamp(position, target.contents.len());
    target.contents.insert(at, item);
    Some(with_section(&tree, target))
}

fn with_section(tree: &ContentTree, section: ContentSection) -> ContentTree {
    ContentTree {
        sections: tree.sections.update(section.id.clone(), section),
    }
}

fn clamp(position: Option<usize>, len: usize) -> usize {
    position.map_or(len, |p| p.min(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sia_model::{ImageContent, ParagraphContent};

    fn ctx() -> ReduceContext {
        ReduceContext::at(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
    }

    fn figure(id: &str) -> ContentItem {
        ContentItem::Image(ImageContent {
            id: id.into(),
            image_id: None,
            title: format!("Figura {id}"),
            source: String::new(),
        })
    }

    fn tree_with(sections: &[&str]) -> Arc<ContentTree> {
        sections.iter().fold(Arc::new(ContentTree::default()), |tree, id| {
            ContentReducer::reduce(
                &tree,
                &ContentCommand::AddSection {
                    section: ContentSection::new(*id, format!("Sección {id}")),
                },
                &ctx(),
            )
        })
    }

    fn insert(
        tree: &Arc<ContentTree>,
        section: &str,
        item: ContentItem,
        position: Option<usize>,
    ) -> Arc<ContentTree> {
        ContentReducer::reduce(
            tree,
            &ContentCommand::InsertItem {
                section_id: section.into(),
                item,
                position,
            },
            &ctx(),
        )
    }

    #[test]
    fn item_ids_unique_across_tree() {
        let tree = tree_with(&["s1", "s2"]);
        let tree = insert(&tree, "s1", figure("f1"), None);
        let again = insert(&tree, "s2", figure("f1"), None);
        assert!(Arc::ptr_eq(&tree, &again));
    }

    #[test]
    fn insert_into_missing_section_is_noop() {
        let tree = tree_with(&["s1"]);
        let next = insert(&tree, "s9", figure("f1"), None);
        assert!(Arc::ptr_eq(&tree, &next));
    }

    #[test]
    fn move_between_sections() {
        let tree = tree_with(&["s1", "s2"]);
        let tree = insert(&tree, "s1", figure("f1"), None);
        let tree = insert(
            &tree,
            "s2",
            ContentItem::Paragraph(ParagraphContent {
                id: "p1".into(),
                text: "Texto".into(),
            }),
            None,
        );
        let tree = ContentReducer::reduce(
            &tree,
            &ContentCommand::MoveItem {
                item_id: "f1".into(),
                to_section_id: "s2".into(),
                position: Some(0),
            },
            &ctx(),
        );
        assert!(tree.section("s1").unwrap().contents.is_empty());
        assert_eq!(tree.section("s2").unwrap().item_position("f1"), Some(0));
        assert_eq!(tree.section("s2").unwrap().item_position("p1"), Some(1));
    }

    #[test]
    fn move_to_same_place_is_noop() {
        let tree = insert(&tree_with(&["s1"]), "s1", figure("f1"), None);
        let next = ContentReducer::reduce(
            &tree,
            &ContentCommand::MoveItem {
                item_id: "f1".into(),
                to_section_id: "s1".into(),
                position: None,
            },
            &ctx(),
        );
        assert!(Arc::ptr_eq(&tree, &next));
    }

    #[test]
    fn replace_and_remove() {
        let tree = insert(&tree_with(&["s1"]), "s1", figure("f1"), None);
        let mut replacement = figure("f1");
        if let ContentItem::Image(image) = &mut replacement {
            image.title = "Plaza principal".into();
        }
        let replace = ContentCommand::ReplaceItem { item: replacement };
        let tree = ContentReducer::reduce(&tree, &replace, &ctx());
        assert_eq!(tree.item("f1").and_then(ContentItem::title), Some("Plaza principal"));

        let remove = ContentCommand::RemoveItem {
            item_id: "f1".into(),
        };
        let tree = ContentReducer::reduce(&tree, &remove, &ctx());
        assert!(tree.item("f1").is_none());
    }
}
