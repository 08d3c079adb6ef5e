//! Photograph reducer
//!
//! After every add, remove or reorder two derived fields are rewritten:
//! `orden` inside the affected gallery and the document-wide `numero`.

use crate::context::ReduceContext;
use crate::reducer::{commit, SliceReducer};
use crate::reducers::groups::GroupRemap;
use im::OrdMap;
use serde::{Deserialize, Serialize};
use sia_model::{ImageEntry, ImagesState, UploadStatus};
use std::collections::HashSet;
use std::sync::Arc;

/// Payload of `image/add`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewImage {
    pub id: String,
    pub section_id: String,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub fuente: String,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub local_path: Option<String>,
}

/// Caption fields accepted by `image/update`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePatch {
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub fuente: Option<String>,
    #[serde(default)]
    pub preview: Option<String>,
}

/// Commands in the `image/*` namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum ImageCommand {
    /// Append to the end of its gallery
    #[serde(rename = "image/add")]
    Add {
        #[serde(flatten)]
        image: NewImage,
    },

    #[serde(rename = "image/update")]
    Update {
        id: String,
        #[serde(flatten)]
        patch: ImagePatch,
    },

    #[serde(rename = "image/remove")]
    Remove { id: String },

    /// `ordered_ids` must be a permutation of the gallery
    #[serde(rename = "image/reorder")]
    Reorder {
        section_id: String,
        #[serde(default)]
        group_id: Option<String>,
        ordered_ids: Vec<String>,
    },

    #[serde(rename = "image/setUploadStatus")]
    SetUploadStatus {
        id: String,
        status: UploadStatus,
        #[serde(default)]
        backend_id: Option<String>,
        #[serde(default)]
        local_path: Option<String>,
    },
}

impl ImageCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "image/add",
            Self::Update { .. } => "image/update",
            Self::Remove { .. } => "image/remove",
            Self::Reorder { .. } => "image/reorder",
            Self::SetUploadStatus { .. } => "image/setUploadStatus",
        }
    }
}

/// Reducer for [`ImagesState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageReducer;

impl SliceReducer for ImageReducer {
    type Slice = ImagesState;
    type Command = ImageCommand;

    fn reduce(
        slice: &Arc<ImagesState>,
        command: &ImageCommand,
        ctx: &ReduceContext,
    ) -> Arc<ImagesState> {
        let next = match command {
            ImageCommand::Add { image } => add(slice, image, ctx),
            ImageCommand::Update { id, patch } => edit(slice, id, ctx, |entry| {
                let mut next = entry.clone();
                if let Some(titulo) = &patch.titulo {
                    next.titulo.clone_from(titulo);
                }
                if let Some(fuente) = &patch.fuente {
                    next.fuente.clone_from(fuente);
                }
                if patch.preview.is_some() {
                    next.preview.clone_from(&patch.preview);
                }
                next
            }),
            ImageCommand::SetUploadStatus {
                id,
                status,
                backend_id,
                local_path,
            } => edit(slice, id, ctx, |entry| {
                let mut next = entry.clone();
                next.upload_status = *status;
                if backend_id.is_some() {
                    next.backend_id.clone_from(backend_id);
                }
                if local_path.is_some() {
                    next.local_path.clone_from(local_path);
                }
                next
            }),
            ImageCommand::Remove { id } => slice.get(id).map(|removed| {
                let by_id = slice.by_id.without(id);
                let by_id = compact_gallery(
                    by_id,
                    &removed.section_id,
                    removed.group_id.as_deref(),
                    ctx,
                );
                ImagesState {
                    by_id: renumber(by_id, ctx),
                    all_ids: slice.all_ids.iter().filter(|i| *i != id).cloned().collect(),
                }
            }),
            ImageCommand::Reorder {
                section_id,
                group_id,
                ordered_ids,
            } => reorder(slice, section_id, group_id.as_deref(), ordered_ids, ctx),
        };
        commit(slice, next)
    }
}

fn add(slice: &ImagesState, image: &NewImage, ctx: &ReduceContext) -> Option<ImagesState> {
    if image.id.is_empty() || image.section_id.is_empty() || slice.by_id.contains_key(&image.id) {
        return None;
    }
    let order = slice.gallery(&image.section_id, image.group_id.as_deref()).len();
    let entry = ImageEntry {
        id: image.id.clone(),
        section_id: image.section_id.clone(),
        group_id: image.group_id.clone(),
        numero: 0,
        titulo: image.titulo.clone(),
        fuente: image.fuente.clone(),
        preview: image.preview.clone(),
        upload_status: UploadStatus::Pending,
        backend_id: None,
        local_path: image.local_path.clone(),
        order,
        last_modified: Some(ctx.now),
    };
    let mut all_ids = slice.all_ids.clone();
    all_ids.push_back(image.id.clone());
    Some(ImagesState {
        by_id: renumber(slice.by_id.update(image.id.clone(), entry), ctx),
        all_ids,
    })
}

fn edit(
    slice: &ImagesState,
    id: &str,
    ctx: &ReduceContext,
    change: impl FnOnce(&ImageEntry) -> ImageEntry,
) -> Option<ImagesState> {
    let entry = slice.get(id)?;
    let mut next = change(entry);
    if next == *entry {
        return None;
    }
    next.last_modified = Some(ctx.now);
    Some(ImagesState {
        by_id: slice.by_id.update(id.to_string(), next),
        all_ids: slice.all_ids.clone(),
    })
}

fn reorder(
    slice: &ImagesState,
    section_id: &str,
    group_id: Option<&str>,
    ordered_ids: &[String],
    ctx: &ReduceContext,
) -> Option<ImagesState> {
    let gallery = slice.gallery(section_id, group_id);
    if gallery.len() != ordered_ids.len() {
        return None;
    }
    let mut current: Vec<&str> = gallery.iter().map(|img| img.id.as_str()).collect();
    if current.iter().zip(ordered_ids).all(|(a, b)| *a == b) {
        return None;
    }
    let mut proposed: Vec<&str> = ordered_ids.iter().map(String::as_str).collect();
    current.sort_unstable();
    proposed.sort_unstable();
    if current != proposed {
        return None;
    }

    let mut by_id = slice.by_id.clone();
    for (order, id) in ordered_ids.iter().enumerate() {
        if let Some(entry) = by_id.get(id) {
            let entry = ImageEntry {
                order,
                last_modified: Some(ctx.now),
                ..entry.clone()
            };
            by_id.insert(id.clone(), entry);
        }
    }
    Some(ImagesState {
        by_id: renumber(by_id, ctx),
        all_ids: slice.all_ids.clone(),
    })
}

/// Follow a group remap: galleries move with their group, photographs of
/// removed groups go, and `numero` is rewritten
pub(crate) fn regroup(
    slice: &Arc<ImagesState>,
    remap: &GroupRemap,
    ctx: &ReduceContext,
) -> Arc<ImagesState> {
    if !slice.by_id.values().any(|img| remap.touches(img.group_id.as_deref())) {
        return Arc::clone(slice);
    }
    let mut by_id = slice.by_id.clone();
    let mut gone = HashSet::new();
    for image in slice.by_id.values() {
        let group = image.group_id.as_deref();
        let Some(group) = group.filter(|group| remap.touches(Some(*group))) else {
            continue;
        };
        if let Some(new) = remap.resolve(group) {
            let moved = ImageEntry {
                group_id: Some(new.to_string()),
                last_modified: Some(ctx.now),
                ..image.clone()
            };
            by_id.insert(image.id.clone(), moved);
        } else {
            by_id.remove(&image.id);
            gone.insert(image.id.as_str());
        }
    }
    Arc::new(ImagesState {
        by_id: renumber(by_id, ctx),
        all_ids: slice
            .all_ids
            .iter()
            .filter(|id| !gone.contains(id.as_str()))
            .cloned()
            .collect(),
    })
}

/// Close the gap a removal left in one gallery
fn compact_gallery(
    mut by_id: OrdMap<String, ImageEntry>,
    section_id: &str,
    group_id: Option<&str>,
    ctx: &ReduceContext,
) -> OrdMap<String, ImageEntry> {
    let mut gallery: Vec<ImageEntry> = by_id
        .values()
        .filter(|img| img.in_gallery(section_id, group_id))
        .cloned()
        .collect();
    gallery.sort_by_key(|img| img.order);
    for (order, mut entry) in gallery.into_iter().enumerate() {
        if entry.order != order {
            entry.order = order;
            entry.last_modified = Some(ctx.now);
            by_id.insert(entry.id.clone(), entry);
        }
    }
    by_id
}

/// Rewrite `numero` to `1..=n` in document order
fn renumber(
    mut by_id: OrdMap<String, ImageEntry>,
    ctx: &ReduceContext,
) -> OrdMap<String, ImageEntry> {
    let mut ordered: Vec<ImageEntry> = by_id.values().cloned().collect();
    ordered.sort_by(|a, b| a.document_cmp(b, &ctx.section_order));
    for (numero, mut entry) in (1u32..).zip(ordered) {
        if entry.numero != numero {
            entry.numero = numero;
            entry.last_modified = Some(ctx.now);
            by_id.insert(entry.id.clone(), entry);
        }
    }
    by_id
}
