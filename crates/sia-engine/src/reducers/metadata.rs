//! Metadata reducer

use crate::context::ReduceContext;
use crate::reducer::{commit, SliceReducer};
use serde::{Deserialize, Serialize};
use sia_model::{LocationSelection, MetadataPatch, ProjectMetadata};
use std::sync::Arc;

/// Commands in the `metadata/*` namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum MetadataCommand {
    #[serde(rename = "metadata/setProjectName")]
    SetProjectName { project_name: String },

    #[serde(rename = "metadata/setConsultant")]
    SetConsultant { consultant: String },

    #[serde(rename = "metadata/setDescription")]
    SetDescription { description: String },

    #[serde(rename = "metadata/setLocation")]
    SetLocation { location: LocationSelection },

    #[serde(rename = "metadata/update")]
    Update { patch: MetadataPatch },
}

impl MetadataCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetProjectName { .. } => "metadata/setProjectName",
            Self::SetConsultant { .. } => "metadata/setConsultant",
            Self::SetDescription { .. } => "metadata/setDescription",
            Self::SetLocation { .. } => "metadata/setLocation",
            Self::Update { .. } => "metadata/update",
        }
    }

    fn to_patch(&self) -> MetadataPatch {
        match self {
            Self::SetProjectName { project_name } => MetadataPatch {
                project_name: Some(project_name.clone()),
                ..MetadataPatch::default()
            },
            Self::SetConsultant { consultant } => MetadataPatch {
                consultant: Some(consultant.clone()),
                ..MetadataPatch::default()
            },
            Self::SetDescription { description } => MetadataPatch {
                description: Some(description.clone()),
                ..MetadataPatch::default()
            },
            Self::SetLocation { location } => MetadataPatch {
                location: Some(location.clone()),
                ..MetadataPatch::default()
            },
            Self::Update { patch } => patch.clone(),
        }
    }
}

/// Reducer for [`ProjectMetadata`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataReducer;

impl SliceReducer for MetadataReducer {
    type Slice = ProjectMetadata;
    type Command = MetadataCommand;

    fn reduce(
        slice: &Arc<ProjectMetadata>,
        command: &MetadataCommand,
        ctx: &ReduceContext,
    ) -> Arc<ProjectMetadata> {
        let next = command.to_patch().apply(slice).map(|mut next| {
            next.updated_at = Some(ctx.now);
            next
        });
        commit(slice, next)
    }
}
