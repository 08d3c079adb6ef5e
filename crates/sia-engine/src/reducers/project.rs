//! Whole-document commands

use crate::context::ReduceContext;
use serde::{Deserialize, Serialize};
use sia_model::{ProjectMetadata, ProjectState, Timestamp};
use std::sync::Arc;

/// Commands in the `project/*` namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum ProjectCommand {
    /// Start over from an empty report; a no-op on an untouched one
    #[serde(rename = "project/reset")]
    Reset,

    /// Record that the current state was persisted at `at`
    #[serde(rename = "project/markSaved")]
    MarkSaved { at: Timestamp },
}

impl ProjectCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reset => "project/reset",
            Self::MarkSaved { .. } => "project/markSaved",
        }
    }
}

/// Outcome of a project command
pub(crate) enum ProjectOutcome {
    /// Content changed; the root stamps the transition
    Changed(ProjectState),
    /// Only bookkeeping changed; stored as is
    Bookkeeping(ProjectState),
    Unchanged,
}

pub(crate) fn apply(
    state: &ProjectState,
    command: &ProjectCommand,
    ctx: &ReduceContext,
) -> ProjectOutcome {
    match command {
        ProjectCommand::Reset => {
            if is_pristine(state) {
                return ProjectOutcome::Unchanged;
            }
            let mut fresh = ProjectState::new(ctx.now);
            fresh.internal.revision = state.internal.revision;
            fresh.internal.last_saved = state.internal.last_saved;
            ProjectOutcome::Changed(fresh)
        }
        ProjectCommand::MarkSaved { at } => {
            if !state.internal.is_dirty && state.internal.last_saved == Some(*at) {
                return ProjectOutcome::Unchanged;
            }
            let mut saved = state.clone();
            saved.internal.is_dirty = false;
            saved.internal.last_saved = Some(*at);
            ProjectOutcome::Bookkeeping(saved)
        }
    }
}

/// True when nothing but the creation stamps differs from an empty report
fn is_pristine(state: &ProjectState) -> bool {
    let blank = ProjectState {
        metadata: Arc::new(ProjectMetadata {
            created_at: state.metadata.created_at,
            updated_at: state.metadata.updated_at,
            ..ProjectMetadata::default()
        }),
        internal: state.internal.clone(),
        ..ProjectState::default()
    };
    *state == blank
}
