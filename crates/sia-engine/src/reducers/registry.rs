//! Global registry reducer (location and interviewees)

use crate::context::ReduceContext;
use crate::reducer::{commit, SliceReducer};
use serde::{Deserialize, Serialize};
use sia_model::{GlobalRegistryState, Interviewee, RegistryLocation};
use std::sync::Arc;

/// Partial interviewee update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervieweePatch {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "cargo", default)]
    pub role: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Commands in the `registry/*` namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum RegistryCommand {
    /// `None` clears the location
    #[serde(rename = "registry/setLocation")]
    SetLocation { location: Option<RegistryLocation> },

    /// Append; an id already present is ignored
    #[serde(rename = "registry/addInterviewee")]
    AddInterviewee { interviewee: Interviewee },

    #[serde(rename = "registry/updateInterviewee")]
    UpdateInterviewee {
        id: String,
        #[serde(flatten)]
        patch: IntervieweePatch,
    },

    #[serde(rename = "registry/removeInterviewee")]
    RemoveInterviewee { id: String },
}

impl RegistryCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetLocation { .. } => "registry/setLocation",
            Self::AddInterviewee { .. } => "registry/addInterviewee",
            Self::UpdateInterviewee { .. } => "registry/updateInterviewee",
            Self::RemoveInterviewee { .. } => "registry/removeInterviewee",
        }
    }
}

/// Reducer for [`GlobalRegistryState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryReducer;

impl SliceReducer for RegistryReducer {
    type Slice = GlobalRegistryState;
    type Command = RegistryCommand;

    fn reduce(
        slice: &Arc<GlobalRegistryState>,
        command: &RegistryCommand,
        _ctx: &ReduceContext,
    ) -> Arc<GlobalRegistryState> {
        let next = match command {
            RegistryCommand::SetLocation { location } => {
                (slice.location != *location).then(|| GlobalRegistryState {
                    location: location.clone(),
                    ..(**slice).clone()
                })
            }
            RegistryCommand::AddInterviewee { interviewee } => {
                if interviewee.id.is_empty() || slice.interviewee(&interviewee.id).is_some() {
                    None
                } else {
                    let mut next = (**slice).clone();
                    next.interviewees.push_back(interviewee.clone());
                    Some(next)
                }
            }
            RegistryCommand::UpdateInterviewee { id, patch } => {
                slice.interviewees.iter().position(|i| i.id == *id).and_then(|index| {
                    let current = &slice.interviewees[index];
                    let updated = Interviewee {
                        id: current.id.clone(),
                        name: patch.name.clone().unwrap_or_else(|| current.name.clone()),
                        role: patch.role.clone().or_else(|| current.role.clone()),
                        group_id: patch.group_id.clone().or_else(|| current.group_id.clone()),
                    };
                    (updated != *current).then(|| {
                        let mut next = (**slice).clone();
                        next.interviewees.set(index, updated);
                        next
                    })
                })
            }
            RegistryCommand::RemoveInterviewee { id } => {
                slice.interviewee(id).map(|_| GlobalRegistryState {
                    location: slice.location.clone(),
                    interviewees: slice
                        .interviewees
                        .iter()
                        .filter(|i| i.id != *id)
                        .cloned()
                        .collect(),
                })
            }
        };
        commit(slice, next)
    }
}
