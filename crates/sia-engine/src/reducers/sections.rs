//! Section status reducer

use crate::context::ReduceContext;
use crate::reducer::{commit, SliceReducer};
use crate::reducers::groups::GroupRemap;
use im::OrdMap;
use serde::{Deserialize, Serialize};
use sia_model::{GroupKind, ScopeKey, SectionState, SectionsState};
use std::sync::Arc;

/// Commands in the `section/*` namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum SectionCommand {
    /// Mark a section scope as opened
    #[serde(rename = "section/initialize")]
    Initialize {
        section_id: String,
        #[serde(default)]
        group_id: Option<String>,
        #[serde(default)]
        group_type: Option<GroupKind>,
    },

    #[serde(rename = "section/setComplete")]
    SetComplete {
        section_id: String,
        #[serde(default)]
        group_id: Option<String>,
        is_complete: bool,
    },

    /// Forget the status of a section scope
    #[serde(rename = "section/reset")]
    Reset {
        section_id: String,
        #[serde(default)]
        group_id: Option<String>,
    },
}

impl SectionCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "section/initialize",
            Self::SetComplete { .. } => "section/setComplete",
            Self::Reset { .. } => "section/reset",
        }
    }

    fn scope(&self) -> Option<ScopeKey> {
        let (section_id, group_id) = match self {
            Self::Initialize {
                section_id, group_id, ..
            }
            | Self::SetComplete {
                section_id, group_id, ..
            }
            | Self::Reset {
                section_id, group_id,
            } => (section_id, group_id),
        };
        ScopeKey::new(section_id, group_id.as_deref()).ok()
    }
}

/// Reducer for [`SectionsState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionReducer;

impl SliceReducer for SectionReducer {
    type Slice = SectionsState;
    type Command = SectionCommand;

    fn reduce(
        slice: &Arc<SectionsState>,
        command: &SectionCommand,
        ctx: &ReduceContext,
    ) -> Arc<SectionsState> {
        let Some(scope) = command.scope() else {
            return Arc::clone(slice);
        };
        let current = slice.get(&scope);

        let next = match command {
            SectionCommand::Initialize {
                section_id,
                group_id,
                group_type,
            } => match current {
                Some(state) if state.is_initialized && state.group_type == *group_type => None,
                _ => {
                    let mut state = current.cloned().unwrap_or_else(|| {
                        SectionState::new(section_id.clone(), group_id.clone(), *group_type)
                    });
                    state.is_initialized = true;
                    state.group_type = *group_type;
                    state.last_modified = Some(ctx.now);
                    Some(upsert(slice, scope, state))
                }
            },
            SectionCommand::SetComplete {
                section_id,
                group_id,
                is_complete,
            } => match current {
                Some(state) if state.is_complete == *is_complete => None,
                None if !is_complete => None,
                _ => {
                    let mut state = current.cloned().unwrap_or_else(|| {
                        SectionState::new(section_id.clone(), group_id.clone(), None)
                    });
                    state.is_initialized = true;
                    state.is_complete = *is_complete;
                    state.last_modified = Some(ctx.now);
                    Some(upsert(slice, scope, state))
                }
            },
            SectionCommand::Reset { .. } => current.map(|_| SectionsState {
                by_id: slice.by_id.without(&scope),
            }),
        };
        commit(slice, next)
    }
}

/// Follow a group remap: statuses move with their group or are dropped
pub(crate) fn regroup(
    slice: &Arc<SectionsState>,
    remap: &GroupRemap,
    ctx: &ReduceContext,
) -> Arc<SectionsState> {
    if !slice.by_id.keys().any(|scope| remap.touches(scope.group_id())) {
        return Arc::clone(slice);
    }
    let mut by_id = OrdMap::new();
    for (scope, status) in &slice.by_id {
        let Some(group) = scope.group_id().filter(|group| remap.touches(Some(*group))) else {
            if !by_id.contains_key(scope) {
                by_id.insert(scope.clone(), status.clone());
            }
            continue;
        };
        let Some(new) = remap.resolve(group) else {
            continue;
        };
        let Ok(moved) = scope.with_group(new) else {
            continue;
        };
        let status = SectionState {
            group_id: Some(new.to_string()),
            last_modified: Some(ctx.now),
            ..status.clone()
        };
        by_id.insert(moved, status);
    }
    Arc::new(SectionsState { by_id })
}

fn upsert(slice: &SectionsState, scope: ScopeKey, state: SectionState) -> SectionsState {
    SectionsState {
        by_id: slice.by_id.update(scope, state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ReduceContext {
        ReduceContext::at(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
    }

    fn scope(section: &str, group: Option<&str>) -> ScopeKey {
        ScopeKey::new(section, group).unwrap()
    }

    #[test]
    fn initialize_then_complete() {
        let sections = Arc::new(SectionsState::default());
        let sections = SectionReducer::reduce(
            &sections,
            &SectionCommand::Initialize {
                section_id: "3.1.4".into(),
                group_id: Some("A.1".into()),
                group_type: Some(GroupKind::Aisd),
            },
            &ctx(),
        );
        let status = sections.get(&scope("3.1.4", Some("A.1"))).unwrap();
        assert!(status.is_initialized);
        assert!(!status.is_complete);

        let sections = SectionReducer::reduce(
            &sections,
            &SectionCommand::SetComplete {
                section_id: "3.1.4".into(),
                group_id: Some("A.1".into()),
                is_complete: true,
            },
            &ctx(),
        );
        assert!(sections.get(&scope("3.1.4", Some("A.1"))).unwrap().is_complete);
        assert!(sections.get(&scope("3.1.4", None)).is_none());
    }

    #[test]
    fn repeated_initialize_is_noop() {
        let cmd = SectionCommand::Initialize {
            section_id: "1".into(),
            group_id: None,
            group_type: None,
        };
        let once = SectionReducer::reduce(&Arc::new(SectionsState::default()), &cmd, &ctx());
        let twice = SectionReducer::reduce(&once, &cmd, &ctx());
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn reset_unknown_scope_is_noop() {
        let sections = Arc::new(SectionsState::default());
        let next = SectionReducer::reduce(
            &sections,
            &SectionCommand::Reset {
                section_id: "9".into(),
                group_id: None,
            },
            &ctx(),
        );
        assert!(Arc::ptr_eq(&sections, &next));
    }

    #[test]
    fn invalid_scope_is_noop() {
        let sections = Arc::new(SectionsState::default());
        let next = SectionReducer::reduce(
            &sections,
            &SectionCommand::Initialize {
                section_id: String::new(),
                group_id: None,
                group_type: None,
            },
            &ctx(),
        );
        assert!(Arc::ptr_eq(&sections, &next));
    }
}
