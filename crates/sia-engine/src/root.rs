//! Root reducer and batch executor
//!
//! Routes each command to the reducer owning its namespace, merges the new
//! slice back only when the slice pointer changed, and stamps the internal
//! bookkeeping. A command with no effect returns the input `Arc` untouched.

use crate::command::{BatchCommand, Command};
use crate::context::ReduceContext;
use crate::reducer::SliceReducer;
use crate::reducers::groups::{self, GroupRemap};
use crate::reducers::project::{self, ProjectOutcome};
use crate::reducers::{
    fields, images, sections, tables, CcppReducer, FieldReducer, ImageReducer, MetadataReducer,
    RegistryReducer, SectionReducer, TableReducer,
};
use sia_model::ProjectState;
use std::sync::Arc;

/// Apply one command to the whole document
#[must_use]
pub fn reduce(
    state: &Arc<ProjectState>,
    command: &Command,
    ctx: &ReduceContext,
) -> Arc<ProjectState> {
    let next = match command {
        Command::Metadata(c) => {
            step::<MetadataReducer>(&state.metadata, c, ctx).map(|metadata| ProjectState {
                metadata,
                ..(**state).clone()
            })
        }
        Command::Group(c) => {
            let (group_config, remap) = groups::apply(&state.group_config, c, ctx);
            (!Arc::ptr_eq(&state.group_config, &group_config)).then(|| {
                let moved = ProjectState {
                    group_config,
                    ..(**state).clone()
                };
                follow_groups(moved, &remap, ctx)
            })
        }
        Command::Section(c) => {
            step::<SectionReducer>(&state.sections, c, ctx).map(|sections| ProjectState {
                sections,
                ..(**state).clone()
            })
        }
        Command::Field(c) => step::<FieldReducer>(&state.fields, c, ctx).map(|fields| ProjectState {
            fields,
            ..(**state).clone()
        }),
        Command::Table(c) => step::<TableReducer>(&state.tables, c, ctx).map(|tables| ProjectState {
            tables,
            ..(**state).clone()
        }),
        Command::Image(c) => step::<ImageReducer>(&state.images, c, ctx).map(|images| ProjectState {
            images,
            ..(**state).clone()
        }),
        Command::Ccpp(c) => {
            step::<CcppReducer>(&state.ccpp_registry, c, ctx).map(|ccpp_registry| ProjectState {
                ccpp_registry,
                ..(**state).clone()
            })
        }
        Command::Registry(c) => {
            step::<RegistryReducer>(&state.global_registry, c, ctx).map(|global_registry| {
                ProjectState {
                    global_registry,
                    ..(**state).clone()
                }
            })
        }
        Command::Project(c) => match project::apply(state, c, ctx) {
            ProjectOutcome::Changed(next) => Some(next),
            ProjectOutcome::Bookkeeping(next) => return Arc::new(next),
            ProjectOutcome::Unchanged => None,
        },
        Command::Batch(batch) => return execute_batch(state, batch, ctx),
    };

    match next {
        Some(next) => Arc::new(mark_dirty(next, command.kind(), ctx)),
        None => Arc::clone(state),
    }
}

/// Apply a batch: sub-commands in order, nested batches skipped
#[must_use]
pub fn execute_batch(
    state: &Arc<ProjectState>,
    batch: &BatchCommand,
    ctx: &ReduceContext,
) -> Arc<ProjectState> {
    let BatchCommand::Execute {
        transaction_id,
        commands,
    } = batch;

    commands.iter().fold(Arc::clone(state), |acc, command| {
        if let Command::Batch(nested) = command {
            tracing::warn!(
                transaction_id = %transaction_id,
                nested = %nested.transaction_id(),
                "batches cannot nest, skipping inner batch"
            );
            return acc;
        }
        reduce(&acc, command, ctx)
    })
}

/// Apply a sequence of commands one after another
#[must_use]
pub fn replay<'a>(
    state: &Arc<ProjectState>,
    commands: impl IntoIterator<Item = &'a Command>,
    ctx: &ReduceContext,
) -> Arc<ProjectState> {
    commands
        .into_iter()
        .fold(Arc::clone(state), |acc, command| reduce(&acc, command, ctx))
}

fn step<R: SliceReducer>(
    slice: &Arc<R::Slice>,
    command: &R::Command,
    ctx: &ReduceContext,
) -> Option<Arc<R::Slice>> {
    let next = R::reduce(slice, command, ctx);
    (!Arc::ptr_eq(slice, &next)).then_some(next)
}

/// Move group-keyed data along with renumbered groups
fn follow_groups(mut state: ProjectState, remap: &GroupRemap, ctx: &ReduceContext) -> ProjectState {
    if remap.is_empty() {
        return state;
    }
    state.fields = fields::regroup(&state.fields, remap, ctx);
    state.tables = tables::regroup(&state.tables, remap, ctx);
    state.sections = sections::regroup(&state.sections, remap, ctx);
    state.images = images::regroup(&state.images, remap, ctx);
    state
}

fn mark_dirty(mut state: ProjectState, kind: &str, ctx: &ReduceContext) -> ProjectState {
    state.internal.is_dirty = true;
    state.internal.revision += 1;
    state.internal.last_command = Some(kind.to_string());
    state.internal.last_modified = Some(ctx.now);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::{FieldAddress, FieldCommand, GroupCommand, ProjectCommand};
    use serde_json::json;
    use sia_model::{FieldSource, GroupKind};

    fn ctx() -> ReduceContext {
        ReduceContext::at(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
    }

    fn set_field(name: &str, value: serde_json::Value) -> Command {
        Command::Field(FieldCommand::Set {
            address: FieldAddress::new("1", None, name),
            value,
            source: FieldSource::User,
        })
    }

    #[test]
    fn effective_command_marks_dirty() {
        let state = Arc::new(ProjectState::default());
        let next = reduce(&state, &set_field("a", json!(1)), &ctx());
        assert!(next.internal.is_dirty);
        assert_eq!(next.internal.revision, 1);
        assert_eq!(next.internal.last_command.as_deref(), Some("field/set"));
        assert!(Arc::ptr_eq(&state.metadata, &next.metadata));
        assert!(!Arc::ptr_eq(&state.fields, &next.fields));
    }

    #[test]
    fn noop_returns_same_state() {
        let state = Arc::new(ProjectState::default());
        let rename = Command::Group(GroupCommand::Rename {
            kind: GroupKind::Aisd,
            id: "A.1".into(),
            name: "X".into(),
        });
        let next = reduce(&state, &rename, &ctx());
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn nested_batch_is_skipped() {
        let state = Arc::new(ProjectState::default());
        let inner = Command::batch("inner", vec![set_field("b", json!(2))]);
        let outer = Command::batch(
            "outer",
            vec![set_field("a", json!(1)), inner, set_field("c", json!(3))],
        );
        let next = reduce(&state, &outer, &ctx());
        let names: Vec<_> = next.fields.all_keys.iter().map(|k| k.name().to_string()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(next.internal.revision, 2);
    }

    #[test]
    fn mark_saved_does_not_bump_revision() {
        let state = reduce(&Arc::new(ProjectState::default()), &set_field("a", json!(1)), &ctx());
        let saved = reduce(
            &state,
            &Command::Project(ProjectCommand::MarkSaved { at: ctx().now }),
            &ctx(),
        );
        assert!(!saved.internal.is_dirty);
        assert_eq!(saved.internal.revision, 1);
        assert_eq!(saved.internal.last_saved, Some(ctx().now));
    }

    #[test]
    fn reset_of_empty_report_returns_same_state() {
        let state = Arc::new(ProjectState::new(ctx().now));
        let next = reduce(&state, &Command::Project(ProjectCommand::Reset), &ctx());
        assert!(Arc::ptr_eq(&state, &next));
        assert_eq!(next.internal.revision, 0);
        assert!(!next.internal.is_dirty);
    }

    #[test]
    fn reset_clears_content_and_keeps_counting() {
        let state = reduce(&Arc::new(ProjectState::default()), &set_field("a", json!(1)), &ctx());
        let reset = reduce(&state, &Command::Project(ProjectCommand::Reset), &ctx());
        assert!(reset.fields.is_empty());
        assert_eq!(reset.internal.revision, 2);
        assert!(reset.internal.is_dirty);
    }
}
