//! Populated-center registry reducer

use crate::context::ReduceContext;
use crate::reducer::{commit, SliceReducer};
use serde::{Deserialize, Serialize};
use sia_model::{CcppEntry, CcppRegistry};
use std::sync::Arc;

/// Commands in the `ccpp/*` namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum CcppCommand {
    #[serde(rename = "ccpp/upsert")]
    Upsert { entry: CcppEntry },

    #[serde(rename = "ccpp/upsertMany")]
    UpsertMany { entries: Vec<CcppEntry> },

    #[serde(rename = "ccpp/remove")]
    Remove { id: String },
}

impl CcppCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upsert { .. } => "ccpp/upsert",
            Self::UpsertMany { .. } => "ccpp/upsertMany",
            Self::Remove { .. } => "ccpp/remove",
        }
    }
}

/// Reducer for [`CcppRegistry`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CcppReducer;

impl SliceReducer for CcppReducer {
    type Slice = CcppRegistry;
    type Command = CcppCommand;

    fn reduce(
        slice: &Arc<CcppRegistry>,
        command: &CcppCommand,
        ctx: &ReduceContext,
    ) -> Arc<CcppRegistry> {
        let by_id = match command {
            CcppCommand::Upsert { entry } => upsert(&slice.by_id, std::slice::from_ref(entry)),
            CcppCommand::UpsertMany { entries } => upsert(&slice.by_id, entries),
            CcppCommand::Remove { id } => slice
                .by_id
                .contains_key(id)
                .then(|| slice.by_id.without(id)),
        };
        let next = by_id.map(|by_id| CcppRegistry {
            by_id,
            last_updated: Some(ctx.now),
        });
        commit(slice, next)
    }
}

fn upsert(
    current: &im::OrdMap<String, CcppEntry>,
    entries: &[CcppEntry],
) -> Option<im::OrdMap<String, CcppEntry>> {
    let mut by_id = current.clone();
    let mut changed = false;
    for entry in entries.iter().filter(|e| !e.id.is_empty()) {
        if by_id.get(&entry.id) != Some(entry) {
            by_id.insert(entry.id.clone(), entry.clone());
            changed = true;
        }
    }
    changed.then_some(by_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ReduceContext {
        ReduceContext::at(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
    }

    fn center(id: &str, name: &str) -> CcppEntry {
        CcppEntry {
            id: id.into(),
            name: name.into(),
            code: Some(format!("0801{id}")),
            category: None,
            population: Some(250),
            ubigeo: Some("080101".into()),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn upsert_replaces_and_noops() {
        let registry = Arc::new(CcppRegistry::default());
        let cmd = CcppCommand::Upsert {
            entry: center("01", "Huancané"),
        };
        let registry = CcppReducer::reduce(&registry, &cmd, &ctx());
        assert_eq!(registry.get("01").unwrap().name, "Huancané");
        assert!(registry.resolves("080101"));

        let again = CcppReducer::reduce(&registry, &cmd, &ctx());
        assert!(Arc::ptr_eq(&registry, &again));
    }

    #[test]
    fn remove_unknown_is_noop() {
        let registry = Arc::new(CcppRegistry::default());
        let next = CcppReducer::reduce(&registry, &CcppCommand::Remove { id: "x".into() }, &ctx());
        assert!(Arc::ptr_eq(&registry, &next));
    }

    #[test]
    fn upsert_many_in_one_transition() {
        let registry = CcppReducer::reduce(
            &Arc::new(CcppRegistry::default()),
            &CcppCommand::UpsertMany {
                entries: vec![center("01", "A"), center("02", "B")],
            },
            &ctx(),
        );
        assert_eq!(registry.by_id.len(), 2);
        assert_eq!(registry.last_updated, Some(ctx().now));
    }
}
