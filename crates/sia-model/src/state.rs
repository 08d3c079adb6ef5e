//! Root document state
//!
//! Every slice sits behind an `Arc`. A transition clones only the slices it
//! changes; untouched slices keep their pointer, so consumers can skip work
//! with [`Arc::ptr_eq`].

use crate::field::FieldsState;
use crate::group::GroupConfig;
use crate::image::ImagesState;
use crate::metadata::ProjectMetadata;
use crate::registry::{CcppRegistry, GlobalRegistryState};
use crate::section::SectionsState;
use crate::table::TablesState;
use crate::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Bookkeeping that is not part of the report itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalState {
    pub is_dirty: bool,
    /// Number of effective transitions since creation or hydration
    pub revision: u64,
    pub last_command: Option<String>,
    pub last_modified: Option<Timestamp>,
    pub last_saved: Option<Timestamp>,
}

/// The whole report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub metadata: Arc<ProjectMetadata>,
    pub group_config: Arc<GroupConfig>,
    pub sections: Arc<SectionsState>,
    pub fields: Arc<FieldsState>,
    pub tables: Arc<TablesState>,
    pub images: Arc<ImagesState>,
    pub ccpp_registry: Arc<CcppRegistry>,
    pub global_registry: Arc<GlobalRegistryState>,
    #[serde(rename = "_internal", default)]
    pub internal: InternalState,
}

impl ProjectState {
    /// Empty report stamped with its creation time
    #[must_use]
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            metadata: Arc::new(ProjectMetadata {
                created_at: Some(created_at),
                updated_at: Some(created_at),
                ..ProjectMetadata::default()
            }),
            ..Self::default()
        }
    }

    /// True when every slice pointer is shared with `other`
    #[must_use]
    pub fn shares_slices_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.metadata, &other.metadata)
            && Arc::ptr_eq(&self.group_config, &other.group_config)
            && Arc::ptr_eq(&self.sections, &other.sections)
            && Arc::ptr_eq(&self.fields, &other.fields)
            && Arc::ptr_eq(&self.tables, &other.tables)
            && Arc::ptr_eq(&self.images, &other.images)
            && Arc::ptr_eq(&self.ccpp_registry, &other.ccpp_registry)
            && Arc::ptr_eq(&self.global_registry, &other.global_registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_uses_internal_key() {
        let state = ProjectState::default();
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("_internal").is_some());
        assert!(json.get("groupConfig").is_some());
        assert!(json.get("ccppRegistry").is_some());
    }

    #[test]
    fn snapshot_round_trip_is_structurally_equal() {
        let state = ProjectState::new(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH);
        let json = serde_json::to_string(&state).unwrap();
        let back: ProjectState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn clone_shares_slices() {
        let state = ProjectState::default();
        let copy = state.clone();
        assert!(copy.shares_slices_with(&state));
    }
}
