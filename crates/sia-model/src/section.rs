//! Section workflow status
//!
//! Tracks whether each logical section has been opened and completed. Holds
//! no content.

use crate::group::GroupKind;
use crate::keys::ScopeKey;
use crate::Timestamp;
use im::OrdMap;
use serde::{Deserialize, Serialize};

/// Status of one section (optionally scoped to a group)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionState {
    pub id: String,
    pub is_initialized: bool,
    pub is_complete: bool,
    pub group_id: Option<String>,
    pub group_type: Option<GroupKind>,
    pub last_modified: Option<Timestamp>,
}

impl SectionState {
    /// Fresh, uninitialized status
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        group_id: Option<String>,
        group_type: Option<GroupKind>,
    ) -> Self {
        Self {
            id: id.into(),
            is_initialized: false,
            is_complete: false,
            group_id,
            group_type,
            last_modified: None,
        }
    }
}

/// Section status slice, keyed by [`ScopeKey`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionsState {
    pub by_id: OrdMap<ScopeKey, SectionState>,
}

impl SectionsState {
    /// Status of a section scope
    #[must_use]
    pub fn get(&self, key: &ScopeKey) -> Option<&SectionState> {
        self.by_id.get(key)
    }
}
