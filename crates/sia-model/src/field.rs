//! Form field slice
//!
//! One entry per composite key. `all_keys` keeps first-insertion order and
//! `by_key` holds the entries; both always agree on membership.

use crate::keys::CompositeKey;
use crate::Timestamp;
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a field value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    /// Typed by the user
    #[default]
    User,
    /// Loaded from a backend service
    Api,
    /// Template default
    Default,
    /// Derived from other values
    Computed,
}

/// Stored value of one form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEntry {
    pub value: Value,
    pub touched: bool,
    pub dirty: bool,
    pub autoloaded: bool,
    pub source: FieldSource,
    pub last_modified: Option<Timestamp>,
}

/// Field slice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsState {
    pub by_key: OrdMap<CompositeKey, FieldEntry>,
    pub all_keys: Vector<CompositeKey>,
}

impl FieldsState {
    /// Entry for a key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &CompositeKey) -> Option<&FieldEntry> {
        self.by_key.get(key)
    }

    /// Number of stored fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// True when no field is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Check that the key list and the map describe the same key set
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let unique: std::collections::BTreeSet<_> = self.all_keys.iter().collect();
        unique.len() == self.all_keys.len()
            && self.all_keys.len() == self.by_key.len()
            && self.all_keys.iter().all(|k| self.by_key.contains_key(k))
    }
}
