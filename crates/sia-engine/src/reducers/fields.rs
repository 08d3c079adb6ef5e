//! Form field reducer
//!
//! `by_key` and `all_keys` are updated together in every branch so the two
//! never disagree on membership.

use crate::context::ReduceContext;
use crate::reducer::{commit, SliceReducer};
use crate::reducers::groups::{rekey, GroupRemap};
use im::Vector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sia_model::{CompositeKey, FieldEntry, FieldSource, FieldsState};
use std::sync::Arc;

/// Location of a field inside the report
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAddress {
    pub section_id: String,
    #[serde(default)]
    pub group_id: Option<String>,
    pub field_name: String,
}

impl FieldAddress {
    /// Address of a document-wide or group-scoped field
    #[must_use]
    pub fn new(section_id: &str, group_id: Option<&str>, field_name: &str) -> Self {
        Self {
            section_id: section_id.to_string(),
            group_id: group_id.map(str::to_string),
            field_name: field_name.to_string(),
        }
    }

    /// Composite key, or `None` when a segment is not encodable
    #[must_use]
    pub fn key(&self) -> Option<CompositeKey> {
        CompositeKey::new(&self.section_id, self.group_id.as_deref(), &self.field_name).ok()
    }
}

/// One value write inside `field/setMany`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    #[serde(flatten)]
    pub address: FieldAddress,
    pub value: Value,
    #[serde(default)]
    pub source: FieldSource,
}

/// Commands in the `field/*` namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum FieldCommand {
    #[serde(rename = "field/set")]
    Set {
        #[serde(flatten)]
        address: FieldAddress,
        value: Value,
        #[serde(default)]
        source: FieldSource,
    },

    /// Several writes applied as one transition
    #[serde(rename = "field/setMany")]
    SetMany { updates: Vec<FieldUpdate> },

    #[serde(rename = "field/touch")]
    Touch {
        #[serde(flatten)]
        address: FieldAddress,
    },

    #[serde(rename = "field/clear")]
    Clear {
        #[serde(flatten)]
        address: FieldAddress,
    },

    /// Drop every field of a section; `group_id` narrows it to one group
    #[serde(rename = "field/clearSection")]
    ClearSection {
        section_id: String,
        #[serde(default)]
        group_id: Option<String>,
    },
}

impl FieldCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Set { .. } => "field/set",
            Self::SetMany { .. } => "field/setMany",
            Self::Touch { .. } => "field/touch",
            Self::Clear { .. } => "field/clear",
            Self::ClearSection { .. } => "field/clearSection",
        }
    }
}

/// Reducer for [`FieldsState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldReducer;

impl SliceReducer for FieldReducer {
    type Slice = FieldsState;
    type Command = FieldCommand;

    fn reduce(
        slice: &Arc<FieldsState>,
        command: &FieldCommand,
        ctx: &ReduceContext,
    ) -> Arc<FieldsState> {
        let next = match command {
            FieldCommand::Set {
                address,
                value,
                source,
            } => address
                .key()
                .and_then(|key| write(slice, key, value, *source, ctx)),
            FieldCommand::SetMany { updates } => {
                let mut state: Option<FieldsState> = None;
                for update in updates {
                    let Some(key) = update.address.key() else {
                        continue;
                    };
                    let current = state.as_ref().unwrap_or(slice);
                    if let Some(changed) = write(current, key, &update.value, update.source, ctx) {
                        state = Some(changed);
                    }
                }
                state
            }
            FieldCommand::Touch { address } => address.key().and_then(|key| {
                let entry = slice.get(&key)?;
                if entry.touched {
                    return None;
                }
                let touched = FieldEntry {
                    touched: true,
                    last_modified: Some(ctx.now),
                    ..entry.clone()
                };
                Some(FieldsState {
                    by_key: slice.by_key.update(key, touched),
                    all_keys: slice.all_keys.clone(),
                })
            }),
            FieldCommand::Clear { address } => address
                .key()
                .filter(|key| slice.by_key.contains_key(key))
                .map(|key| retain(slice, |k| *k != key)),
            FieldCommand::ClearSection {
                section_id,
                group_id,
            } => {
                let in_scope = |k: &CompositeKey| {
                    k.section_id() == section_id
                        && group_id
                            .as_deref()
                            .map_or(true, |group| k.group_id() == Some(group))
                };
                slice
                    .all_keys
                    .iter()
                    .any(in_scope)
                    .then(|| retain(slice, |k| !in_scope(k)))
            }
        };
        commit(slice, next)
    }
}

fn write(
    slice: &FieldsState,
    key: CompositeKey,
    value: &Value,
    source: FieldSource,
    ctx: &ReduceContext,
) -> Option<FieldsState> {
    let previous = slice.get(&key);
    if let Some(entry) = previous {
        if entry.value == *value && entry.source == source {
            return None;
        }
    }

    let by_user = source == FieldSource::User;
    let entry = FieldEntry {
        value: value.clone(),
        touched: by_user || previous.is_some_and(|e| e.touched),
        dirty: by_user || previous.is_some_and(|e| e.dirty),
        autoloaded: source == FieldSource::Api,
        source,
        last_modified: Some(ctx.now),
    };

    let mut all_keys = slice.all_keys.clone();
    if previous.is_none() {
        all_keys.push_back(key.clone());
    }
    Some(FieldsState {
        by_key: slice.by_key.update(key, entry),
        all_keys,
    })
}

/// Follow a group remap: moved fields change key, fields of removed groups go
pub(crate) fn regroup(
    slice: &Arc<FieldsState>,
    remap: &GroupRemap,
    ctx: &ReduceContext,
) -> Arc<FieldsState> {
    let next = rekey(&slice.by_key, &slice.all_keys, remap, |_, entry| FieldEntry {
        last_modified: Some(ctx.now),
        ..entry
    });
    commit(slice, next.map(|(by_key, all_keys)| FieldsState { by_key, all_keys }))
}

fn retain(slice: &FieldsState, keep: impl Fn(&CompositeKey) -> bool) -> FieldsState {
    let all_keys: Vector<CompositeKey> =
        slice.all_keys.iter().filter(|k| keep(k)).cloned().collect();
    let by_key = slice
        .by_key
        .iter()
        .filter(|(k, _)| keep(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    FieldsState { by_key, all_keys }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> ReduceContext {
        ReduceContext::at(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
    }

    fn set(section: &str, group: Option<&str>, name: &str, value: Value) -> FieldCommand {
        FieldCommand::Set {
            address: FieldAddress::new(section, group, name),
            value,
            source: FieldSource::User,
        }
    }

    #[test]
    fn set_creates_single_entry() {
        let fields = Arc::new(FieldsState::default());
        let first = set("3.1.1", None, "poblacion", json!(120));
        let fields = FieldReducer::reduce(&fields, &first, &ctx());
        let second = set("3.1.1", None, "poblacion", json!(130));
        let fields = FieldReducer::reduce(&fields, &second, &ctx());
        assert_eq!(fields.len(), 1);
        assert!(fields.is_consistent());
        let key = CompositeKey::new("3.1.1", None, "poblacion").unwrap();
        assert_eq!(fields.get(&key).unwrap().value, json!(130));
        assert!(fields.get(&key).unwrap().dirty);
    }

    #[test]
    fn same_value_is_noop() {
        let cmd = set("1", Some("A.1"), "nombre", json!("Alto"));
        let once = FieldReducer::reduce(&Arc::new(FieldsState::default()), &cmd, &ctx());
        let twice = FieldReducer::reduce(&once, &cmd, &ctx());
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn api_values_are_autoloaded() {
        let cmd = FieldCommand::Set {
            address: FieldAddress::new("1", None, "ubigeo"),
            value: json!("080101"),
            source: FieldSource::Api,
        };
        let fields = FieldReducer::reduce(&Arc::new(FieldsState::default()), &cmd, &ctx());
        let entry = fields.by_key.values().next().unwrap();
        assert!(entry.autoloaded);
        assert!(!entry.touched);
    }

    #[test]
    fn clear_missing_key_is_noop() {
        let fields = Arc::new(FieldsState::default());
        let next = FieldReducer::reduce(
            &fields,
            &FieldCommand::Clear {
                address: FieldAddress::new("1", None, "nada"),
            },
            &ctx(),
        );
        assert!(Arc::ptr_eq(&fields, &next));
    }

    #[test]
    fn clear_section_narrows_by_group() {
        let fields = Arc::new(FieldsState::default());
        let fields = FieldReducer::reduce(
            &fields,
            &FieldCommand::SetMany {
                updates: vec![
                    FieldUpdate {
                        address: FieldAddress::new("2", Some("A.1"), "a"),
                        value: json!(1),
                        source: FieldSource::User,
                    },
                    FieldUpdate {
                        address: FieldAddress::new("2", Some("A.2"), "a"),
                        value: json!(2),
                        source: FieldSource::User,
                    },
                    FieldUpdate {
                        address: FieldAddress::new("3", None, "b"),
                        value: json!(3),
                        source: FieldSource::User,
                    },
                ],
            },
            &ctx(),
        );
        assert_eq!(fields.len(), 3);

        let narrowed = FieldReducer::reduce(
            &fields,
            &FieldCommand::ClearSection {
                section_id: "2".into(),
                group_id: Some("A.1".into()),
            },
            &ctx(),
        );
        assert_eq!(narrowed.len(), 2);
        assert!(narrowed.is_consistent());

        let whole = FieldReducer::reduce(
            &fields,
            &FieldCommand::ClearSection {
                section_id: "2".into(),
                group_id: None,
            },
            &ctx(),
        );
        assert_eq!(whole.len(), 1);
    }

    #[test]
    fn set_payload_is_flat() {
        let json = serde_json::to_value(set("3.1", Some("B.1"), "x", json!(true))).unwrap();
        assert_eq!(json["type"], "field/set");
        assert_eq!(json["payload"]["sectionId"], "3.1");
        assert_eq!(json["payload"]["groupId"], "B.1");
        assert_eq!(json["payload"]["fieldName"], "x");
        assert_eq!(json["payload"]["source"], "user");
    }
}
