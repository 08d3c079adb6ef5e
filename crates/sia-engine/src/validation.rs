//! Referential-integrity validation
//!
//! A read-only pass over a snapshot that reports table cells and group links
//! pointing at groups, populated centers or location codes that do not
//! exist, and group-scoped data whose group is gone. Issues are data for the
//! caller to render; nothing here blocks a mutation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sia_model::{GroupKind, ProjectState, KEY_DELIMITER};
use std::collections::HashSet;

/// Pseudo section id used for issues found in the group configuration
pub const GROUP_CONFIG_SECTION: &str = "groupConfig";

/// Field name reported for group-scoped data without a group
pub const GROUP_SCOPE_FIELD: &str = "groupId";

/// Which table columns hold references, by target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ReferenceRules {
    /// Columns holding a group id
    pub group_columns: Vec<String>,
    /// Columns holding a populated-center id or code
    pub ccpp_columns: Vec<String>,
    /// Columns holding a location (ubigeo) code
    pub location_columns: Vec<String>,
    /// Also check the CCPP ids attached to groups
    pub check_group_links: bool,
    /// Also check that group-scoped fields, tables, statuses and photographs
    /// belong to an existing group
    pub check_group_scopes: bool,
}

impl Default for ReferenceRules {
    fn default() -> Self {
        Self {
            group_columns: vec!["grupoId".to_string()],
            ccpp_columns: vec!["ccppId".to_string()],
            location_columns: vec!["ubigeo".to_string()],
            check_group_links: true,
            check_group_scopes: true,
        }
    }
}

/// One unresolved reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub section_id: String,
    pub table_id: String,
    pub row_id: String,
    pub field: String,
    pub message: String,
}

/// Check every table row (and group link) against the registries
#[must_use]
pub fn validate(state: &ProjectState, rules: &ReferenceRules) -> Vec<ValidationIssue> {
    let locations = known_locations(state);
    let mut issues = Vec::new();

    for key in &state.tables.all_keys {
        let Some(table) = state.tables.get(key) else {
            continue;
        };
        for row in &table.rows {
            for (column, value) in &row.data {
                let Some(reference) = reference_text(value) else {
                    continue;
                };
                let problem = if rules.group_columns.contains(column) {
                    state
                        .group_config
                        .find_any(&reference)
                        .is_none()
                        .then(|| format!("unknown group '{reference}'"))
                } else if rules.ccpp_columns.contains(column) {
                    (!state.ccpp_registry.resolves(&reference))
                        .then(|| format!("unknown populated center '{reference}'"))
                } else if rules.location_columns.contains(column) {
                    (!locations.contains(reference.as_str()))
                        .then(|| format!("unknown location code '{reference}'"))
                } else {
                    None
                };
                if let Some(message) = problem {
                    issues.push(ValidationIssue {
                        section_id: table.section_id.clone(),
                        table_id: key.to_string(),
                        row_id: row.id.clone(),
                        field: column.clone(),
                        message,
                    });
                }
            }
        }
    }

    if rules.check_group_links {
        for kind in GroupKind::ALL {
            for group in state.group_config.groups(kind) {
                for ccpp in group.ccpp_ids.iter().filter(|id| !state.ccpp_registry.resolves(id)) {
                    issues.push(ValidationIssue {
                        section_id: GROUP_CONFIG_SECTION.to_string(),
                        table_id: kind.to_string(),
                        row_id: group.id.clone(),
                        field: "ccppIds".to_string(),
                        message: format!("unknown populated center '{ccpp}'"),
                    });
                }
            }
        }
    }

    if rules.check_group_scopes {
        issues.extend(orphaned_scopes(state));
    }

    issues
}

/// Group-scoped entries whose group id matches no group
fn orphaned_scopes(state: &ProjectState) -> Vec<ValidationIssue> {
    let fields = state
        .fields
        .all_keys
        .iter()
        .map(|key| (key.section_id(), key.group_id(), key.to_string(), String::new()));
    let tables = state
        .tables
        .all_keys
        .iter()
        .map(|key| (key.section_id(), key.group_id(), key.to_string(), String::new()));
    let sections = state
        .sections
        .by_id
        .keys()
        .map(|scope| (scope.section_id(), scope.group_id(), scope.to_string(), String::new()));
    let images = state.images.by_id.values().map(|img| {
        let gallery = match &img.group_id {
            Some(group) => format!("{}{KEY_DELIMITER}{group}", img.section_id),
            None => img.section_id.clone(),
        };
        (img.section_id.as_str(), img.group_id.as_deref(), gallery, img.id.clone())
    });

    fields
        .chain(tables)
        .chain(sections)
        .chain(images)
        .filter_map(|(section_id, group_id, table_id, row_id)| {
            let group = group_id?;
            state.group_config.find_any(group).is_none().then(|| ValidationIssue {
                section_id: section_id.to_string(),
                table_id,
                row_id,
                field: GROUP_SCOPE_FIELD.to_string(),
                message: format!("unknown group '{group}'"),
            })
        })
        .collect()
}

fn known_locations(state: &ProjectState) -> HashSet<&str> {
    state
        .global_registry
        .location
        .iter()
        .filter_map(|l| l.ubigeo.as_deref())
        .chain(state.metadata.location.ubigeo.as_deref())
        .chain(state.ccpp_registry.by_id.values().filter_map(|c| c.ubigeo.as_deref()))
        .collect()
}

/// Text of a reference cell; blanks are not references
fn reference_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sia_model::{
        CcppEntry, CompositeKey, GroupDefinition, RowData, TableEntry, TableRow,
    };
    use std::sync::Arc;

    fn state_with_row(data: RowData) -> ProjectState {
        let key = CompositeKey::new("3.1.2", Some("A.1"), "centrosPoblados").unwrap();
        let mut table = TableEntry::empty(&key);
        table.rows.push_back(TableRow {
            id: "row-1".into(),
            order: 0,
            data,
        });
        let mut tables = sia_model::TablesState::default();
        tables.by_key.insert(key.clone(), table);
        tables.all_keys.push_back(key);

        let mut groups = sia_model::GroupConfig::default();
        groups.aisd.push_back(GroupDefinition {
            id: "A.1".into(),
            name: "Alto".into(),
            kind: GroupKind::Aisd,
            parent_id: None,
            order: 0,
            ccpp_ids: vec!["c1".into()],
        });

        let mut registry = sia_model::CcppRegistry::default();
        registry.by_id.insert(
            "c1".into(),
            CcppEntry {
                id: "c1".into(),
                name: "Huancané".into(),
                code: Some("0801010001".into()),
                category: None,
                population: None,
                ubigeo: Some("080101".into()),
                latitude: None,
                longitude: None,
            },
        );

        ProjectState {
            tables: Arc::new(tables),
            group_config: Arc::new(groups),
            ccpp_registry: Arc::new(registry),
            ..ProjectState::default()
        }
    }

    fn row(pairs: &[(&str, Value)]) -> RowData {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn resolving_references_are_clean() {
        let state = state_with_row(row(&[
            ("grupoId", json!("A.1")),
            ("ccppId", json!("0801010001")),
            ("ubigeo", json!("080101")),
        ]));
        assert!(validate(&state, &ReferenceRules::default()).is_empty());
    }

    #[test]
    fn dangling_references_are_reported() {
        let state = state_with_row(row(&[
            ("grupoId", json!("A.7")),
            ("ccppId", json!("c9")),
            ("ubigeo", json!(999_999)),
        ]));
        let issues = validate(&state, &ReferenceRules::default());
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["grupoId", "ccppId", "ubigeo"]);
        assert_eq!(issues[0].section_id, "3.1.2");
        assert_eq!(issues[0].table_id, "3.1.2::A.1::centrosPoblados");
        assert_eq!(issues[0].row_id, "row-1");
    }

    #[test]
    fn blank_cells_are_not_references() {
        let state = state_with_row(row(&[("grupoId", json!("  ")), ("ccppId", Value::Null)]));
        assert!(validate(&state, &ReferenceRules::default()).is_empty());
    }

    #[test]
    fn scopes_of_missing_groups_are_reported() {
        let mut state = state_with_row(RowData::new());
        let mut fields = sia_model::FieldsState::default();
        for key in ["3.1::A.1::poblacion", "3.1::A.4::poblacion", "3.1::resumen"] {
            let key: CompositeKey = key.parse().unwrap();
            fields.by_key.insert(
                key.clone(),
                sia_model::FieldEntry {
                    value: json!(1),
                    touched: true,
                    dirty: true,
                    autoloaded: false,
                    source: sia_model::FieldSource::User,
                    last_modified: None,
                },
            );
            fields.all_keys.push_back(key);
        }
        state.fields = Arc::new(fields);

        let issues = validate(&state, &ReferenceRules::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].table_id, "3.1::A.4::poblacion");
        assert_eq!(issues[0].field, GROUP_SCOPE_FIELD);
        assert_eq!(issues[0].message, "unknown group 'A.4'");

        let relaxed = ReferenceRules {
            check_group_scopes: false,
            ..ReferenceRules::default()
        };
        assert!(validate(&state, &relaxed).is_empty());
    }

    #[test]
    fn group_links_are_checked() {
        let mut state = state_with_row(RowData::new());
        let mut groups = (*state.group_config).clone();
        let mut group = groups.aisd[0].clone();
        group.ccpp_ids.push("ghost".into());
        groups.aisd.set(0, group);
        state.group_config = Arc::new(groups);

        let issues = validate(&state, &ReferenceRules::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].section_id, GROUP_CONFIG_SECTION);
        assert_eq!(issues[0].table_id, "AISD");
        assert_eq!(issues[0].field, "ccppIds");
    }
}
