//! Project metadata slice

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// Top-level descriptive data of the report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub project_name: String,
    pub consultant: String,
    pub description: String,
    pub location: LocationSelection,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

/// Administrative location picked for the project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSelection {
    #[serde(rename = "departamento")]
    pub department: String,
    #[serde(rename = "provincia")]
    pub province: String,
    #[serde(rename = "distrito")]
    pub district: String,
    pub ubigeo: Option<String>,
}

/// Partial update of [`ProjectMetadata`]; absent fields stay untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSelection>,
}

impl MetadataPatch {
    /// Apply onto existing metadata, returning `None` when nothing would change
    #[must_use]
    pub fn apply(&self, current: &ProjectMetadata) -> Option<ProjectMetadata> {
        let mut next = current.clone();
        if let Some(name) = &self.project_name {
            next.project_name.clone_from(name);
        }
        if let Some(consultant) = &self.consultant {
            next.consultant.clone_from(consultant);
        }
        if let Some(description) = &self.description {
            next.description.clone_from(description);
        }
        if let Some(location) = &self.location {
            next.location = location.clone();
        }
        (next != *current).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_without_changes_is_none() {
        let meta = ProjectMetadata {
            project_name: "Mina Sur".into(),
            ..ProjectMetadata::default()
        };
        let patch = MetadataPatch {
            project_name: Some("Mina Sur".into()),
            ..MetadataPatch::default()
        };
        assert!(patch.apply(&meta).is_none());
    }

    #[test]
    fn patch_touches_only_present_fields() {
        let meta = ProjectMetadata {
            project_name: "Mina Sur".into(),
            consultant: "Consultora X".into(),
            ..ProjectMetadata::default()
        };
        let patch = MetadataPatch {
            consultant: Some("Consultora Y".into()),
            ..MetadataPatch::default()
        };
        let next = patch.apply(&meta).unwrap();
        assert_eq!(next.project_name, "Mina Sur");
        assert_eq!(next.consultant, "Consultora Y");
    }

    #[test]
    fn location_uses_spanish_wire_names() {
        let location = LocationSelection {
            department: "Cusco".into(),
            province: "Espinar".into(),
            district: "Yauri".into(),
            ubigeo: Some("080801".into()),
        };
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["departamento"], "Cusco");
        assert_eq!(json["distrito"], "Yauri");
    }
}
