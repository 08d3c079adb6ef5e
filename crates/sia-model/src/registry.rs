//! Reference registries
//!
//! Populated centers (CCPP) referenced by groups and table rows, plus the
//! global registry of location and interviewees.

use crate::Timestamp;
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

/// A populated center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcppEntry {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "codigo", default)]
    pub code: Option<String>,
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "poblacion", default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub ubigeo: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Populated-center registry slice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcppRegistry {
    pub by_id: OrdMap<String, CcppEntry>,
    pub last_updated: Option<Timestamp>,
}

impl CcppRegistry {
    /// Entry by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CcppEntry> {
        self.by_id.get(id)
    }

    /// Whether an id or a CCPP code is registered
    #[must_use]
    pub fn resolves(&self, reference: &str) -> bool {
        self.by_id.contains_key(reference)
            || self
                .by_id
                .values()
                .any(|c| c.code.as_deref() == Some(reference))
    }
}

/// Resolved project location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryLocation {
    #[serde(rename = "departamento")]
    pub department: String,
    #[serde(rename = "provincia")]
    pub province: String,
    #[serde(rename = "distrito")]
    pub district: String,
    pub ubigeo: Option<String>,
}

/// A person interviewed during field work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interviewee {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cargo", default)]
    pub role: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Global registry slice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalRegistryState {
    pub location: Option<RegistryLocation>,
    #[serde(rename = "entrevistados", default)]
    pub interviewees: Vector<Interviewee>,
}

impl GlobalRegistryState {
    /// Interviewee by id
    #[must_use]
    pub fn interviewee(&self, id: &str) -> Option<&Interviewee> {
        self.interviewees.iter().find(|i| i.id == id)
    }
}
