//! Influence groups
//!
//! Two parallel forests: AISD (direct-impact communities) and AISI
//! (indirect-impact districts). Each forest is stored flat with explicit
//! parent links; ids encode tree position and are always re-derived.

use crate::Timestamp;
use im::Vector;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Influence-group taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Direct-impact area (communities)
    #[serde(rename = "AISD")]
    Aisd,
    /// Indirect-impact area (districts)
    #[serde(rename = "AISI")]
    Aisi,
}

impl GroupKind {
    /// Letter that prefixes root tokens of this forest
    #[inline]
    #[must_use]
    pub fn root_prefix(self) -> &'static str {
        match self {
            Self::Aisd => "A",
            Self::Aisi => "B",
        }
    }

    /// Both kinds, AISD first
    pub const ALL: [Self; 2] = [Self::Aisd, Self::Aisi];
}

impl Display for GroupKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aisd => f.write_str("AISD"),
            Self::Aisi => f.write_str("AISI"),
        }
    }
}

/// One node of a group forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDefinition {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: GroupKind,
    pub parent_id: Option<String>,
    #[serde(rename = "orden")]
    pub order: u32,
    #[serde(rename = "ccppIds", default)]
    pub ccpp_ids: Vec<String>,
}

impl GroupDefinition {
    /// True for forest roots
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Nesting depth derived from the id (roots are 0)
    #[must_use]
    pub fn depth(&self) -> usize {
        // Root tokens already contain one dot ("A.1").
        self.id.matches('.').count().saturating_sub(1)
    }
}

/// Group configuration slice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    #[serde(default)]
    pub aisd: Vector<GroupDefinition>,
    #[serde(default)]
    pub aisi: Vector<GroupDefinition>,
    pub last_updated: Option<Timestamp>,
}

impl GroupConfig {
    /// Groups of one kind, in stored (pre-order) order
    #[inline]
    #[must_use]
    pub fn groups(&self, kind: GroupKind) -> &Vector<GroupDefinition> {
        match kind {
            GroupKind::Aisd => &self.aisd,
            GroupKind::Aisi => &self.aisi,
        }
    }

    /// Mutable access, used by reducers on their private copy
    #[inline]
    pub fn groups_mut(&mut self, kind: GroupKind) -> &mut Vector<GroupDefinition> {
        match kind {
            GroupKind::Aisd => &mut self.aisd,
            GroupKind::Aisi => &mut self.aisi,
        }
    }

    /// Look a group up by id
    #[must_use]
    pub fn find(&self, kind: GroupKind, id: &str) -> Option<&GroupDefinition> {
        self.groups(kind).iter().find(|g| g.id == id)
    }

    /// Look a group up by id in either forest
    #[must_use]
    pub fn find_any(&self, id: &str) -> Option<&GroupDefinition> {
        GroupKind::ALL.iter().find_map(|kind| self.find(*kind, id))
    }

    /// Direct children of a group, sorted by `order`
    #[must_use]
    pub fn children(&self, kind: GroupKind, parent_id: &str) -> Vec<&GroupDefinition> {
        let mut children: Vec<_> = self
            .groups(kind)
            .iter()
            .filter(|g| g.parent_id.as_deref() == Some(parent_id))
            .collect();
        children.sort_by_key(|g| g.order);
        children
    }

    /// Roots of one forest, sorted by `order`
    #[must_use]
    pub fn roots(&self, kind: GroupKind) -> Vec<&GroupDefinition> {
        let mut roots: Vec<_> = self.groups(kind).iter().filter(|g| g.is_root()).collect();
        roots.sort_by_key(|g| g.order);
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, parent: Option<&str>, order: u32) -> GroupDefinition {
        GroupDefinition {
            id: id.into(),
            name: format!("Grupo {id}"),
            kind: GroupKind::Aisd,
            parent_id: parent.map(Into::into),
            order,
            ccpp_ids: Vec::new(),
        }
    }

    #[test]
    fn depth_from_id() {
        assert_eq!(group("A.1", None, 0).depth(), 0);
        assert_eq!(group("A.1.2", Some("A.1"), 1).depth(), 1);
        assert_eq!(group("A.1.2.1", Some("A.1.2"), 0).depth(), 2);
    }

    #[test]
    fn children_sorted_by_order() {
        let mut config = GroupConfig::default();
        config.aisd.push_back(group("A.1", None, 0));
        config.aisd.push_back(group("A.1.2", Some("A.1"), 1));
        config.aisd.push_back(group("A.1.1", Some("A.1"), 0));
        let ids: Vec<_> = config
            .children(GroupKind::Aisd, "A.1")
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(ids, vec!["A.1.1", "A.1.2"]);
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(serde_json::to_string(&GroupKind::Aisi).unwrap(), "\"AISI\"");
        let json = serde_json::to_value(group("A.1", None, 0)).unwrap();
        assert_eq!(json["tipo"], "AISD");
        assert_eq!(json["nombre"], "Grupo A.1");
        assert_eq!(json["orden"], 0);
    }
}
