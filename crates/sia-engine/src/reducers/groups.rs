//! Group configuration reducer
//!
//! Group ids are a view of tree position. After every structural change the
//! whole forest of the affected kind is renumbered:
//!
//! 1. roots sorted by their current `orden` get `A.1`, `A.2`, ... (`B.*` for AISI)
//! 2. children get `parent.id + "." + position` (1-based), recursively
//! 3. `id`, `parentId` and `orden` are written back in one pre-order pass
//!
//! Renaming never touches ids. Every rewritten or removed id is reported in a
//! [`GroupRemap`] so data keyed by group can follow its group.

use crate::context::ReduceContext;
use crate::reducer::{commit, SliceReducer};
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use sia_model::{CompositeKey, GroupConfig, GroupDefinition, GroupKind};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Temporary id of a group that has not been placed yet
const PENDING_ID: &str = "\u{0}pending";

/// Commands in the `groupConfig/*` namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum GroupCommand {
    /// Append a group as the last root, or last child of `parent_id`
    #[serde(rename = "groupConfig/addGroup")]
    Add {
        kind: GroupKind,
        name: String,
        #[serde(default)]
        parent_id: Option<String>,
        #[serde(default)]
        ccpp_ids: Vec<String>,
    },

    /// Remove a group; with children present this requires `cascade`
    #[serde(rename = "groupConfig/removeGroup")]
    Remove {
        kind: GroupKind,
        id: String,
        #[serde(default)]
        cascade: bool,
    },

    #[serde(rename = "groupConfig/renameGroup")]
    Rename {
        kind: GroupKind,
        id: String,
        name: String,
    },

    /// Reorder the siblings under `parent_id` (roots when `None`)
    #[serde(rename = "groupConfig/reorderGroups")]
    Reorder {
        kind: GroupKind,
        #[serde(default)]
        parent_id: Option<String>,
        ordered_ids: Vec<String>,
    },

    /// Replace the whole forest of one kind
    #[serde(rename = "groupConfig/setGroups")]
    SetGroups {
        kind: GroupKind,
        groups: Vec<GroupDefinition>,
    },

    #[serde(rename = "groupConfig/setCcpp")]
    SetCcpp {
        kind: GroupKind,
        id: String,
        ccpp_ids: Vec<String>,
    },

    #[serde(rename = "groupConfig/addCcpp")]
    AddCcpp {
        kind: GroupKind,
        id: String,
        ccpp_ids: Vec<String>,
    },

    #[serde(rename = "groupConfig/removeCcpp")]
    RemoveCcpp {
        kind: GroupKind,
        id: String,
        ccpp_ids: Vec<String>,
    },
}

impl GroupCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "groupConfig/addGroup",
            Self::Remove { .. } => "groupConfig/removeGroup",
            Self::Rename { .. } => "groupConfig/renameGroup",
            Self::Reorder { .. } => "groupConfig/reorderGroups",
            Self::SetGroups { .. } => "groupConfig/setGroups",
            Self::SetCcpp { .. } => "groupConfig/setCcpp",
            Self::AddCcpp { .. } => "groupConfig/addCcpp",
            Self::RemoveCcpp { .. } => "groupConfig/removeCcpp",
        }
    }
}

/// Reducer for [`GroupConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupReducer;

impl SliceReducer for GroupReducer {
    type Slice = GroupConfig;
    type Command = GroupCommand;

    fn reduce(
        slice: &Arc<GroupConfig>,
        command: &GroupCommand,
        ctx: &ReduceContext,
    ) -> Arc<GroupConfig> {
        apply(slice, command, ctx).0
    }
}

/// Apply a group command and report the ids it rewrote
///
/// The remap is empty for no-ops and for commands that keep every id.
/// `setGroups` replaces a forest wholesale and reports nothing.
#[must_use]
pub fn apply(
    slice: &Arc<GroupConfig>,
    command: &GroupCommand,
    ctx: &ReduceContext,
) -> (Arc<GroupConfig>, GroupRemap) {
    let (kind, next) = match command {
        GroupCommand::Add {
            kind,
            name,
            parent_id,
            ccpp_ids,
        } => (
            *kind,
            add(slice.groups(*kind), *kind, name, parent_id.as_deref(), ccpp_ids),
        ),
        GroupCommand::Remove { kind, id, cascade } => {
            (*kind, remove(slice.groups(*kind), *kind, id, *cascade))
        }
        GroupCommand::Rename { kind, id, name } => {
            (*kind, rename(slice.groups(*kind), id, name).map(in_place))
        }
        GroupCommand::Reorder {
            kind,
            parent_id,
            ordered_ids,
        } => (
            *kind,
            reorder(slice.groups(*kind), *kind, parent_id.as_deref(), ordered_ids),
        ),
        GroupCommand::SetGroups { kind, groups } => {
            let renumbered = renumber(*kind, &groups.iter().cloned().collect());
            let changed = renumbered != *slice.groups(*kind);
            (*kind, changed.then(|| in_place(renumbered)))
        }
        GroupCommand::SetCcpp { kind, id, ccpp_ids } => (
            *kind,
            edit_ccpp(slice.groups(*kind), id, |_| dedupe(ccpp_ids.iter())).map(in_place),
        ),
        GroupCommand::AddCcpp { kind, id, ccpp_ids } => {
            if ccpp_ids.is_empty() {
                return (Arc::clone(slice), GroupRemap::default());
            }
            let next = edit_ccpp(slice.groups(*kind), id, |current| {
                dedupe(current.iter().chain(ccpp_ids.iter()))
            });
            (*kind, next.map(in_place))
        }
        GroupCommand::RemoveCcpp { kind, id, ccpp_ids } => {
            if ccpp_ids.is_empty() {
                return (Arc::clone(slice), GroupRemap::default());
            }
            let next = edit_ccpp(slice.groups(*kind), id, |current| {
                current
                    .iter()
                    .filter(|c| !ccpp_ids.contains(c))
                    .cloned()
                    .collect()
            });
            (*kind, next.map(in_place))
        }
    };

    let Some((groups, remap)) = next else {
        return (Arc::clone(slice), GroupRemap::default());
    };
    let mut config = (**slice).clone();
    *config.groups_mut(kind) = groups;
    config.last_updated = Some(ctx.now);
    (commit(slice, Some(config)), remap)
}

/// Old group id to new group id for one transition
///
/// Removed groups map to `None`. Ids that kept their value are absent, so
/// an empty remap means group-keyed data stays where it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRemap {
    ids: HashMap<String, Option<String>>,
}

impl GroupRemap {
    fn new(moved: HashMap<String, String>) -> Self {
        let ids = moved
            .into_iter()
            .filter(|(old, new)| old != new && old != PENDING_ID)
            .map(|(old, new)| (old, Some(new)))
            .collect();
        Self { ids }
    }

    fn removing(mut self, removed: impl IntoIterator<Item = String>) -> Self {
        self.ids.extend(removed.into_iter().map(|old| (old, None)));
        self
    }

    /// True when no id changed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether data scoped to `group_id` has to move or go
    #[must_use]
    pub fn touches(&self, group_id: Option<&str>) -> bool {
        group_id.is_some_and(|id| self.ids.contains_key(id))
    }

    /// Where data scoped to `group_id` belongs now; `None` once the group is
    /// gone
    #[must_use]
    pub fn resolve<'a>(&'a self, group_id: &'a str) -> Option<&'a str> {
        match self.ids.get(group_id) {
            Some(next) => next.as_deref(),
            None => Some(group_id),
        }
    }
}

/// Rebuild a composite-keyed slice after a remap
///
/// Keys of removed groups are dropped; moved entries go through `relocate`.
/// Returns `None` when no key is affected.
pub(crate) fn rekey<V: Clone>(
    by_key: &OrdMap<CompositeKey, V>,
    all_keys: &Vector<CompositeKey>,
    remap: &GroupRemap,
    relocate: impl Fn(&CompositeKey, V) -> V,
) -> Option<(OrdMap<CompositeKey, V>, Vector<CompositeKey>)> {
    if !all_keys.iter().any(|key| remap.touches(key.group_id())) {
        return None;
    }
    let mut next_map = OrdMap::new();
    let mut next_keys = Vector::new();
    for key in all_keys {
        let Some(value) = by_key.get(key) else {
            continue;
        };
        let Some(group) = key.group_id().filter(|group| remap.touches(Some(*group))) else {
            if !next_map.contains_key(key) {
                next_map.insert(key.clone(), value.clone());
                next_keys.push_back(key.clone());
            }
            continue;
        };
        let Some(moved) = remap.resolve(group).and_then(|new| key.with_group(new).ok()) else {
            continue;
        };
        let value = relocate(&moved, value.clone());
        if next_map.insert(moved.clone(), value).is_none() {
            next_keys.push_back(moved);
        }
    }
    Some((next_map, next_keys))
}

fn in_place(groups: Vector<GroupDefinition>) -> (Vector<GroupDefinition>, GroupRemap) {
    (groups, GroupRemap::default())
}

fn add(
    groups: &Vector<GroupDefinition>,
    kind: GroupKind,
    name: &str,
    parent_id: Option<&str>,
    ccpp_ids: &[String],
) -> Option<(Vector<GroupDefinition>, GroupRemap)> {
    if let Some(parent) = parent_id {
        if !groups.iter().any(|g| g.id == parent) {
            return None;
        }
    }
    let mut next = groups.clone();
    next.push_back(GroupDefinition {
        id: PENDING_ID.to_string(),
        name: name.to_string(),
        kind,
        parent_id: parent_id.map(str::to_string),
        order: u32::MAX,
        ccpp_ids: dedupe(ccpp_ids.iter()),
    });
    let (groups, moved) = renumber_tracked(kind, &next);
    Some((groups, GroupRemap::new(moved)))
}

fn remove(
    groups: &Vector<GroupDefinition>,
    kind: GroupKind,
    id: &str,
    cascade: bool,
) -> Option<(Vector<GroupDefinition>, GroupRemap)> {
    if !groups.iter().any(|g| g.id == id) {
        return None;
    }
    let doomed = descendants(groups, id);
    if !doomed.is_empty() && !cascade {
        tracing::debug!(
            group = id,
            children = doomed.len(),
            "refusing to remove group with children"
        );
        return None;
    }
    let next: Vector<GroupDefinition> = groups
        .iter()
        .filter(|g| g.id != id && !doomed.contains(g.id.as_str()))
        .cloned()
        .collect();
    let removed = doomed
        .into_iter()
        .map(str::to_string)
        .chain(std::iter::once(id.to_string()));
    let (groups, moved) = renumber_tracked(kind, &next);
    Some((groups, GroupRemap::new(moved).removing(removed)))
}

fn rename(
    groups: &Vector<GroupDefinition>,
    id: &str,
    name: &str,
) -> Option<Vector<GroupDefinition>> {
    let index = groups.iter().position(|g| g.id == id)?;
    if groups[index].name == name {
        return None;
    }
    let mut next = groups.clone();
    let mut group = next[index].clone();
    group.name = name.to_string();
    next.set(index, group);
    Some(next)
}

fn reorder(
    groups: &Vector<GroupDefinition>,
    kind: GroupKind,
    parent_id: Option<&str>,
    ordered_ids: &[String],
) -> Option<(Vector<GroupDefinition>, GroupRemap)> {
    let mut siblings: Vec<&GroupDefinition> = groups
        .iter()
        .filter(|g| g.parent_id.as_deref() == parent_id)
        .collect();
    siblings.sort_by_key(|g| g.order);
    let current: Vec<&str> = siblings.iter().map(|g| g.id.as_str()).collect();

    if !is_permutation(&current, ordered_ids) {
        return None;
    }
    if current.iter().zip(ordered_ids).all(|(a, b)| *a == b) {
        return None;
    }

    let positions: HashMap<&str, u32> = ordered_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), u32::try_from(i).unwrap_or(u32::MAX)))
        .collect();
    let next: Vector<GroupDefinition> = groups
        .iter()
        .map(|g| match (g.parent_id.as_deref() == parent_id, positions.get(g.id.as_str())) {
            (true, Some(position)) => GroupDefinition {
                order: *position,
                ..g.clone()
            },
            _ => g.clone(),
        })
        .collect();
    let (groups, moved) = renumber_tracked(kind, &next);
    Some((groups, GroupRemap::new(moved)))
}

fn edit_ccpp(
    groups: &Vector<GroupDefinition>,
    id: &str,
    edit: impl FnOnce(&[String]) -> Vec<String>,
) -> Option<Vector<GroupDefinition>> {
    let index = groups.iter().position(|g| g.id == id)?;
    let ccpp_ids = edit(&groups[index].ccpp_ids);
    if ccpp_ids == groups[index].ccpp_ids {
        return None;
    }
    let mut next = groups.clone();
    next.set(
        index,
        GroupDefinition {
            ccpp_ids,
            ..groups[index].clone()
        },
    );
    Some(next)
}

/// Ids of every descendant of `id`
fn descendants<'a>(groups: &'a Vector<GroupDefinition>, id: &str) -> HashSet<&'a str> {
    let mut found: HashSet<&str> = HashSet::new();
    let mut frontier = vec![id.to_string()];
    while let Some(parent) = frontier.pop() {
        for group in groups.iter() {
            let is_child = group.parent_id.as_deref() == Some(parent.as_str());
            if is_child && found.insert(group.id.as_str()) {
                frontier.push(group.id.clone());
            }
        }
    }
    found
}

fn dedupe<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

fn is_permutation(current: &[&str], proposed: &[String]) -> bool {
    if current.len() != proposed.len() {
        return false;
    }
    let mut left: Vec<&str> = current.to_vec();
    let mut right: Vec<&str> = proposed.iter().map(String::as_str).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}

/// Re-derive `id`, `parentId` and `orden` for a whole forest
///
/// Output is in pre-order (each root followed by its subtree). Nodes whose
/// parent is missing, or that sit on a parent cycle, are promoted to roots
/// after the regular roots.
#[must_use]
pub fn renumber(kind: GroupKind, groups: &Vector<GroupDefinition>) -> Vector<GroupDefinition> {
    renumber_tracked(kind, groups).0
}

/// [`renumber`], also returning each node's old id mapped to its new one
fn renumber_tracked(
    kind: GroupKind,
    groups: &Vector<GroupDefinition>,
) -> (Vector<GroupDefinition>, HashMap<String, String>) {
    let nodes: Vec<&GroupDefinition> = groups.iter().collect();
    let known: HashSet<&str> = nodes.iter().map(|g| g.id.as_str()).collect();

    let mut roots = Vec::new();
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        match node.parent_id.as_deref() {
            Some(parent) if parent != node.id && known.contains(parent) => {
                children.entry(parent).or_default().push(index);
            }
            _ => roots.push(index),
        }
    }

    let by_order = |a: &usize, b: &usize| nodes[*a].order.cmp(&nodes[*b].order).then(a.cmp(b));
    roots.sort_by(by_order);
    for list in children.values_mut() {
        list.sort_by(by_order);
    }

    let mut pass = Renumbering {
        kind,
        nodes: &nodes,
        children: &children,
        visited: vec![false; nodes.len()],
        out: Vector::new(),
        moved: HashMap::new(),
    };

    let mut placed_roots = 0u32;
    for index in roots {
        placed_roots += 1;
        pass.place(index, format!("{}.{placed_roots}", kind.root_prefix()), None, placed_roots - 1);
    }

    let mut stranded: Vec<usize> = (0..nodes.len()).filter(|i| !pass.visited[*i]).collect();
    stranded.sort_by(by_order);
    for index in stranded {
        if pass.visited[index] {
            continue;
        }
        placed_roots += 1;
        pass.place(index, format!("{}.{placed_roots}", kind.root_prefix()), None, placed_roots - 1);
    }

    (pass.out, pass.moved)
}

struct Renumbering<'a, 'b> {
    kind: GroupKind,
    nodes: &'b [&'a GroupDefinition],
    children: &'b HashMap<&'a str, Vec<usize>>,
    visited: Vec<bool>,
    out: Vector<GroupDefinition>,
    moved: HashMap<String, String>,
}

impl Renumbering<'_, '_> {
    fn place(&mut self, index: usize, id: String, parent_id: Option<String>, order: u32) {
        if self.visited[index] {
            return;
        }
        self.visited[index] = true;

        let node = self.nodes[index];
        self.moved.insert(node.id.clone(), id.clone());
        self.out.push_back(GroupDefinition {
            id: id.clone(),
            name: node.name.clone(),
            kind: self.kind,
            parent_id,
            order,
            ccpp_ids: node.ccpp_ids.clone(),
        });

        let Some(kids) = self.children.get(node.id.as_str()) else {
            return;
        };
        let mut position = 0u32;
        for &child in kids {
            if self.visited[child] {
                continue;
            }
            position += 1;
            self.place(child, format!("{id}.{position}"), Some(id.clone()), position - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ReduceContext {
        ReduceContext::at(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
    }

    fn add_root(config: &Arc<GroupConfig>, name: &str) -> Arc<GroupConfig> {
        GroupReducer::reduce(
            config,
            &GroupCommand::Add {
                kind: GroupKind::Aisd,
                name: name.into(),
                parent_id: None,
                ccpp_ids: vec![],
            },
            &ctx(),
        )
    }

    fn ids(config: &GroupConfig) -> Vec<(String, Option<String>, u32)> {
        config
            .aisd
            .iter()
            .map(|g| (g.id.clone(), g.parent_id.clone(), g.order))
            .collect()
    }

    #[test]
    fn roots_get_sequential_tokens() {
        let config = Arc::new(GroupConfig::default());
        let config = add_root(&config, "Comunidad Alto");
        let config = add_root(&config, "Comunidad Bajo");
        assert_eq!(
            ids(&config),
            vec![("A.1".into(), None, 0), ("A.2".into(), None, 1)]
        );
        assert_eq!(config.last_updated, Some(ctx().now));
    }

    #[test]
    fn aisi_uses_its_own_prefix() {
        let config = Arc::new(GroupConfig::default());
        let config = GroupReducer::reduce(
            &config,
            &GroupCommand::Add {
                kind: GroupKind::Aisi,
                name: "Distrito Yauri".into(),
                parent_id: None,
                ccpp_ids: vec![],
            },
            &ctx(),
        );
        assert_eq!(config.aisi[0].id, "B.1");
        assert!(config.aisd.is_empty());
    }

    #[test]
    fn child_ids_extend_parent() {
        let config = add_root(&Arc::new(GroupConfig::default()), "Alto");
        let config = GroupReducer::reduce(
            &config,
            &GroupCommand::Add {
                kind: GroupKind::Aisd,
                name: "Anexo 1".into(),
                parent_id: Some("A.1".into()),
                ccpp_ids: vec!["c1".into(), "c1".into()],
            },
            &ctx(),
        );
        assert_eq!(config.aisd[1].id, "A.1.1");
        assert_eq!(config.aisd[1].parent_id.as_deref(), Some("A.1"));
        assert_eq!(config.aisd[1].ccpp_ids, vec!["c1".to_string()]);
    }

    #[test]
    fn add_under_missing_parent_is_noop() {
        let config = add_root(&Arc::new(GroupConfig::default()), "Alto");
        let next = GroupReducer::reduce(
            &config,
            &GroupCommand::Add {
                kind: GroupKind::Aisd,
                name: "Huérfano".into(),
                parent_id: Some("A.9".into()),
                ccpp_ids: vec![],
            },
            &ctx(),
        );
        assert!(Arc::ptr_eq(&config, &next));
    }

    #[test]
    fn remove_with_children_needs_cascade() {
        let config = add_root(&Arc::new(GroupConfig::default()), "Alto");
        let config = GroupReducer::reduce(
            &config,
            &GroupCommand::Add {
                kind: GroupKind::Aisd,
                name: "Anexo".into(),
                parent_id: Some("A.1".into()),
                ccpp_ids: vec![],
            },
            &ctx(),
        );
        let refused = GroupReducer::reduce(
            &config,
            &GroupCommand::Remove {
                kind: GroupKind::Aisd,
                id: "A.1".into(),
                cascade: false,
            },
            &ctx(),
        );
        assert!(Arc::ptr_eq(&config, &refused));

        let removed = GroupReducer::reduce(
            &config,
            &GroupCommand::Remove {
                kind: GroupKind::Aisd,
                id: "A.1".into(),
                cascade: true,
            },
            &ctx(),
        );
        assert!(removed.aisd.is_empty());
    }

    #[test]
    fn rename_keeps_id() {
        let config = add_root(&Arc::new(GroupConfig::default()), "Alto");
        let cmd = GroupCommand::Rename {
            kind: GroupKind::Aisd,
            id: "A.1".into(),
            name: "Alto Huancané".into(),
        };
        let renamed = GroupReducer::reduce(&config, &cmd, &ctx());
        assert_eq!(renamed.aisd[0].id, "A.1");
        assert_eq!(renamed.aisd[0].name, "Alto Huancané");
        let again = GroupReducer::reduce(&renamed, &cmd, &ctx());
        assert!(Arc::ptr_eq(&renamed, &again));
    }

    #[test]
    fn ccpp_union_and_subtract() {
        let config = add_root(&Arc::new(GroupConfig::default()), "Alto");
        let config = GroupReducer::reduce(
            &config,
            &GroupCommand::AddCcpp {
                kind: GroupKind::Aisd,
                id: "A.1".into(),
                ccpp_ids: vec!["c1".into(), "c2".into()],
            },
            &ctx(),
        );
        let config = GroupReducer::reduce(
            &config,
            &GroupCommand::AddCcpp {
                kind: GroupKind::Aisd,
                id: "A.1".into(),
                ccpp_ids: vec!["c2".into(), "c3".into()],
            },
            &ctx(),
        );
        assert_eq!(config.aisd[0].ccpp_ids, vec!["c1", "c2", "c3"]);

        let config = GroupReducer::reduce(
            &config,
            &GroupCommand::RemoveCcpp {
                kind: GroupKind::Aisd,
                id: "A.1".into(),
                ccpp_ids: vec!["c1".into()],
            },
            &ctx(),
        );
        assert_eq!(config.aisd[0].ccpp_ids, vec!["c2", "c3"]);

        let empty = GroupReducer::reduce(
            &config,
            &GroupCommand::AddCcpp {
                kind: GroupKind::Aisd,
                id: "A.1".into(),
                ccpp_ids: vec![],
            },
            &ctx(),
        );
        assert!(Arc::ptr_eq(&config, &empty));
    }

    #[test]
    fn remove_reports_shifted_and_removed_ids() {
        let mut config = Arc::new(GroupConfig::default());
        for name in ["Alto", "Medio", "Bajo"] {
            config = add_root(&config, name);
        }
        let config = GroupReducer::reduce(
            &config,
            &GroupCommand::Add {
                kind: GroupKind::Aisd,
                name: "Anexo".into(),
                parent_id: Some("A.3".into()),
                ccpp_ids: vec![],
            },
            &ctx(),
        );
        let (next, remap) = apply(
            &config,
            &GroupCommand::Remove {
                kind: GroupKind::Aisd,
                id: "A.2".into(),
                cascade: false,
            },
            &ctx(),
        );
        assert_eq!(next.aisd[1].name, "Bajo");
        assert_eq!(remap.resolve("A.1"), Some("A.1"));
        assert_eq!(remap.resolve("A.2"), None);
        assert_eq!(remap.resolve("A.3"), Some("A.2"));
        assert_eq!(remap.resolve("A.3.1"), Some("A.2.1"));
        assert!(!remap.touches(Some("A.1")));
        assert!(!remap.touches(None));
    }

    #[test]
    fn reorder_reports_swapped_ids() {
        let config = add_root(&Arc::new(GroupConfig::default()), "Alto");
        let config = add_root(&config, "Bajo");
        let (_, remap) = apply(
            &config,
            &GroupCommand::Reorder {
                kind: GroupKind::Aisd,
                parent_id: None,
                ordered_ids: vec!["A.2".into(), "A.1".into()],
            },
            &ctx(),
        );
        assert_eq!(remap.resolve("A.1"), Some("A.2"));
        assert_eq!(remap.resolve("A.2"), Some("A.1"));

        let (_, unchanged) = apply(
            &config,
            &GroupCommand::Rename {
                kind: GroupKind::Aisd,
                id: "A.1".into(),
                name: "Alto Huancané".into(),
            },
            &ctx(),
        );
        assert!(unchanged.is_empty());
    }

    #[test]
    fn stranded_nodes_become_roots() {
        let groups: Vector<GroupDefinition> = vec![
            GroupDefinition {
                id: "x".into(),
                name: "X".into(),
                kind: GroupKind::Aisd,
                parent_id: Some("y".into()),
                order: 0,
                ccpp_ids: vec![],
            },
            GroupDefinition {
                id: "y".into(),
                name: "Y".into(),
                kind: GroupKind::Aisd,
                parent_id: Some("x".into()),
                order: 1,
                ccpp_ids: vec![],
            },
        ]
        .into_iter()
        .collect();
        let out = renumber(GroupKind::Aisd, &groups);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "A.1");
        assert_eq!(out[0].parent_id, None);
        assert_eq!(out[1].id, "A.1.1");
    }
}
