//! Functional tests for hierarchical group identifiers.
//!
//! Core guarantees exercised here:
//! - Ids are derived from tree position: `A.n` roots, `parent.n` children.
//! - Renumbering an already numbered forest is the identity.
//! - Removing a middle root closes the gap and keeps relative order.
//! - Removing a group with children needs the cascade flag.
//! - Reordering siblings renumbers the whole subtree under them.
//! - Fields, tables, statuses and photographs keyed by group follow their
//!   group when its id changes; those of a removed group are dropped.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use sia_engine::{
    reduce, renumber_groups, replay, validate, Command, GroupCommand, ReferenceRules,
    SectionCommand,
};
use sia_model::{CompositeKey, GroupKind, ProjectState, ScopeKey};
use sia_test_utils::{add_group, add_image, add_row, ctx, empty_state, remove_group, row, set_field};
use std::sync::Arc;

fn forest(state: &ProjectState, kind: GroupKind) -> Vec<(String, Option<String>, u32, String)> {
    state
        .group_config
        .groups(kind)
        .iter()
        .map(|g| (g.id.clone(), g.parent_id.clone(), g.order, g.name.clone()))
        .collect()
}

fn ids(state: &ProjectState, kind: GroupKind) -> Vec<String> {
    state.group_config.groups(kind).iter().map(|g| g.id.clone()).collect()
}

fn three_roots() -> Arc<ProjectState> {
    replay(
        &empty_state(),
        &[
            add_group(GroupKind::Aisd, "Alto", None),
            add_group(GroupKind::Aisd, "Medio", None),
            add_group(GroupKind::Aisd, "Bajo", None),
        ],
        &ctx(),
    )
}

/// Removing B from [A, B, C] yields [A → 1st token, C → 2nd token].
#[test]
fn removing_middle_root_leaves_no_gap() {
    let state = reduce(&three_roots(), &remove_group(GroupKind::Aisd, "A.2", false), &ctx());
    assert_eq!(
        forest(&state, GroupKind::Aisd),
        vec![
            ("A.1".into(), None, 0, "Alto".into()),
            ("A.2".into(), None, 1, "Bajo".into()),
        ]
    );
}

/// Descendants follow their parent when a root before them disappears.
#[test]
fn subtree_ids_shift_with_their_root() {
    let state = replay(
        &three_roots(),
        &[
            add_group(GroupKind::Aisd, "Anexo Bajo", Some("A.3")),
            add_group(GroupKind::Aisd, "Sector Bajo", Some("A.3.1")),
            remove_group(GroupKind::Aisd, "A.1", false),
        ],
        &ctx(),
    );
    assert_eq!(ids(&state, GroupKind::Aisd), vec!["A.1", "A.2", "A.2.1", "A.2.1.1"]);
    let sector = state.group_config.find(GroupKind::Aisd, "A.2.1.1").unwrap();
    assert_eq!(sector.parent_id.as_deref(), Some("A.2.1"));
    assert_eq!(sector.name, "Sector Bajo");
}

/// Without cascade a parent with children cannot be removed.
#[test]
fn removing_parent_requires_cascade() {
    let state = reduce(&three_roots(), &add_group(GroupKind::Aisd, "Anexo", Some("A.1")), &ctx());
    let refused = reduce(&state, &remove_group(GroupKind::Aisd, "A.1", false), &ctx());
    assert!(Arc::ptr_eq(&state, &refused));

    let removed = reduce(&state, &remove_group(GroupKind::Aisd, "A.1", true), &ctx());
    assert_eq!(ids(&removed, GroupKind::Aisd), vec!["A.1", "A.2"]);
}

/// Reordering roots moves their subtrees with them.
#[test]
fn reorder_roots_renumbers_subtrees() {
    let anexo = add_group(GroupKind::Aisd, "Anexo Medio", Some("A.2"));
    let state = reduce(&three_roots(), &anexo, &ctx());
    let state = reduce(
        &state,
        &Command::Group(GroupCommand::Reorder {
            kind: GroupKind::Aisd,
            parent_id: None,
            ordered_ids: vec!["A.2".into(), "A.1".into(), "A.3".into()],
        }),
        &ctx(),
    );
    let names: Vec<_> = forest(&state, GroupKind::Aisd)
        .into_iter()
        .map(|(id, _, _, name)| format!("{id} {name}"))
        .collect();
    assert_eq!(names, vec!["A.1 Medio", "A.1.1 Anexo Medio", "A.2 Alto", "A.3 Bajo"]);
}

/// AISD and AISI forests are numbered independently.
#[test]
fn kinds_do_not_interfere() {
    let state = replay(
        &three_roots(),
        &[
            add_group(GroupKind::Aisi, "Distrito Espinar", None),
            remove_group(GroupKind::Aisd, "A.1", false),
        ],
        &ctx(),
    );
    assert_eq!(ids(&state, GroupKind::Aisi), vec!["B.1"]);
    assert_eq!(ids(&state, GroupKind::Aisd), vec!["A.1", "A.2"]);
}

fn field(state: &ProjectState, key: &str) -> Option<serde_json::Value> {
    let key: CompositeKey = key.parse().unwrap();
    state.fields.get(&key).map(|entry| entry.value.clone())
}

/// Removing B from [A, B, C] hands C's data to C's new id and drops B's.
#[test]
fn removing_middle_root_moves_group_data() {
    let state = replay(
        &three_roots(),
        &[
            set_field("3.1", Some("A.2"), "poblacion", json!(200)),
            set_field("3.1", Some("A.3"), "poblacion", json!(300)),
            set_field("3.1", None, "resumen", json!("texto")),
            add_row("3.1", Some("A.3"), "sexo", row(&[("casos", json!(12))])),
            add_row("3.1", Some("A.2"), "sexo", row(&[("casos", json!(7))])),
            add_image("f1", "3.1", Some("A.3")),
            add_image("f2", "3.1", Some("A.2")),
            Command::Section(SectionCommand::SetComplete {
                section_id: "3.1".into(),
                group_id: Some("A.3".into()),
                is_complete: true,
            }),
        ],
        &ctx(),
    );
    let revision = state.internal.revision;

    let state = reduce(&state, &remove_group(GroupKind::Aisd, "A.2", false), &ctx());
    assert_eq!(state.internal.revision, revision + 1);
    assert_eq!(state.group_config.find(GroupKind::Aisd, "A.2").unwrap().name, "Bajo");

    assert_eq!(field(&state, "3.1::A.2::poblacion"), Some(json!(300)));
    assert_eq!(field(&state, "3.1::A.3::poblacion"), None);
    assert_eq!(field(&state, "3.1::resumen"), Some(json!("texto")));
    assert_eq!(state.fields.len(), 2);
    assert!(state.fields.is_consistent());

    let sexo: CompositeKey = "3.1::A.2::sexo".parse().unwrap();
    let table = state.tables.get(&sexo).unwrap();
    assert_eq!(table.group_id.as_deref(), Some("A.2"));
    assert_eq!(table.rows[0].data["casos"], json!(12));
    assert_eq!(state.tables.all_keys.len(), 1);

    assert!(state.images.get("f2").is_none());
    let f1 = state.images.get("f1").unwrap();
    assert_eq!((f1.group_id.as_deref(), f1.numero), (Some("A.2"), 1));
    assert_eq!(state.images.all_ids.len(), 1);

    let scope: ScopeKey = "3.1::A.2".parse().unwrap();
    assert!(state.sections.get(&scope).is_some_and(|s| s.is_complete));
    assert_eq!(state.sections.by_id.len(), 1);

    assert!(validate(&state, &ReferenceRules::default()).is_empty());
}

/// Swapping two roots swaps the data keyed by their ids.
#[test]
fn reordering_roots_carries_group_data() {
    let state = replay(
        &three_roots(),
        &[
            set_field("2", Some("A.1"), "nombre", json!("Alto")),
            set_field("2", Some("A.2"), "nombre", json!("Medio")),
        ],
        &ctx(),
    );
    let state = reduce(
        &state,
        &Command::Group(GroupCommand::Reorder {
            kind: GroupKind::Aisd,
            parent_id: None,
            ordered_ids: vec!["A.2".into(), "A.1".into(), "A.3".into()],
        }),
        &ctx(),
    );
    assert_eq!(field(&state, "2::A.1::nombre"), Some(json!("Medio")));
    assert_eq!(field(&state, "2::A.2::nombre"), Some(json!("Alto")));
    assert!(state.fields.is_consistent());
}

/// A reorder that is not a sibling permutation changes nothing.
#[test]
fn partial_reorder_is_rejected() {
    let state = three_roots();
    let next = reduce(
        &state,
        &Command::Group(GroupCommand::Reorder {
            kind: GroupKind::Aisd,
            parent_id: None,
            ordered_ids: vec!["A.2".into(), "A.1".into()],
        }),
        &ctx(),
    );
    assert!(Arc::ptr_eq(&state, &next));
}

#[derive(Debug, Clone)]
enum Edit {
    Add { parent: Option<usize> },
    Remove { target: usize, cascade: bool },
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        prop::option::of(0usize..8).prop_map(|parent| Edit::Add { parent }),
        (0usize..8, any::<bool>()).prop_map(|(target, cascade)| Edit::Remove { target, cascade }),
    ]
}

fn apply_edits(edits: &[Edit]) -> Arc<ProjectState> {
    edits.iter().enumerate().fold(empty_state(), |state, (n, edit)| {
        let existing = ids(&state, GroupKind::Aisd);
        let pick = |i: usize| existing.get(i % existing.len().max(1)).cloned();
        let command = match edit {
            Edit::Add { parent } => {
                let parent = parent.and_then(pick);
                add_group(GroupKind::Aisd, &format!("G{n}"), parent.as_deref())
            }
            Edit::Remove { target, cascade } => match pick(*target) {
                Some(id) => remove_group(GroupKind::Aisd, &id, *cascade),
                None => return state,
            },
        };
        reduce(&state, &command, &ctx())
    })
}

proptest! {
    /// Guarantee: renumbering a numbered forest is the identity.
    #[test]
    fn renumbering_is_idempotent(edits in prop::collection::vec(arb_edit(), 0..20)) {
        let state = apply_edits(&edits);
        let groups = state.group_config.groups(GroupKind::Aisd);
        let again = renumber_groups(GroupKind::Aisd, groups);
        prop_assert_eq!(&again, groups);
    }

    /// Guarantee: every id equals its parent's id plus its 1-based position.
    #[test]
    fn ids_match_tree_position(edits in prop::collection::vec(arb_edit(), 0..20)) {
        let state = apply_edits(&edits);
        for group in state.group_config.groups(GroupKind::Aisd) {
            let expected = match &group.parent_id {
                Some(parent) => format!("{parent}.{}", group.order + 1),
                None => format!("A.{}", group.order + 1),
            };
            prop_assert_eq!(&group.id, &expected);
        }
    }
}
