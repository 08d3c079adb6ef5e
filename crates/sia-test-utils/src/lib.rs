//! Testing utilities for the SIA workspace
//!
//! Shared fixtures, command builders and proptest strategies.

#![allow(missing_docs)]

use chrono::TimeZone;
use proptest::prelude::*;
use serde_json::{json, Value};
use sia_engine::{
    Command, ContentCommand, FieldAddress, FieldCommand, GroupCommand, ImageCommand, NewImage,
    ReduceContext, SectionCommand, TableAddress, TableCommand,
};
use sia_model::{
    ContentItem, ContentSection, ContentTree, FieldSource, GroupKind, ImageContent,
    ParagraphContent, ProjectState, RowData, SectionOrder, TableContent, Timestamp,
};
use sia_store::{ContentStore, FixedClock, ProjectStore, StoreConfig};
use std::sync::Arc;

/// Instant every fixture is stamped with
pub fn fixed_now() -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
}

pub fn ctx() -> ReduceContext {
    ReduceContext::at(fixed_now())
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(fixed_now()))
}

pub fn empty_state() -> Arc<ProjectState> {
    Arc::new(ProjectState::new(fixed_now()))
}

pub fn section_order(ids: &[&str]) -> SectionOrder {
    SectionOrder::new(ids.iter().copied()).unwrap()
}

pub fn project_store() -> ProjectStore {
    ProjectStore::with_clock(StoreConfig::default(), fixed_clock())
}

pub fn content_store(order: &[&str]) -> ContentStore {
    let config = StoreConfig::default().with_section_order(section_order(order));
    ContentStore::with_clock(config, fixed_clock())
}

// Command builders

pub fn set_field(section: &str, group: Option<&str>, name: &str, value: Value) -> Command {
    Command::Field(FieldCommand::Set {
        address: FieldAddress::new(section, group, name),
        value,
        source: FieldSource::User,
    })
}

pub fn add_group(kind: GroupKind, name: &str, parent: Option<&str>) -> Command {
    Command::Group(GroupCommand::Add {
        kind,
        name: name.to_string(),
        parent_id: parent.map(str::to_string),
        ccpp_ids: Vec::new(),
    })
}

pub fn remove_group(kind: GroupKind, id: &str, cascade: bool) -> Command {
    Command::Group(GroupCommand::Remove {
        kind,
        id: id.to_string(),
        cascade,
    })
}

pub fn add_image(id: &str, section: &str, group: Option<&str>) -> Command {
    Command::Image(ImageCommand::Add {
        image: NewImage {
            id: id.to_string(),
            section_id: section.to_string(),
            group_id: group.map(str::to_string),
            titulo: format!("Fotografía {id}"),
            fuente: "Trabajo de campo".to_string(),
            preview: None,
            local_path: None,
        },
    })
}

pub fn remove_image(id: &str) -> Command {
    Command::Image(ImageCommand::Remove { id: id.to_string() })
}

pub fn add_row(section: &str, group: Option<&str>, table: &str, data: RowData) -> Command {
    Command::Table(TableCommand::AddRow {
        address: TableAddress::new(section, group, table),
        data,
        position: None,
        row_id: None,
    })
}

pub fn row(pairs: &[(&str, Value)]) -> RowData {
    pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
}

// Content tree builders

pub fn image_item(id: &str) -> ContentItem {
    ContentItem::Image(ImageContent {
        id: id.to_string(),
        image_id: None,
        title: format!("Figura de {id}"),
        source: String::new(),
    })
}

pub fn table_item(id: &str) -> ContentItem {
    ContentItem::Table(TableContent {
        id: id.to_string(),
        table_key: None,
        title: format!("Cuadro de {id}"),
        source: String::new(),
    })
}

pub fn paragraph_item(id: &str) -> ContentItem {
    ContentItem::Paragraph(ParagraphContent {
        id: id.to_string(),
        text: "Texto de prueba".to_string(),
    })
}

pub fn add_section(id: &str) -> ContentCommand {
    ContentCommand::AddSection {
        section: ContentSection::new(id, format!("Sección {id}")),
    }
}

pub fn insert_item(section: &str, item: ContentItem, position: Option<usize>) -> ContentCommand {
    ContentCommand::InsertItem {
        section_id: section.to_string(),
        item,
        position,
    }
}

pub fn content_tree(sections: Vec<(&str, Vec<ContentItem>)>) -> ContentTree {
    let mut tree = ContentTree::default();
    for (id, items) in sections {
        let mut section = ContentSection::new(id, format!("Sección {id}"));
        section.contents = items.into_iter().collect();
        tree.sections.insert(id.to_string(), section);
    }
    tree
}

// Proptest strategies

pub fn arb_section_id() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["1", "2", "3.1", "3.1.2", "3.10"]).prop_map(str::to_string)
}

pub fn arb_group_id() -> impl Strategy<Value = Option<String>> {
    let ids = prop::sample::select(vec!["A.1", "A.2", "A.1.1", "B.1"]);
    prop::option::of(ids.prop_map(str::to_string))
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

/// Commands over a small key space so that effects and no-ops both occur
pub fn arb_command() -> impl Strategy<Value = Command> {
    let kinds = prop::sample::select(GroupKind::ALL.to_vec());
    prop_oneof![
        (arb_section_id(), arb_group_id(), "[a-c]", arb_value()).prop_map(|(s, g, n, v)| {
            set_field(&s, g.as_deref(), &n, v)
        }),
        (arb_section_id(), arb_group_id(), "[a-c]").prop_map(|(s, g, n)| {
            Command::Field(FieldCommand::Clear {
                address: FieldAddress::new(&s, g.as_deref(), &n),
            })
        }),
        (kinds.clone(), "[A-Z][a-z]{2,5}", arb_group_id()).prop_map(|(k, name, parent)| {
            add_group(k, &name, parent.as_deref())
        }),
        (kinds, arb_group_id(), any::<bool>()).prop_map(|(k, id, cascade)| {
            remove_group(k, id.as_deref().unwrap_or("A.1"), cascade)
        }),
        ("[a-e]", arb_section_id(), arb_group_id())
            .prop_map(|(id, s, g)| add_image(&id, &s, g.as_deref())),
        "[a-e]".prop_map(|id| remove_image(&id)),
        (arb_section_id(), arb_group_id(), any::<u8>()).prop_map(|(s, g, n)| {
            add_row(&s, g.as_deref(), "tabla", row(&[("casos", json!(n))]))
        }),
        (arb_section_id(), arb_group_id(), any::<bool>()).prop_map(|(s, g, done)| {
            Command::Section(SectionCommand::SetComplete {
                section_id: s,
                group_id: g,
                is_complete: done,
            })
        }),
    ]
}

pub fn arb_commands(max: usize) -> impl Strategy<Value = Vec<Command>> {
    prop::collection::vec(arb_command(), 0..=max)
}
