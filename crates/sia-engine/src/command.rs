//! Command vocabulary
//!
//! Every mutation of a [`ProjectState`](sia_model::ProjectState) is one of
//! these values. On the wire a command is `{ "type": "<ns>/<op>", "payload": {...} }`;
//! the namespace picks the slice reducer.

use crate::reducers::{
    CcppCommand, FieldCommand, GroupCommand, ImageCommand, MetadataCommand, ProjectCommand,
    RegistryCommand, SectionCommand, TableCommand,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every wire type tag the root reducer understands
pub const COMMAND_TYPES: &[&str] = &[
    "metadata/setProjectName",
    "metadata/setConsultant",
    "metadata/setDescription",
    "metadata/setLocation",
    "metadata/update",
    "groupConfig/addGroup",
    "groupConfig/removeGroup",
    "groupConfig/renameGroup",
    "groupConfig/reorderGroups",
    "groupConfig/setGroups",
    "groupConfig/setCcpp",
    "groupConfig/addCcpp",
    "groupConfig/removeCcpp",
    "section/initialize",
    "section/setComplete",
    "section/reset",
    "field/set",
    "field/setMany",
    "field/touch",
    "field/clear",
    "field/clearSection",
    "table/setRows",
    "table/addRow",
    "table/updateRow",
    "table/updateCell",
    "table/removeRow",
    "table/reorderRows",
    "table/setTotals",
    "table/clear",
    "image/add",
    "image/update",
    "image/remove",
    "image/reorder",
    "image/setUploadStatus",
    "ccpp/upsert",
    "ccpp/upsertMany",
    "ccpp/remove",
    "registry/setLocation",
    "registry/addInterviewee",
    "registry/updateInterviewee",
    "registry/removeInterviewee",
    "project/reset",
    "project/markSaved",
    "batch/execute",
];

/// Any command accepted by the root reducer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    Metadata(MetadataCommand),
    Group(GroupCommand),
    Section(SectionCommand),
    Field(FieldCommand),
    Table(TableCommand),
    Image(ImageCommand),
    Ccpp(CcppCommand),
    Registry(RegistryCommand),
    Project(ProjectCommand),
    Batch(BatchCommand),
}

impl Command {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Metadata(c) => c.kind(),
            Self::Group(c) => c.kind(),
            Self::Section(c) => c.kind(),
            Self::Field(c) => c.kind(),
            Self::Table(c) => c.kind(),
            Self::Image(c) => c.kind(),
            Self::Ccpp(c) => c.kind(),
            Self::Registry(c) => c.kind(),
            Self::Project(c) => c.kind(),
            Self::Batch(c) => c.kind(),
        }
    }

    /// Namespace part of the type tag (`"field"` for `field/set`)
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        let kind = self.kind();
        kind.split_once('/').map_or(kind, |(ns, _)| ns)
    }

    /// Wrap commands into a batch
    #[must_use]
    pub fn batch(transaction_id: impl Into<String>, commands: Vec<Command>) -> Self {
        Self::Batch(BatchCommand::Execute {
            transaction_id: transaction_id.into(),
            commands,
        })
    }

    /// Decode a command from JSON
    ///
    /// Returns `Ok(None)` when the type tag is not one of [`COMMAND_TYPES`].
    ///
    /// # Errors
    /// Returns error if the tag is known but the payload does not match it.
    pub fn from_json(value: Value) -> Result<Option<Self>, serde_json::Error> {
        match value.get("type").and_then(Value::as_str) {
            Some(tag) if is_known_type(tag) => serde_json::from_value(value).map(Some),
            _ => Ok(None),
        }
    }
}

/// Whether a type tag names a command
#[must_use]
pub fn is_known_type(tag: &str) -> bool {
    COMMAND_TYPES.contains(&tag)
}

macro_rules! impl_from_command {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Command {
                fn from(command: $ty) -> Self {
                    Self::$variant(command)
                }
            }
        )*
    };
}

impl_from_command! {
    Metadata => MetadataCommand,
    Group => GroupCommand,
    Section => SectionCommand,
    Field => FieldCommand,
    Table => TableCommand,
    Image => ImageCommand,
    Ccpp => CcppCommand,
    Registry => RegistryCommand,
    Project => ProjectCommand,
    Batch => BatchCommand,
}

/// Ordered command sequence applied without interleaving
///
/// There is no rollback: each sub-command is applied in turn and a no-op
/// sub-command simply leaves the state as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum BatchCommand {
    #[serde(rename = "batch/execute")]
    Execute {
        transaction_id: String,
        commands: Vec<Command>,
    },
}

impl BatchCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Execute { .. } => "batch/execute",
        }
    }

    /// Caller-chosen id of the batch
    #[must_use]
    pub fn transaction_id(&self) -> &str {
        match self {
            Self::Execute { transaction_id, .. } => transaction_id,
        }
    }
}
