//! SIA Report Engine
//!
//! Pure command/reducer core of the report editor.
//!
//! # Core Concepts
//!
//! - [`Command`]: closed set of serializable mutations, tagged `ns/op`
//! - [`SliceReducer`]: `(slice, command) -> slice`, same `Arc` on no-op
//! - [`reduce`]: root reducer; routes by namespace, moves group-keyed data
//!   when group ids are renumbered, and stamps bookkeeping
//! - [`execute_batch`]: ordered sub-commands, nested batches skipped
//! - [`numbering`]: global figure/table numbers derived from the content tree
//! - [`validate`]: referential-integrity pass producing [`ValidationIssue`]s
//!
//! Nothing in this crate performs I/O or reads the clock. Time comes in
//! through [`ReduceContext`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod command;
pub mod content;
pub mod context;
pub mod reducer;
pub mod reducers;
pub mod root;
pub mod selectors;
pub mod validation;

pub use command::{is_known_type, BatchCommand, Command, COMMAND_TYPES};
pub use content::numbering::{self, NumberedItem};
pub use content::{ContentCommand, ContentReducer};
pub use context::ReduceContext;
pub use reducer::SliceReducer;
pub use reducers::{
    renumber_groups, CcppCommand, FieldAddress, FieldCommand, FieldUpdate, GroupCommand,
    GroupRemap, ImageCommand, ImagePatch, IntervieweePatch, MetadataCommand, NewImage,
    ProjectCommand, RegistryCommand, SectionCommand, TableAddress, TableCommand,
};
pub use root::{execute_batch, reduce, replay};
pub use selectors::SectionProgress;
pub use validation::{validate, ReferenceRules, ValidationIssue};
