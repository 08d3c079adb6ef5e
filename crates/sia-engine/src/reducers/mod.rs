//! Slice reducers, one per state slice

pub mod ccpp;
pub mod fields;
pub mod groups;
pub mod images;
pub mod metadata;
pub mod project;
pub mod registry;
pub mod sections;
pub mod tables;

pub use ccpp::{CcppCommand, CcppReducer};
pub use fields::{FieldAddress, FieldCommand, FieldReducer, FieldUpdate};
pub use groups::{renumber as renumber_groups, GroupCommand, GroupReducer, GroupRemap};
pub use images::{ImageCommand, ImagePatch, ImageReducer, NewImage};
pub use metadata::{MetadataCommand, MetadataReducer};
pub use project::ProjectCommand;
pub use registry::{IntervieweePatch, RegistryCommand, RegistryReducer};
pub use sections::{SectionCommand, SectionReducer};
pub use tables::{next_row_id, TableAddress, TableCommand, TableReducer, ROW_ID_PREFIX};
