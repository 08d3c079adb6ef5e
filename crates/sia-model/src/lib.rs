//! SIA Report Model
//!
//! Plain, serializable data for a social impact assessment report.
//!
//! # Core Concepts
//!
//! - [`ProjectState`]: Root snapshot; each slice behind an `Arc`
//! - [`CompositeKey`] / [`ScopeKey`]: `section::group?::name` codecs
//! - [`GroupConfig`]: AISD / AISI group forests with position-derived ids
//! - [`ContentTree`]: Section-content tree used for global numbering
//! - [`SectionOrder`]: Canonical, hand-authored section order
//!
//! Collections use `im` persistent structures so cloning a slice before a
//! change is cheap.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod content;
pub mod field;
pub mod group;
pub mod image;
pub mod keys;
pub mod metadata;
pub mod order;
pub mod registry;
pub mod section;
pub mod state;
pub mod table;

pub use content::{
    ContentItem, ContentKind, ContentSection, ContentTree, ImageContent, ParagraphContent,
    SectionType, TableContent,
};
pub use field::{FieldEntry, FieldSource, FieldsState};
pub use group::{GroupConfig, GroupDefinition, GroupKind};
pub use image::{ImageEntry, ImagesState, UploadStatus};
pub use keys::{
    generate_image_group_key, generate_key, generate_table_key, parse_image_group_key, parse_key,
    CompositeKey, KeyError, ScopeKey, KEY_DELIMITER,
};
pub use metadata::{LocationSelection, MetadataPatch, ProjectMetadata};
pub use order::{natural_cmp, OrderError, SectionOrder};
pub use registry::{CcppEntry, CcppRegistry, GlobalRegistryState, Interviewee, RegistryLocation};
pub use section::{SectionState, SectionsState};
pub use state::{InternalState, ProjectState};
pub use table::{RowData, TableEntry, TableRow, TablesState, TotalsConfig};

/// Timestamps stored in snapshots
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
