//! SIA Report Store
//!
//! Service facade over the pure engine.
//!
//! # Core Concepts
//!
//! - [`Store`]: versioned reference cell holding one immutable snapshot
//! - [`ProjectStore`] / [`ContentStore`]: the report and its content tree
//! - [`Clock`]: injectable time source, sampled once per dispatch
//! - [`StoreConfig`]: canonical section order and validation rules (TOML)
//!
//! # Example
//!
//! ```
//! use sia_engine::{Command, FieldAddress, FieldCommand};
//! use sia_store::{ProjectStore, StoreConfig};
//!
//! let store = ProjectStore::new(StoreConfig::default());
//! store.dispatch(&Command::Field(FieldCommand::Set {
//!     address: FieldAddress::new("1", None, "nombreProyecto"),
//!     value: serde_json::json!("Ampliación Norte"),
//!     source: Default::default(),
//! }));
//! assert_eq!(store.version(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod clock;
pub mod config;
pub mod error;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::StoreConfig;
pub use error::{ConfigError, StoreError, StoreResult};
pub use store::{ContentStore, ProjectStore, Reducible, Store};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
