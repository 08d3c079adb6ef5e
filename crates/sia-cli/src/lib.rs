//! SIA Report CLI
//!
//! File-in/file-out front end over the store:
//!
//! - `sia replay`: apply a command log to a snapshot
//! - `sia numbering`: global figure/table numbers of a content tree
//! - `sia validate`: referential-integrity pass over a snapshot

#![warn(unreachable_pub)]

pub mod cli;
pub mod commands;
pub mod logging;

pub use commands::ReplaySummary;
pub use logging::{init_logging, LogConfig, LogFormat};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
