//! Error types for the store service
//!
//! Reducers never fail. Errors only exist where the store crosses a
//! boundary:
//! - Reading configuration from disk or TOML
//! - Decoding snapshots and commands from JSON
//! - Encoding snapshots to JSON

use sia_model::OrderError;
use std::path::PathBuf;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for [`StoreConfig`](crate::StoreConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Canonical section order lists an id twice
    #[error("invalid section order: {0}")]
    SectionOrder(#[from] OrderError),
}

/// Snapshot and command boundary errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Snapshot JSON does not match the document model
    #[error("failed to decode snapshot: {0}")]
    SnapshotDecode(#[source] serde_json::Error),

    /// Snapshot could not be serialized
    #[error("failed to encode snapshot: {0}")]
    SnapshotEncode(#[source] serde_json::Error),

    /// Command JSON is malformed, or its payload does not match its type
    #[error("failed to decode command: {0}")]
    CommandDecode(#[source] serde_json::Error),
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
