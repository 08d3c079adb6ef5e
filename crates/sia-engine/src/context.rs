//! Reduction context
//!
//! Reducers never read the wall clock or the store configuration. The caller
//! samples time once per dispatch and hands it down together with the
//! canonical section order, so replaying the same commands with the same
//! context reproduces the same state.

use sia_model::{SectionOrder, Timestamp};
use std::sync::Arc;

/// Inputs a reducer may depend on besides the slice and the command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceContext {
    /// Instant stamped into `lastModified` fields
    pub now: Timestamp,
    /// Table of contents; photograph `numero` follows it
    pub section_order: Arc<SectionOrder>,
}

impl ReduceContext {
    /// Context stamped with `now`, with no canonical order
    #[inline]
    #[must_use]
    pub fn at(now: Timestamp) -> Self {
        Self {
            now,
            section_order: Arc::default(),
        }
    }

    /// Same context numbering against `order`
    #[must_use]
    pub fn with_section_order(mut self, order: Arc<SectionOrder>) -> Self {
        self.section_order = order;
        self
    }
}
