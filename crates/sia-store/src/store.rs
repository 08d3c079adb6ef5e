//! Store service
//!
//! One immutable snapshot behind a `tokio::sync::watch` cell. Each dispatch
//! reads the current snapshot, reduces, and publishes the result only when
//! the reducer returned a new `Arc`. Dispatches are serialized by a mutex so
//! a batch runs to completion before the next command starts.

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use im::Vector;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sia_engine::{
    numbering, selectors, validate, Command, ContentCommand, ContentReducer, NumberedItem,
    ReduceContext, SectionProgress, SliceReducer, ValidationIssue,
};
use sia_model::{
    ContentTree, GroupDefinition, GroupKind, ImageEntry, ProjectState, RowData, SectionOrder,
    TableRow, Timestamp,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// State that a [`Store`] can hold
pub trait Reducible: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Commands accepted by this state
    type Command;

    /// Apply a command; same `Arc` back when nothing changed
    fn reduce(state: &Arc<Self>, command: &Self::Command, ctx: &ReduceContext) -> Arc<Self>;

    /// Empty state created at `now`
    fn fresh(now: Timestamp) -> Self;

    /// Wire type tag of a command, for logs
    fn command_kind(command: &Self::Command) -> &'static str;
}

impl Reducible for ProjectState {
    type Command = Command;

    #[inline]
    fn reduce(state: &Arc<Self>, command: &Command, ctx: &ReduceContext) -> Arc<Self> {
        sia_engine::reduce(state, command, ctx)
    }

    fn fresh(now: Timestamp) -> Self {
        ProjectState::new(now)
    }

    fn command_kind(command: &Command) -> &'static str {
        command.kind()
    }
}

impl Reducible for ContentTree {
    type Command = ContentCommand;

    #[inline]
    fn reduce(state: &Arc<Self>, command: &ContentCommand, ctx: &ReduceContext) -> Arc<Self> {
        ContentReducer::reduce(state, command, ctx)
    }

    fn fresh(_now: Timestamp) -> Self {
        ContentTree::default()
    }

    fn command_kind(command: &ContentCommand) -> &'static str {
        command.kind()
    }
}

/// Versioned reference cell over one immutable snapshot
#[derive(Debug)]
pub struct Store<S: Reducible> {
    cell: watch::Sender<Arc<S>>,
    dispatch_lock: Mutex<()>,
    version: AtomicU64,
    clock: Arc<dyn Clock>,
    section_order: Arc<SectionOrder>,
    config: StoreConfig,
}

/// Store over the report document
pub type ProjectStore = Store<ProjectState>;

/// Store over the section-content tree
pub type ContentStore = Store<ContentTree>;

impl<S: Reducible> Store<S> {
    /// Empty store on the wall clock
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Empty store on a custom clock
    #[must_use]
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let initial = Arc::new(S::fresh(clock.now()));
        Self::from_parts(initial, config, clock)
    }

    /// Store starting from an existing snapshot
    #[must_use]
    pub fn from_state(state: S, config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(Arc::new(state), config, clock)
    }

    fn from_parts(initial: Arc<S>, config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let (cell, _) = watch::channel(initial);
        Self {
            cell,
            dispatch_lock: Mutex::new(()),
            version: AtomicU64::new(0),
            clock,
            section_order: Arc::new(config.section_order.clone()),
            config,
        }
    }

    /// Apply a command and return the resulting snapshot
    pub fn dispatch(&self, command: &S::Command) -> Arc<S> {
        let _guard = self.dispatch_lock.lock();
        let current = self.get_snapshot();
        let ctx = ReduceContext::at(self.clock.now())
            .with_section_order(Arc::clone(&self.section_order));
        let next = S::reduce(&current, command, &ctx);
        let kind = S::command_kind(command);

        if Arc::ptr_eq(&current, &next) {
            if self.config.log_noops {
                tracing::debug!(command = kind, "command had no effect");
            } else {
                tracing::trace!(command = kind, "command had no effect");
            }
            return current;
        }

        let version = self.publish(Arc::clone(&next));
        tracing::debug!(command = kind, version, "command applied");
        next
    }

    /// Apply several commands in order, each as its own dispatch
    pub fn dispatch_all<'a>(&self, commands: impl IntoIterator<Item = &'a S::Command>) -> Arc<S>
    where
        S::Command: 'a,
    {
        commands
            .into_iter()
            .fold(self.get_snapshot(), |_, command| self.dispatch(command))
    }

    /// Current snapshot, shared
    #[must_use]
    pub fn get_snapshot(&self) -> Arc<S> {
        Arc::clone(&self.cell.borrow())
    }

    /// Replace the whole state
    pub fn hydrate(&self, state: S) {
        let _guard = self.dispatch_lock.lock();
        let version = self.publish(Arc::new(state));
        tracing::info!(version, "store hydrated");
    }

    /// Replace the whole state from snapshot JSON
    ///
    /// # Errors
    /// Returns error if the JSON does not match the state model; the current
    /// state is kept in that case.
    pub fn hydrate_json(&self, json: &str) -> StoreResult<()> {
        let state: S = serde_json::from_str(json).map_err(StoreError::SnapshotDecode)?;
        self.hydrate(state);
        Ok(())
    }

    /// Current snapshot as pretty JSON
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn snapshot_json(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(&*self.get_snapshot()).map_err(StoreError::SnapshotEncode)
    }

    /// Back to an empty state
    pub fn reset(&self) {
        let _guard = self.dispatch_lock.lock();
        let fresh = Arc::new(S::fresh(self.clock.now()));
        let version = self.publish(fresh);
        tracing::info!(version, "store reset");
    }

    /// Receiver notified on every published snapshot
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<S>> {
        self.cell.subscribe()
    }

    /// Number of snapshots published since creation
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn publish(&self, next: Arc<S>) -> u64 {
        self.cell.send_replace(next);
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl Store<ProjectState> {
    /// Decode and apply a command from JSON
    ///
    /// An unknown `type` is logged and ignored, like any other no-op.
    ///
    /// # Errors
    /// Returns error if the text is not JSON or a known command carries a
    /// payload that does not match its type.
    pub fn dispatch_json(&self, json: &str) -> StoreResult<Arc<ProjectState>> {
        let value: Value = serde_json::from_str(json).map_err(StoreError::CommandDecode)?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match Command::from_json(value).map_err(StoreError::CommandDecode)? {
            Some(command) => Ok(self.dispatch(&command)),
            None => {
                tracing::warn!(command = %tag, "unknown command type ignored");
                Ok(self.get_snapshot())
            }
        }
    }

    /// Stored value of a field
    #[must_use]
    pub fn field_value(
        &self,
        section_id: &str,
        group_id: Option<&str>,
        field_name: &str,
    ) -> Option<Value> {
        selectors::field_value(&self.get_snapshot(), section_id, group_id, field_name).cloned()
    }

    /// Rows of a table; empty when the table does not exist
    #[must_use]
    pub fn table_rows(
        &self,
        section_id: &str,
        group_id: Option<&str>,
        table_name: &str,
    ) -> Vec<TableRow> {
        selectors::table_rows(&self.get_snapshot(), section_id, group_id, table_name)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Computed totals row of a table
    #[must_use]
    pub fn table_totals(
        &self,
        section_id: &str,
        group_id: Option<&str>,
        table_name: &str,
    ) -> Option<RowData> {
        let snapshot = self.get_snapshot();
        selectors::table(&snapshot, section_id, group_id, table_name)
            .and_then(selectors::table_totals)
    }

    /// Groups of one kind in pre-order
    #[must_use]
    pub fn groups(&self, kind: GroupKind) -> Vector<GroupDefinition> {
        selectors::groups(&self.get_snapshot(), kind).clone()
    }

    /// Whether a section scope is complete
    #[must_use]
    pub fn is_section_complete(&self, section_id: &str, group_id: Option<&str>) -> bool {
        selectors::is_section_complete(&self.get_snapshot(), section_id, group_id)
    }

    /// Completion over the canonical section order (document-wide scopes)
    #[must_use]
    pub fn section_progress(&self) -> SectionProgress {
        let snapshot = self.get_snapshot();
        let scopes = self.config.section_order.iter().map(|id| (id, None));
        selectors::section_progress(&snapshot, scopes)
    }

    /// Document-wide photograph number
    #[must_use]
    pub fn image_number(&self, image_id: &str) -> Option<u32> {
        selectors::image_number(&self.get_snapshot(), image_id)
    }

    /// Photographs of one gallery
    #[must_use]
    pub fn gallery(&self, section_id: &str, group_id: Option<&str>) -> Vec<ImageEntry> {
        selectors::gallery(&self.get_snapshot(), section_id, group_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Run the referential-integrity pass with the configured rules
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationIssue> {
        validate(&self.get_snapshot(), &self.config.validation)
    }
}

impl Store<ContentTree> {
    /// Global number of a figure
    #[must_use]
    pub fn figure_number(&self, item_id: &str) -> Option<usize> {
        numbering::figure_number(&self.get_snapshot(), &self.config.section_order, item_id)
    }

    /// Global number of a table
    #[must_use]
    pub fn table_number(&self, item_id: &str) -> Option<usize> {
        numbering::table_number(&self.get_snapshot(), &self.config.section_order, item_id)
    }

    /// Caption label (`Figura N` / `Cuadro N`)
    #[must_use]
    pub fn label(&self, item_id: &str) -> Option<String> {
        numbering::label(&self.get_snapshot(), &self.config.section_order, item_id)
    }

    /// All numbered items in document order
    #[must_use]
    pub fn numbered_items(&self) -> Vec<NumberedItem> {
        numbering::enumerate(&self.get_snapshot(), &self.config.section_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use serde_json::json;
    use sia_engine::{FieldAddress, FieldCommand};
    use sia_model::FieldSource;

    fn store() -> ProjectStore {
        let clock = Arc::new(FixedClock::new(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH));
        Store::with_clock(StoreConfig::default(), clock)
    }

    fn set_field(value: Value) -> Command {
        Command::Field(FieldCommand::Set {
            address: FieldAddress::new("1", None, "nombre"),
            value,
            source: FieldSource::User,
        })
    }

    #[test]
    fn dispatch_publishes_new_version() {
        let store = store();
        let before = store.get_snapshot();
        let after = store.dispatch(&set_field(json!("Alto")));
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(store.version(), 1);
        assert_eq!(store.field_value("1", None, "nombre"), Some(json!("Alto")));
    }

    #[test]
    fn noop_keeps_snapshot_and_version() {
        let store = store();
        store.dispatch(&set_field(json!(1)));
        let before = store.get_snapshot();
        let after = store.dispatch(&set_field(json!(1)));
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn unknown_json_command_is_ignored() {
        let store = store();
        let before = store.get_snapshot();
        let after = store
            .dispatch_json(r#"{"type":"legacy/updateNumbering","payload":{}}"#)
            .unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let store = store();
        assert!(matches!(store.dispatch_json("{"), Err(StoreError::CommandDecode(_))));
        assert!(store.hydrate_json("[]").is_err());
    }

    #[test]
    fn subscribers_see_published_snapshots() {
        let store = store();
        let mut rx = store.subscribe();
        store.dispatch(&set_field(json!(2)));
        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert!(Arc::ptr_eq(&seen, &store.get_snapshot()));
    }
}
