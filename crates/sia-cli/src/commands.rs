//! Operations behind the `sia` subcommands.
//!
//! All of them are file-in/file-out: snapshots, command logs and content
//! trees are JSON, the store configuration is TOML.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use sia_engine::{Command, NumberedItem, ValidationIssue};
use sia_model::{ContentTree, ProjectState};
use sia_store::{ContentStore, ProjectStore, StoreConfig, SystemClock};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use ulid::Ulid;

/// Outcome of replaying a command log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    /// Entries read from the log
    pub commands: usize,
    /// Effective transitions
    pub applied: usize,
    /// Entries with an unknown command type
    pub skipped: usize,
    /// Snapshot revision after replay
    pub revision: u64,
    /// Batch id when the log was applied as one transaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Store configuration from a file, or the default one
///
/// # Errors
/// Returns error if the file cannot be read or is invalid.
pub fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
    match path {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(StoreConfig::default()),
    }
}

/// Read a report snapshot
///
/// # Errors
/// Returns error if the file cannot be read or does not match the model.
pub fn read_snapshot(path: &Path) -> Result<ProjectState> {
    read_json(path).with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Read a section-content tree
///
/// # Errors
/// Returns error if the file cannot be read or does not match the model.
pub fn read_content_tree(path: &Path) -> Result<ContentTree> {
    read_json(path).with_context(|| format!("invalid content tree {}", path.display()))
}

/// Read a command log: a JSON array, or one JSON command per line
///
/// # Errors
/// Returns error if the file cannot be read or an entry is not JSON.
pub fn read_command_log(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_command_log(&text).with_context(|| format!("invalid command log {}", path.display()))
}

/// Parse command log text
///
/// # Errors
/// Returns error if an entry is not JSON or the array holds non-objects.
pub fn parse_command_log(text: &str) -> Result<Vec<Value>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        let entries: Vec<Value> = serde_json::from_str(trimmed)?;
        if let Some(index) = entries.iter().position(|entry| !entry.is_object()) {
            bail!("entry {index} is not a command object");
        }
        return Ok(entries);
    }
    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| serde_json::from_str(line).with_context(|| format!("line {}", n + 1)))
        .collect()
}

/// Decode log entries into commands; unknown types come back as `None`
///
/// # Errors
/// Returns error if a known command type carries a malformed payload.
pub fn decode_commands(entries: Vec<Value>) -> Result<Vec<Option<Command>>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let tag = entry.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
            let command =
                Command::from_json(entry).with_context(|| format!("command {index} ({tag})"))?;
            if command.is_none() {
                tracing::warn!(index, command = %tag, "unknown command type ignored");
            }
            Ok(command)
        })
        .collect()
}

/// Replay a command log onto the store
///
/// With `atomic`, the known commands are wrapped in one `batch/execute` with a
/// fresh transaction id, so the store publishes a single snapshot.
///
/// # Errors
/// Returns error if a known command carries a malformed payload.
pub fn replay(store: &ProjectStore, entries: Vec<Value>, atomic: bool) -> Result<ReplaySummary> {
    let commands = entries.len();
    let decoded = decode_commands(entries)?;
    let skipped = decoded.iter().filter(|command| command.is_none()).count();
    let known: Vec<Command> = decoded.into_iter().flatten().collect();
    let start = store.get_snapshot();

    let (applied, transaction_id) = if atomic {
        let transaction_id = Ulid::new().to_string();
        let after = store.dispatch(&Command::batch(transaction_id.clone(), known));
        let applied = after.internal.revision.saturating_sub(start.internal.revision);
        (usize::try_from(applied).unwrap_or(usize::MAX), Some(transaction_id))
    } else {
        let applied = known
            .iter()
            .filter(|command| {
                let before = store.get_snapshot();
                !Arc::ptr_eq(&before, &store.dispatch(command))
            })
            .count();
        (applied, None)
    };

    let summary = ReplaySummary {
        commands,
        applied,
        skipped,
        revision: store.get_snapshot().internal.revision,
        transaction_id,
    };
    tracing::info!(
        commands = summary.commands,
        applied = summary.applied,
        skipped = summary.skipped,
        revision = summary.revision,
        "replay finished"
    );
    Ok(summary)
}

/// Report store over a snapshot, or an empty one
#[must_use]
pub fn project_store(snapshot: Option<ProjectState>, config: StoreConfig) -> ProjectStore {
    match snapshot {
        Some(state) => ProjectStore::from_state(state, config, Arc::new(SystemClock)),
        None => ProjectStore::new(config),
    }
}

/// Every figure and table number of a content tree
#[must_use]
pub fn numbering(tree: ContentTree, config: StoreConfig) -> Vec<NumberedItem> {
    let store = ContentStore::from_state(tree, config, Arc::new(SystemClock));
    let items = store.numbered_items();
    let unordered = store
        .get_snapshot()
        .sections
        .keys()
        .filter(|id| !store.config().section_order.contains(id.as_str()))
        .count();
    if unordered > 0 {
        tracing::warn!(
            sections = unordered,
            "sections outside the canonical order are not numbered"
        );
    }
    items
}

/// Referential-integrity issues of a snapshot
#[must_use]
pub fn validate(snapshot: ProjectState, config: StoreConfig) -> Vec<ValidationIssue> {
    let issues = project_store(Some(snapshot), config).validate();
    tracing::info!(issues = issues.len(), "validation finished");
    issues
}

/// Numbered items as tab-separated lines
///
/// # Errors
/// Returns error if writing fails.
pub fn print_numbering(out: &mut impl Write, items: &[NumberedItem]) -> Result<()> {
    for item in items {
        writeln!(out, "{}\t{}\t{}\t{}", item.label, item.section_id, item.item_id, item.title)?;
    }
    Ok(())
}

/// Validation issues, one per line
///
/// # Errors
/// Returns error if writing fails.
pub fn print_issues(out: &mut impl Write, issues: &[ValidationIssue]) -> Result<()> {
    for issue in issues {
        writeln!(
            out,
            "{} {} row {} [{}]: {}",
            issue.section_id, issue.table_id, issue.row_id, issue.field, issue.message
        )?;
    }
    Ok(())
}

/// Pretty JSON to a file, or to `out` when no path is given
///
/// # Errors
/// Returns error if serialization or writing fails.
pub fn write_json(out: &mut impl Write, value: &impl Serialize, path: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => fs::write(path, text + "\n")
            .with_context(|| format!("failed to write {}", path.display())),
        None => writeln!(out, "{text}").map_err(Into::into),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_array_and_lines() {
        let array = parse_command_log(r#"[{"type":"project/reset"}]"#).unwrap();
        assert_eq!(array.len(), 1);

        let text = concat!(
            r#"{"type":"project/reset"}"#,
            "\n\n",
            r#"{"type":"metadata/setConsultant","payload":{"consultant":"X"}}"#,
            "\n",
        );
        let lines = parse_command_log(text).unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn rejects_non_objects_in_array() {
        assert!(parse_command_log("[1, 2]").is_err());
    }

    #[test]
    fn unknown_types_decode_to_none() {
        let decoded = decode_commands(vec![
            json!({"type": "legacy/updateNumbering", "payload": {}}),
            json!({
                "type": "metadata/setConsultant",
                "payload": {"consultant": "Ecología Andina"}
            }),
        ])
        .unwrap();
        assert!(decoded[0].is_none());
        assert!(decoded[1].is_some());
    }

    #[test]
    fn malformed_known_command_names_its_index() {
        let entry = json!({"type": "image/remove", "payload": {}});
        let err = decode_commands(vec![entry]).unwrap_err();
        assert!(format!("{err:#}").contains("command 0 (image/remove)"));
    }
}
