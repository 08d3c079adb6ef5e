//! Table reducer
//!
//! Row `orden` is rewritten to `0..n-1` after every structural change. New
//! row ids are `row-N` with the next N not already used in the table.

use crate::context::ReduceContext;
use crate::reducer::{commit, SliceReducer};
use crate::reducers::groups::{rekey, GroupRemap};
use im::Vector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sia_model::{CompositeKey, RowData, TableEntry, TableRow, TablesState, TotalsConfig};
use std::collections::HashSet;
use std::sync::Arc;

/// Prefix of generated row ids
pub const ROW_ID_PREFIX: &str = "row-";

/// Location of a table inside the report
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableAddress {
    pub section_id: String,
    #[serde(default)]
    pub group_id: Option<String>,
    pub table_name: String,
}

impl TableAddress {
    #[must_use]
    pub fn new(section_id: &str, group_id: Option<&str>, table_name: &str) -> Self {
        Self {
            section_id: section_id.to_string(),
            group_id: group_id.map(str::to_string),
            table_name: table_name.to_string(),
        }
    }

    /// Composite key, or `None` when a segment is not encodable
    #[must_use]
    pub fn key(&self) -> Option<CompositeKey> {
        CompositeKey::new(&self.section_id, self.group_id.as_deref(), &self.table_name).ok()
    }
}

/// Commands in the `table/*` namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum TableCommand {
    /// Replace every row; ids are regenerated
    #[serde(rename = "table/setRows")]
    SetRows {
        #[serde(flatten)]
        address: TableAddress,
        rows: Vec<RowData>,
    },

    /// Insert a row at `position` (appended when absent or out of range)
    #[serde(rename = "table/addRow")]
    AddRow {
        #[serde(flatten)]
        address: TableAddress,
        #[serde(default)]
        data: RowData,
        #[serde(default)]
        position: Option<usize>,
        #[serde(default)]
        row_id: Option<String>,
    },

    /// Merge `data` into an existing row
    #[serde(rename = "table/updateRow")]
    UpdateRow {
        #[serde(flatten)]
        address: TableAddress,
        row_id: String,
        data: RowData,
    },

    #[serde(rename = "table/updateCell")]
    UpdateCell {
        #[serde(flatten)]
        address: TableAddress,
        row_id: String,
        column: String,
        value: Value,
    },

    #[serde(rename = "table/removeRow")]
    RemoveRow {
        #[serde(flatten)]
        address: TableAddress,
        row_id: String,
    },

    /// `ordered_row_ids` must be a permutation of the current rows
    #[serde(rename = "table/reorderRows")]
    ReorderRows {
        #[serde(flatten)]
        address: TableAddress,
        ordered_row_ids: Vec<String>,
    },

    #[serde(rename = "table/setTotals")]
    SetTotals {
        #[serde(flatten)]
        address: TableAddress,
        totals: TotalsConfig,
    },

    /// Remove the table entirely
    #[serde(rename = "table/clear")]
    Clear {
        #[serde(flatten)]
        address: TableAddress,
    },
}

impl TableCommand {
    /// Wire type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetRows { .. } => "table/setRows",
            Self::AddRow { .. } => "table/addRow",
            Self::UpdateRow { .. } => "table/updateRow",
            Self::UpdateCell { .. } => "table/updateCell",
            Self::RemoveRow { .. } => "table/removeRow",
            Self::ReorderRows { .. } => "table/reorderRows",
            Self::SetTotals { .. } => "table/setTotals",
            Self::Clear { .. } => "table/clear",
        }
    }

    fn address(&self) -> &TableAddress {
        match self {
            Self::SetRows { address, .. }
            | Self::AddRow { address, .. }
            | Self::UpdateRow { address, .. }
            | Self::UpdateCell { address, .. }
            | Self::RemoveRow { address, .. }
            | Self::ReorderRows { address, .. }
            | Self::SetTotals { address, .. }
            | Self::Clear { address } => address,
        }
    }
}

/// Reducer for [`TablesState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TableReducer;

impl SliceReducer for TableReducer {
    type Slice = TablesState;
    type Command = TableCommand;

    fn reduce(
        slice: &Arc<TablesState>,
        command: &TableCommand,
        ctx: &ReduceContext,
    ) -> Arc<TablesState> {
        let Some(key) = command.address().key() else {
            return Arc::clone(slice);
        };

        if let TableCommand::Clear { .. } = command {
            let next = slice.by_key.contains_key(&key).then(|| TablesState {
                by_key: slice.by_key.without(&key),
                all_keys: slice.all_keys.iter().filter(|k| **k != key).cloned().collect(),
            });
            return commit(slice, next);
        }

        let existing = slice.get(&key);
        let table = existing.cloned().unwrap_or_else(|| TableEntry::empty(&key));
        let rows = match command {
            TableCommand::SetRows { rows, .. } => set_rows(&table.rows, rows),
            TableCommand::AddRow {
                data,
                position,
                row_id,
                ..
            } => add_row(&table.rows, data, *position, row_id.as_deref()),
            TableCommand::UpdateRow { row_id, data, .. } => {
                edit_row(&table.rows, row_id, |row| merge(row, data.iter()))
            }
            TableCommand::UpdateCell {
                row_id,
                column,
                value,
                ..
            } => edit_row(&table.rows, row_id, |row| merge(row, std::iter::once((column, value)))),
            TableCommand::RemoveRow { row_id, .. } => {
                let index = table.row_index(row_id);
                index.map(|i| {
                    let mut rows = table.rows.clone();
                    rows.remove(i);
                    renumber_rows(rows)
                })
            }
            TableCommand::ReorderRows {
                ordered_row_ids, ..
            } => reorder_rows(&table.rows, ordered_row_ids),
            TableCommand::SetTotals { totals, .. } => {
                if table.totals == *totals {
                    return Arc::clone(slice);
                }
                let next = TableEntry {
                    totals: totals.clone(),
                    last_modified: Some(ctx.now),
                    ..table
                };
                return Arc::new(store(slice, key, next, existing.is_none()));
            }
            TableCommand::Clear { .. } => None,
        };

        let next = rows.map(|rows| {
            let created = existing.is_none();
            store(
                slice,
                key,
                TableEntry {
                    rows,
                    last_modified: Some(ctx.now),
                    ..table
                },
                created,
            )
        });
        commit(slice, next)
    }
}

/// Follow a group remap: moved tables change key, tables of removed groups go
pub(crate) fn regroup(
    slice: &Arc<TablesState>,
    remap: &GroupRemap,
    ctx: &ReduceContext,
) -> Arc<TablesState> {
    let next = rekey(&slice.by_key, &slice.all_keys, remap, |key, table| TableEntry {
        group_id: key.group_id().map(str::to_string),
        last_modified: Some(ctx.now),
        ..table
    });
    commit(slice, next.map(|(by_key, all_keys)| TablesState { by_key, all_keys }))
}

fn store(slice: &TablesState, key: CompositeKey, table: TableEntry, created: bool) -> TablesState {
    let mut all_keys = slice.all_keys.clone();
    if created {
        all_keys.push_back(key.clone());
    }
    TablesState {
        by_key: slice.by_key.update(key, table),
        all_keys,
    }
}

fn set_rows(current: &Vector<TableRow>, rows: &[RowData]) -> Option<Vector<TableRow>> {
    let unchanged = current.len() == rows.len()
        && current.iter().zip(rows).all(|(row, data)| row.data == *data);
    if unchanged {
        return None;
    }
    Some(
        rows.iter()
            .enumerate()
            .map(|(i, data)| TableRow {
                id: format!("{ROW_ID_PREFIX}{}", i + 1),
                order: i,
                data: data.clone(),
            })
            .collect(),
    )
}

fn add_row(
    current: &Vector<TableRow>,
    data: &RowData,
    position: Option<usize>,
    row_id: Option<&str>,
) -> Option<Vector<TableRow>> {
    let id = match row_id {
        Some(id) if current.iter().any(|r| r.id == id) => return None,
        Some(id) if id.is_empty() => return None,
        Some(id) => id.to_string(),
        None => next_row_id(current),
    };
    let mut rows = current.clone();
    let at = position.unwrap_or(rows.len()).min(rows.len());
    rows.insert(
        at,
        TableRow {
            id,
            order: at,
            data: data.clone(),
        },
    );
    Some(renumber_rows(rows))
}

fn edit_row(
    current: &Vector<TableRow>,
    row_id: &str,
    edit: impl FnOnce(&TableRow) -> Option<RowData>,
) -> Option<Vector<TableRow>> {
    let index = current.iter().position(|r| r.id == row_id)?;
    let data = edit(&current[index])?;
    let mut rows = current.clone();
    rows.set(
        index,
        TableRow {
            data,
            ..current[index].clone()
        },
    );
    Some(rows)
}

fn merge<'a>(
    row: &TableRow,
    cells: impl Iterator<Item = (&'a String, &'a Value)>,
) -> Option<RowData> {
    let mut data = row.data.clone();
    for (column, value) in cells {
        data.insert(column.clone(), value.clone());
    }
    (data != row.data).then_some(data)
}

fn reorder_rows(current: &Vector<TableRow>, ordered: &[String]) -> Option<Vector<TableRow>> {
    if ordered.len() != current.len() {
        return None;
    }
    let unique: HashSet<&str> = ordered.iter().map(String::as_str).collect();
    if unique.len() != ordered.len() {
        return None;
    }
    let rows: Option<Vector<TableRow>> = ordered
        .iter()
        .map(|id| current.iter().find(|r| r.id == *id).cloned())
        .collect();
    let rows = rows?;
    if rows.iter().zip(current.iter()).all(|(a, b)| a.id == b.id) {
        return None;
    }
    Some(renumber_rows(rows))
}

fn renumber_rows(rows: Vector<TableRow>) -> Vector<TableRow> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| TableRow { order: i, ..row })
        .collect()
}

/// Next `row-N` id not taken in `rows`
#[must_use]
pub fn next_row_id(rows: &Vector<TableRow>) -> String {
    let highest = rows
        .iter()
        .filter_map(|r| r.id.strip_prefix(ROW_ID_PREFIX))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{ROW_ID_PREFIX}{}", highest + 1)
}
