//! Table slice
//!
//! Tables share the field key format. Rows carry a contiguous `orden`
//! (`0..n-1`) that is rewritten after every structural change.

use crate::keys::CompositeKey;
use crate::Timestamp;
use im::{OrdMap, Vector};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cell values of a row, in column insertion order
pub type RowData = IndexMap<String, Value>;

/// One table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: String,
    #[serde(rename = "orden")]
    pub order: usize,
    pub data: RowData,
}

/// How the totals row of a table is computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsConfig {
    pub enabled: bool,
    /// Numeric columns summed into the totals row
    #[serde(default)]
    pub sum_columns: Vec<String>,
    /// Column filled with each row's share of the first sum column
    #[serde(default)]
    pub percentage_column: Option<String>,
    /// Column that receives the totals label
    #[serde(default)]
    pub label_column: Option<String>,
    #[serde(default = "default_total_label")]
    pub label: String,
}

fn default_total_label() -> String {
    "Total".to_string()
}

impl Default for TotalsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sum_columns: Vec::new(),
            percentage_column: None,
            label_column: None,
            label: default_total_label(),
        }
    }
}

/// One table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableEntry {
    pub section_id: String,
    pub group_id: Option<String>,
    pub table_name: String,
    pub rows: Vector<TableRow>,
    #[serde(default)]
    pub totals: TotalsConfig,
    pub last_modified: Option<Timestamp>,
}

impl TableEntry {
    /// Empty table at a key
    #[must_use]
    pub fn empty(key: &CompositeKey) -> Self {
        Self {
            section_id: key.section_id().to_string(),
            group_id: key.group_id().map(str::to_string),
            table_name: key.name().to_string(),
            rows: Vector::new(),
            totals: TotalsConfig::default(),
            last_modified: None,
        }
    }

    /// Row by id
    #[must_use]
    pub fn row(&self, row_id: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    /// Position of a row by id
    #[must_use]
    pub fn row_index(&self, row_id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.id == row_id)
    }

    /// True when every row's `orden` equals its position
    #[must_use]
    pub fn has_contiguous_order(&self) -> bool {
        self.rows.iter().enumerate().all(|(i, r)| r.order == i)
    }
}

/// Table slice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesState {
    pub by_key: OrdMap<CompositeKey, TableEntry>,
    pub all_keys: Vector<CompositeKey>,
}

impl TablesState {
    /// Table at a key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &CompositeKey) -> Option<&TableEntry> {
        self.by_key.get(key)
    }
}
