//! Read selectors over [`ProjectState`]
//!
//! Consumers read through these functions instead of walking the slices.
//! All of them are pure and cheap enough to call on every state change.

use im::Vector;
use serde::Serialize;
use serde_json::Value;
use sia_model::{
    CcppEntry, CompositeKey, FieldEntry, GroupDefinition, GroupKind, ImageEntry, ProjectState,
    RowData, ScopeKey, SectionState, TableEntry, TableRow,
};

/// Stored value of a field
#[must_use]
pub fn field_value<'a>(
    state: &'a ProjectState,
    section_id: &str,
    group_id: Option<&str>,
    field_name: &str,
) -> Option<&'a Value> {
    field_entry(state, section_id, group_id, field_name).map(|entry| &entry.value)
}

/// Full entry of a field, with its flags
#[must_use]
pub fn field_entry<'a>(
    state: &'a ProjectState,
    section_id: &str,
    group_id: Option<&str>,
    field_name: &str,
) -> Option<&'a FieldEntry> {
    let key = CompositeKey::new(section_id, group_id, field_name).ok()?;
    state.fields.get(&key)
}

/// Table entry at an address
#[must_use]
pub fn table<'a>(
    state: &'a ProjectState,
    section_id: &str,
    group_id: Option<&str>,
    table_name: &str,
) -> Option<&'a TableEntry> {
    let key = CompositeKey::new(section_id, group_id, table_name).ok()?;
    state.tables.get(&key)
}

/// Rows of a table in `orden` order; empty when the table does not exist
#[must_use]
pub fn table_rows<'a>(
    state: &'a ProjectState,
    section_id: &str,
    group_id: Option<&str>,
    table_name: &str,
) -> Vec<&'a TableRow> {
    table(state, section_id, group_id, table_name)
        .map(|t| t.rows.iter().collect())
        .unwrap_or_default()
}

/// Row data with the percentage column filled in, when configured
///
/// Each row's percentage is its share of the first sum column, rounded to
/// two decimals.
#[must_use]
pub fn rows_with_percentages(table: &TableEntry) -> Vec<RowData> {
    let (Some(column), Some(base)) = (
        table.totals.percentage_column.as_deref(),
        table.totals.sum_columns.first(),
    ) else {
        return table.rows.iter().map(|r| r.data.clone()).collect();
    };
    let total = column_sum(&table.rows, base);
    table
        .rows
        .iter()
        .map(|row| {
            let mut data = row.data.clone();
            let value = row.data.get(base).map_or(0.0, numeric);
            data.insert(column.to_string(), Value::from(percentage(value, total)));
            data
        })
        .collect()
}

/// Totals row of a table, computed from its rows
///
/// `None` when totals are disabled.
#[must_use]
pub fn table_totals(table: &TableEntry) -> Option<RowData> {
    let config = &table.totals;
    if !config.enabled {
        return None;
    }
    let mut totals = RowData::new();
    if let Some(column) = &config.label_column {
        totals.insert(column.clone(), Value::from(config.label.clone()));
    }
    for column in &config.sum_columns {
        totals.insert(column.clone(), number(column_sum(&table.rows, column)));
    }
    if let Some(column) = &config.percentage_column {
        let share = if table.rows.is_empty() { 0.0 } else { 100.0 };
        totals.insert(column.clone(), Value::from(share));
    }
    Some(totals)
}

/// Groups of one kind in pre-order
#[inline]
#[must_use]
pub fn groups(state: &ProjectState, kind: GroupKind) -> &Vector<GroupDefinition> {
    state.group_config.groups(kind)
}

/// Group by id, searched in both forests
#[must_use]
pub fn group<'a>(state: &'a ProjectState, id: &str) -> Option<&'a GroupDefinition> {
    state.group_config.find_any(id)
}

/// Populated centers attached to a group that exist in the registry
#[must_use]
pub fn group_ccpp<'a>(
    state: &'a ProjectState,
    kind: GroupKind,
    group_id: &str,
) -> Vec<&'a CcppEntry> {
    state
        .group_config
        .find(kind, group_id)
        .map(|group| {
            group
                .ccpp_ids
                .iter()
                .filter_map(|id| state.ccpp_registry.get(id))
                .collect()
        })
        .unwrap_or_default()
}

/// Workflow status of a section scope
#[must_use]
pub fn section_status<'a>(
    state: &'a ProjectState,
    section_id: &str,
    group_id: Option<&str>,
) -> Option<&'a SectionState> {
    let key = ScopeKey::new(section_id, group_id).ok()?;
    state.sections.get(&key)
}

/// Whether a section scope has been marked complete
#[must_use]
pub fn is_section_complete(state: &ProjectState, section_id: &str, group_id: Option<&str>) -> bool {
    section_status(state, section_id, group_id).is_some_and(|s| s.is_complete)
}

/// Aggregate completion over a set of section scopes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub total: usize,
    pub initialized: usize,
    pub complete: usize,
}

impl SectionProgress {
    /// Completed share in percent, 0 when nothing is tracked
    #[must_use]
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.complete as f64 / self.total as f64;
        ratio * 100.0
    }
}

/// Progress over the given scopes; scopes never opened count as pending
#[must_use]
pub fn section_progress<'a>(
    state: &ProjectState,
    scopes: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> SectionProgress {
    scopes
        .into_iter()
        .fold(SectionProgress::default(), |mut progress, (section, group)| {
            progress.total += 1;
            if let Some(status) = section_status(state, section, group) {
                progress.initialized += usize::from(status.is_initialized);
                progress.complete += usize::from(status.is_complete);
            }
            progress
        })
}

/// Progress over every scope that has a status entry
#[must_use]
pub fn tracked_progress(state: &ProjectState) -> SectionProgress {
    state
        .sections
        .by_id
        .values()
        .fold(SectionProgress::default(), |mut progress, status| {
            progress.total += 1;
            progress.initialized += usize::from(status.is_initialized);
            progress.complete += usize::from(status.is_complete);
            progress
        })
}

/// Document-wide number of a photograph
#[must_use]
pub fn image_number(state: &ProjectState, image_id: &str) -> Option<u32> {
    state.images.get(image_id).map(|img| img.numero)
}

/// Photographs of one gallery in `orden` order
#[must_use]
pub fn gallery<'a>(
    state: &'a ProjectState,
    section_id: &str,
    group_id: Option<&str>,
) -> Vec<&'a ImageEntry> {
    state.images.gallery(section_id, group_id)
}

fn column_sum(rows: &Vector<TableRow>, column: &str) -> f64 {
    rows.iter().filter_map(|row| row.data.get(column)).map(numeric).sum()
}

/// Numeric reading of a cell; blanks and text count as zero
fn numeric(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn percentage(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    (value / total * 10_000.0).round() / 100.0
}

/// Whole sums stay integers on the wire
#[allow(clippy::cast_possible_truncation)]
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sia_model::TotalsConfig;

    fn population_table() -> TableEntry {
        let key = CompositeKey::new("3.1.4", Some("A.1"), "poblacionSexo").unwrap();
        let mut table = TableEntry::empty(&key);
        let rows = [("Hombres", json!(30)), ("Mujeres", json!("10"))];
        for (i, (sexo, casos)) in rows.into_iter().enumerate() {
            let data: RowData = [("sexo".to_string(), json!(sexo)), ("casos".to_string(), casos)]
                .into_iter()
                .collect();
            table.rows.push_back(TableRow {
                id: format!("row-{}", i + 1),
                order: i,
                data,
            });
        }
        table.totals = TotalsConfig {
            enabled: true,
            sum_columns: vec!["casos".into()],
            percentage_column: Some("porcentaje".into()),
            label_column: Some("sexo".into()),
            label: "Total".into(),
        };
        table
    }

    #[test]
    fn totals_row_sums_and_labels() {
        let totals = table_totals(&population_table()).unwrap();
        assert_eq!(totals["sexo"], json!("Total"));
        assert_eq!(totals["casos"], json!(40));
        assert_eq!(totals["porcentaje"], json!(100.0));
    }

    #[test]
    fn percentages_are_shares_of_first_sum_column() {
        let rows = rows_with_percentages(&population_table());
        assert_eq!(rows[0]["porcentaje"], json!(75.0));
        assert_eq!(rows[1]["porcentaje"], json!(25.0));
    }

    #[test]
    fn disabled_totals_yield_none() {
        let mut table = population_table();
        table.totals.enabled = false;
        assert!(table_totals(&table).is_none());
    }

    #[test]
    fn progress_counts_unopened_scopes() {
        let state = ProjectState::default();
        let progress = section_progress(&state, [("1", None), ("2", Some("A.1"))]);
        assert_eq!(progress.total, 2);
        assert_eq!(progress.complete, 0);
        assert_eq!(progress.percent_complete(), 0.0);
    }

    #[test]
    fn missing_entities_read_as_absent() {
        let state = ProjectState::default();
        assert!(field_value(&state, "1", None, "x").is_none());
        assert!(table_rows(&state, "1", None, "t").is_empty());
        assert!(image_number(&state, "img").is_none());
        assert!(group_ccpp(&state, GroupKind::Aisd, "A.1").is_empty());
        assert!(!is_section_complete(&state, "1", None));
    }
}
