//! Advanced search
//!
//! The user picks a subset of searchable columns and enters one value per
//! picked column. Applying the form yields a sanitized accessor -> value map
//! that the grid folds into its query state.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::Value;

use crate::columns::ColumnModel;
use crate::registry::{EditorKind, FieldRegistry};

/// Whether a filter value means "no filter on this field"
///
/// Null, all-whitespace strings and empty arrays are blank. `0` and `false`
/// are real filter values.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Drop blank entries from a filter map
pub fn sanitize_filters<'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a Value)>,
) -> BTreeMap<String, Value> {
    entries
        .into_iter()
        .filter(|(_, value)| !is_blank(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// One input row of the advanced search form
#[derive(Debug, Clone, PartialEq)]
pub struct FilterInput {
    pub column_id: String,
    pub accessor_path: String,
    pub header: String,
    pub editor: EditorKind,
    pub value: Value,
}

/// Draft and applied state of the advanced search dialog
#[derive(Debug, Clone, Default)]
pub struct AdvancedSearch {
    open: bool,
    /// Picked fields in pick order, with their draft values
    draft: IndexMap<String, Value>,
    applied: BTreeMap<String, Value>,
}

impl AdvancedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the dialog. An empty draft is seeded from the applied filters.
    pub fn open(&mut self) {
        if self.draft.is_empty() {
            self.draft = self
                .applied
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
        }
        self.open = true;
    }

    /// Close without applying; the draft is kept for the next open
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn draft(&self) -> &IndexMap<String, Value> {
        &self.draft
    }

    pub fn applied(&self) -> &BTreeMap<String, Value> {
        &self.applied
    }

    /// Number of filters currently applied
    pub fn active_count(&self) -> usize {
        self.applied.len()
    }

    pub fn is_selected(&self, accessor_path: &str) -> bool {
        self.draft.contains_key(accessor_path)
    }

    pub fn selected_fields(&self) -> impl Iterator<Item = &str> {
        self.draft.keys().map(String::as_str)
    }

    /// Pick a field. Its value starts as an empty string unless already set.
    pub fn select_field(&mut self, accessor_path: impl Into<String>) {
        self.draft
            .entry(accessor_path.into())
            .or_insert_with(|| Value::String(String::new()));
    }

    /// Un-pick a field, dropping its draft value entirely
    pub fn deselect_field(&mut self, accessor_path: &str) {
        self.draft.shift_remove(accessor_path);
    }

    /// Set the draft value of a picked field. Returns false if not picked.
    pub fn set_value(&mut self, accessor_path: &str, value: Value) -> bool {
        match self.draft.get_mut(accessor_path) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Clear the form; the dialog stays open and nothing is applied
    pub fn reset(&mut self) {
        self.draft.clear();
    }

    /// Commit the sanitized draft and close. Returns the applied map.
    pub fn apply(&mut self) -> BTreeMap<String, Value> {
        self.applied = sanitize_filters(self.draft.iter());
        self.open = false;
        self.applied.clone()
    }

    /// Reset, commit the empty filter set and close
    pub fn remove_filter(&mut self) -> BTreeMap<String, Value> {
        self.draft.clear();
        self.applied.clear();
        self.open = false;
        BTreeMap::new()
    }

    /// Inputs for the picked fields, in pick order
    ///
    /// Picked fields that are no longer searchable are skipped.
    pub fn inputs(&self, columns: &ColumnModel, registry: &FieldRegistry) -> Vec<FilterInput> {
        self.draft
            .iter()
            .filter_map(|(path, value)| {
                let column = columns
                    .searchable()
                    .find(|c| &c.accessor_path == path)?;
                Some(FilterInput {
                    column_id: column.id.clone(),
                    accessor_path: path.clone(),
                    header: column.header.clone(),
                    editor: registry.editor(column),
                    value: value.clone(),
                })
            })
            .collect()
    }
}
