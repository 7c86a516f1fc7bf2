//! Grid backend over a JSON file
//!
//! The file holds an array of row objects. Queries are answered in memory
//! and every accepted mutation is written back to the file.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use orgdesk_core::{
    BackendCapabilities, CoreError, CoreResult, GridBackend, PageQuery, PageResult, Row, RowId,
    RowUpdate, SortOrder,
};
use parking_lot::Mutex;
use serde_json::Value;

pub struct JsonFileBackend {
    path: PathBuf,
    id_field: String,
    rows: Mutex<Vec<Row>>,
    labels: BTreeMap<String, String>,
    /// Where the dynamic column order is persisted, if anywhere
    order_path: Option<PathBuf>,
}

impl JsonFileBackend {
    pub fn open(path: &Path, id_field: impl Into<String>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rows file: {:?}", path))?;
        let rows: Vec<Row> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse rows file: {:?}", path))?;

        tracing::debug!(path = %path.display(), rows = rows.len(), "Opened rows file");

        Ok(Self {
            path: path.to_path_buf(),
            id_field: id_field.into(),
            rows: Mutex::new(rows),
            labels: BTreeMap::new(),
            order_path: None,
        })
    }

    /// Header labels for organization-defined fields
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_order_file(mut self, path: PathBuf) -> Self {
        self.order_path = Some(path);
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }

    fn save(&self, rows: &[Row]) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(rows)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn position(&self, rows: &[Row], id: &RowId) -> Option<usize> {
        rows.iter()
            .position(|row| row.id(&self.id_field).as_ref() == Some(id))
    }
}

#[async_trait]
impl GridBackend for JsonFileBackend {
    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            persist_column_order: self.order_path.is_some(),
            ..BackendCapabilities::all()
        }
    }

    async fn fetch_page(&self, query: &PageQuery) -> CoreResult<PageResult> {
        let mut matching: Vec<Row> = {
            let rows = self.rows.lock();
            rows.iter()
                .filter(|row| matches_search(row, query.search.as_deref()))
                .filter(|row| {
                    query
                        .filters
                        .iter()
                        .all(|(path, expected)| matches_filter(row.get_path(path), expected))
                })
                .cloned()
                .collect()
        };

        if let Some(sort_by) = &query.sort_by {
            matching.sort_by(|a, b| compare_values(a.get_path(sort_by), b.get_path(sort_by)));
            if query.sort_order == Some(SortOrder::Desc) {
                matching.reverse();
            }
        }

        let total_count = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(query.offset())
            .take(query.limit)
            .collect();

        Ok(PageResult { rows, total_count })
    }

    async fn create_row(&self, data: Row) -> CoreResult<Row> {
        let mut row = data;
        if row.id(&self.id_field).is_none() {
            row.insert(
                self.id_field.clone(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }

        let mut rows = self.rows.lock();
        rows.insert(0, row.clone());
        self.save(&rows)?;
        tracing::info!(id = ?row.id(&self.id_field), "Row created");
        Ok(row)
    }

    async fn update_row(&self, update: RowUpdate) -> CoreResult<Option<Row>> {
        let mut rows = self.rows.lock();
        let index = self
            .position(&rows, &update.id)
            .ok_or_else(|| CoreError::NotFound(update.id.to_string()))?;

        let row = &mut rows[index];
        for (field, value) in update.changes {
            if value.is_null() {
                row.remove_path(&field);
            } else {
                row.insert(field, value);
            }
        }
        let updated = row.clone();

        self.save(&rows)?;
        tracing::info!(id = %update.id, "Row updated");
        Ok(Some(updated))
    }

    async fn delete_row(&self, id: &RowId) -> CoreResult<()> {
        let mut rows = self.rows.lock();
        let index = self
            .position(&rows, id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        rows.remove(index);
        self.save(&rows)?;
        tracing::info!(id = %id, "Row deleted");
        Ok(())
    }

    async fn persist_column_order(&self, field_names: Vec<String>) -> CoreResult<()> {
        let Some(path) = &self.order_path else {
            return Err(CoreError::NotSupported("persist_column_order".into()));
        };
        std::fs::write(path, serde_json::to_string_pretty(&field_names)?)?;
        tracing::info!(path = %path.display(), "Column order saved");
        Ok(())
    }

    fn resolve_field_label(&self, field_name: &str) -> Option<String> {
        self.labels.get(field_name).cloned()
    }
}

/// Case-insensitive substring match over every string in the row
fn matches_search(row: &Row, search: Option<&str>) -> bool {
    let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let needle = search.to_lowercase();
    row.as_map()
        .values()
        .any(|value| contains_text(value, &needle))
}

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Array(items) => items.iter().any(|v| contains_text(v, needle)),
        Value::Object(map) => map.values().any(|v| contains_text(v, needle)),
        _ => false,
    }
}

/// Strings match as substrings, arrays as "any of", everything else exactly
fn matches_filter(actual: Option<&Value>, expected: &Value) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match (actual, expected) {
        (Value::Array(values), Value::Array(wanted)) => wanted.iter().any(|w| values.contains(w)),
        (_, Value::Array(wanted)) => wanted.contains(actual),
        (Value::Array(values), _) => values.contains(expected),
        (_, Value::String(wanted)) => contains_text(actual, &wanted.to_lowercase()),
        _ => actual == expected,
    }
}

/// Order for sorting: numbers numerically, then everything else as text.
/// Missing values sort last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.filter(|v| !v.is_null()), b.filter(|v| !v.is_null())) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => sort_text(x).cmp(&sort_text(y)),
    }
}

fn sort_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    }
}
